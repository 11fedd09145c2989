use similar::{ChangeTag, TextDiff};

use crate::parser::parse;
use crate::printer::Printer;

fn format(content: &str) -> String {
    let tree = parse("test.ledger", content).unwrap();
    Printer::new(&tree).print()
}

fn assert_format(content: &str, expected: &str) {
    let formatted = format(content);
    assert_eq!(formatted, expected, "{}", {
        let diff = TextDiff::from_lines(expected, &formatted);
        let mut lines = String::from("\n");
        for change in diff.iter_all_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => format!("- {change}"),
                ChangeTag::Insert => format!("+ {change}"),
                ChangeTag::Equal => format!("  {change}"),
            };
            lines.push_str(&line);
        }
        lines
    });
}

fn assert_noop_format(content: &str) {
    assert_format(content, content);
}

/// Printing, reparsing and printing again must not change a single byte.
fn assert_idempotent(content: &str) {
    let once = format(content);
    assert_format(&once, &once);
}

#[test]
fn empty() {
    assert_format("", "");
}

#[test]
fn comments_are_kept_verbatim() {
    assert_noop_format("; comment\n# another ; one\n");
}

#[test]
fn blank_lines_are_preserved() {
    assert_noop_format("\n\n\n\n");
}

#[test]
fn directives_are_kept_verbatim() {
    assert_noop_format("include \"other.ledger\"\naccount Expenses:Food\nP 2017/06/15 USD 50.00 CAD\n");
}

#[test]
fn periodic_and_automated_entries_are_kept_verbatim() {
    assert_noop_format("~ monthly\n  A  20 CAD\n\n= expr:true\n  A  20 CAD\n");
}

#[test]
fn basic_transaction_canonical_form() {
    let expected = format!(
        "2016-09-09 * Kentucky\n    Expenses:Food{}20.00 CAD\n    Assets:Cash{}-20.00 CAD\n",
        // 48 - 13 + 4 + (6 - 5)
        " ".repeat(40),
        // 48 - 11 + 4
        " ".repeat(41),
    );
    assert_format(
        "2016/09/09 * Kentucky\n  Expenses:Food    20.00 CAD\n  Assets:Cash      -20.00 CAD\n",
        &expected,
    );
    // Canonical output is a fixed point.
    assert_noop_format(&expected);
}

#[test]
fn dates_are_normalized_to_dashes() {
    let formatted = format("2016/09.09 Payee\n");
    assert!(formatted.starts_with("2016-09-09 Payee"));
}

#[test]
fn effective_date_status_and_code() {
    assert_noop_format("2016-09-09 = 2016-09-10 * (INV1) Payee ; note\n");
}

#[test]
fn raw_amount_spelling_wins() {
    let formatted = format("2016/09/09 P\n A  - $ 23\n");
    assert!(formatted.contains("- $ 23\n"), "{formatted:?}");
}

#[test]
fn posting_without_amount_gets_no_trailing_spaces() {
    let formatted = format("2016/09/09 P\n  Expenses:Misc    20.00 CAD\n  Assets:Cash\n");
    assert!(formatted.ends_with("\n    Assets:Cash\n"), "{formatted:?}");
}

#[test]
fn value_expression_aligns_left() {
    let expected = format!(
        "2016-09-09 P\n    ! A{}(23 CAD + 123 USD)\n",
        // 48 - (1 + 2 for the status marker) + 4
        " ".repeat(49),
    );
    assert_format("2016/09/09 P\n  ! A      (23 CAD + 123 USD)\n", &expected);
}

#[test]
fn balance_assignment_and_assertion() {
    let expected = format!(
        "2016-09-09 P\n    A{}= 23 CAD\n    B{}20 CAD = 100 CAD\n",
        " ".repeat(51),
        " ".repeat(51),
    );
    assert_format(
        "2016/09/09 P\n  A   = 23 CAD\n  B   20 CAD = 100 CAD\n",
        &expected,
    );
    assert_noop_format(&expected);
}

#[test]
fn lots_and_prices_round_trip() {
    assert_idempotent("2016/09/09 P\n  A  1 AAPL { 5.00 } [2012-04-10] @ $6.00\n  B  23 $ @@ 2 CAD\n");
}

#[test]
fn multi_line_note_continuations_align_with_postings() {
    let formatted = format("2016/09/09 P\n    A  20 CAD\n    ; first\n    ; second\n");
    assert!(
        formatted.contains("; first\n    ; second\n"),
        "{formatted:?}"
    );
    assert_idempotent("2016/09/09 P\n    A  20 CAD\n    ; first\n    ; second\n");
}

#[test]
fn zero_postings_indent_keeps_original_indentation() {
    let tree = parse("test.ledger", "2016-09-09 P\n  A  20 CAD\n").unwrap();
    let mut printer = Printer::new(&tree);
    printer.postings_indent = 0;
    let formatted = printer.print();
    assert!(formatted.contains("\n  A"), "{formatted:?}");
}

#[test]
fn minimum_account_width_is_configurable() {
    let tree = parse("test.ledger", "2016-09-09 P\n  A  20 CAD\n").unwrap();
    let mut printer = Printer::new(&tree);
    printer.minimum_account_width = 10;
    let formatted = printer.print();
    // 10 - 1 + 4 spaces between the account and the amount.
    assert_eq!(formatted, format!("2016-09-09 P\n    A{}20 CAD\n", " ".repeat(13)));
}

#[test]
fn surrounding_trivia_survives_formatting() {
    assert_idempotent(
        "; header comment\n\n2016/09/09 * Kentucky ; eating out\n  Expenses:Food    20.00 CAD\n  Assets:Cash\n\n; trailing comment\n",
    );
}

#[test]
fn formatting_is_idempotent() {
    let inputs = [
        "2016/09/09 * Kentucky\n  Expenses:Food    20.00 CAD\n  Assets:Cash      -20.00 CAD\n",
        "2016/09/09 = 2016-09-10 ! (C1) Payee ; note\n  A  1 AAPL { 5.00 } [2012-04-10] @ $6.00\n",
        "2016/09/09 P\n  A   = 23 CAD\n  B  20 CAD = 100 CAD\n",
        "; comment\n\ninclude \"other.ledger\"\n\n~ monthly\n  A  20 CAD\n\n2016/09/09 P\n  ! A      (23 CAD + 123 USD)\n  B  $.34\n",
        "2016/09/09 P\n  Account2:Spaced child:Leaf     CAD 20.00\n",
    ];
    for input in inputs {
        assert_idempotent(input);
    }
}
