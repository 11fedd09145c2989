use crate::parser::{errors::ParseError, nodes::*, parse};

fn parse_ok(content: &str) -> Vec<Node> {
    parse("file.ledger", content).unwrap().root
}

fn single_xact(content: &str) -> XactNode {
    let root = parse_ok(content);
    let xacts: Vec<&XactNode> = root
        .iter()
        .filter_map(|node| match node {
            Node::Xact(x) => Some(x),
            _ => None,
        })
        .collect();
    assert_eq!(xacts.len(), 1, "expected one transaction in {content:?}");
    xacts[0].clone()
}

fn assert_parse_err(content: &str, expected: &str) {
    let err = parse("file.ledger", content).unwrap_err();
    assert_eq!(err.to_string(), expected, "parsing {content:?}");
}

fn date(s: &str) -> chrono::NaiveDate {
    s.parse().unwrap()
}

#[test]
fn basic_transaction() {
    let x = single_xact(
        "2016/09/09 * Kentucky\n  Expenses:Food    20.00 CAD\n  Assets:Cash      -20.00 CAD\n",
    );
    assert_eq!(x.date, date("2016-09-09"));
    assert_eq!(x.status, Status::Cleared);
    assert_eq!(x.description, "Kentucky");
    assert_eq!(x.postings.len(), 2);

    let food = &x.postings[0];
    assert_eq!(food.account, "Expenses:Food");
    assert_eq!(food.account_pre_space, "  ");
    assert_eq!(food.account_post_space, "    ");
    let amount = food.amount.as_ref().unwrap();
    assert_eq!(amount.quantity, "20.00");
    assert_eq!(amount.commodity, "CAD");
    assert!(!amount.negative);
    assert_eq!(amount.raw, "20.00 CAD");

    let cash = &x.postings[1];
    let amount = cash.amount.as_ref().unwrap();
    assert!(amount.negative);
    assert_eq!(amount.quantity, "20.00");
    assert_eq!(amount.raw, "-20.00 CAD");
}

#[test]
fn effective_date_and_code() {
    let x = single_xact("2016/09/09 = 2016-09-10 * (INV1) Payee ; note\n");
    assert_eq!(x.date, date("2016-09-09"));
    assert_eq!(x.effective_date, Some(date("2016-09-10")));
    assert_eq!(x.status, Status::Cleared);
    assert_eq!(x.code.as_deref(), Some("INV1"));
    assert_eq!(x.description, "Payee ");
    assert_eq!(x.note, "; note");
}

#[test]
fn description_is_right_trimmed_without_note() {
    let x = single_xact("2016/09/09 Payee   \n");
    assert_eq!(x.description, "Payee");
}

#[test]
fn amount_spelling_is_preserved() {
    let x = single_xact("2016/09/09 P\n A  - $ 23\n");
    let amount = x.postings[0].amount.as_ref().unwrap();
    assert!(amount.negative);
    assert_eq!(amount.commodity, "$");
    assert_eq!(amount.quantity, "23");
    assert_eq!(amount.raw, "- $ 23");
}

#[test]
fn leading_decimal_point_quantity() {
    let x = single_xact("2016/09/09 P\n B  $.34\n");
    let amount = x.postings[0].amount.as_ref().unwrap();
    assert_eq!(amount.commodity, "$");
    assert_eq!(amount.quantity, ".34");
    assert!(!amount.negative);
}

#[test]
fn total_price() {
    let x = single_xact("2016/09/09 P\n B  23 $ @@ 2 CAD\n");
    let posting = &x.postings[0];
    assert!(posting.price_is_for_whole);
    let price = posting.price.as_ref().unwrap();
    assert_eq!(price.quantity, "2");
    assert_eq!(price.commodity, "CAD");
}

#[test]
fn per_unit_price() {
    let x = single_xact("2016/09/09 P\n B  23 CAD @ USD 40.00\n");
    let posting = &x.postings[0];
    assert!(!posting.price_is_for_whole);
    let price = posting.price.as_ref().unwrap();
    assert_eq!(price.quantity, "40.00");
    assert_eq!(price.commodity, "USD");
}

#[test]
fn value_expression_amount() {
    let x = single_xact("2016/09/09 P\n  ! A      (23 CAD + 123 USD)\n");
    let posting = &x.postings[0];
    assert_eq!(posting.status, Status::Pending);
    let amount = posting.amount.as_ref().unwrap();
    assert_eq!(amount.value_expr, "(23 CAD + 123 USD)");
    assert!(amount.quantity.is_empty());
}

#[test]
fn balance_assignment_without_amount() {
    let x = single_xact("2016/09/09 P\n  A   = 23 CAD\n");
    let posting = &x.postings[0];
    assert!(posting.amount.is_none());
    let assignment = posting.balance_assignment.as_ref().unwrap();
    assert_eq!(assignment.quantity, "23");
    assert_eq!(assignment.commodity, "CAD");
    assert!(posting.balance_assertion.is_none());
}

#[test]
fn balance_assertion_with_amount() {
    let x = single_xact("2016/09/09 P\n  A   20 CAD = 100 CAD\n");
    let posting = &x.postings[0];
    assert_eq!(posting.amount.as_ref().unwrap().quantity, "20");
    let assertion = posting.balance_assertion.as_ref().unwrap();
    assert_eq!(assertion.quantity, "100");
    assert!(posting.balance_assignment.is_none());
}

#[test]
fn lot_price_and_lot_date() {
    let x = single_xact("2016/09/09 P\n  A  1 AAPL { 5.00 } [2012-04-10] @ $6.00\n");
    let posting = &x.postings[0];
    assert_eq!(posting.lot_price.as_ref().unwrap().quantity, "5.00");
    assert_eq!(posting.lot_date, Some(date("2012-04-10")));
    assert_eq!(posting.price.as_ref().unwrap().commodity, "$");
}

#[test]
fn multi_line_posting_note_merges() {
    let x = single_xact("2016/09/09 P\n  A  20 CAD\n  ; first\n  ; second\n");
    let posting = &x.postings[0];
    assert_eq!(posting.note, "; first\n; second");
    assert_eq!(posting.note_pre_space, "\n  ");
}

#[test]
fn note_before_any_posting_attaches_to_transaction() {
    let x = single_xact("2016/09/09 P\n  ; a note\n  A  20 CAD\n");
    assert_eq!(x.note, "; a note");
    assert_eq!(x.postings.len(), 1);
    assert!(x.postings[0].note.is_empty());
}

#[test]
fn posting_with_note_only() {
    let x = single_xact("2016/09/09 ! Payee\n  Expenses:Misc    20.00 CAD\n  Assets:Cash  ; Woah, not sure\n");
    assert_eq!(x.status, Status::Pending);
    let cash = &x.postings[1];
    assert_eq!(cash.account, "Assets:Cash");
    assert!(cash.amount.is_none());
    assert_eq!(cash.note, "; Woah, not sure");
}

#[test]
fn posting_status_markers() {
    let x = single_xact("2016/09/09 P\n  * A  20 CAD\n  ! B  -20 CAD\n");
    assert_eq!(x.postings[0].status, Status::Cleared);
    assert_eq!(x.postings[1].status, Status::Pending);
}

#[test]
fn trivia_nodes_coalesce() {
    let root = parse_ok("\n\n; comment\n\n2016-09-09 P\n  A  20 CAD\n");
    match &root[0] {
        Node::Space(space) => assert_eq!(space.space, "\n\n"),
        other => panic!("expected leading space node, got {other:?}"),
    }
    match &root[1] {
        Node::Comment(comment) => assert_eq!(comment.comment, "; comment"),
        other => panic!("expected comment node, got {other:?}"),
    }
    match &root[2] {
        Node::Space(space) => assert_eq!(space.space, "\n"),
        other => panic!("expected space node, got {other:?}"),
    }
    assert!(matches!(&root[3], Node::Xact(_)));
}

#[test]
fn include_directive() {
    let root = parse_ok("include \"other.ledger\"\n");
    match &root[0] {
        Node::Directive(directive) => {
            assert_eq!(directive.keyword, DirectiveKind::Include);
            assert_eq!(directive.args, "\"other.ledger\"");
            assert_eq!(directive.raw, "include \"other.ledger\"");
            assert_eq!(directive.include_path(), Some("other.ledger"));
        }
        other => panic!("expected directive node, got {other:?}"),
    }
}

#[test]
fn untyped_directives_keep_raw_text() {
    let root = parse_ok("account Expenses:Food\nalias cash = Assets:Cash\nP 2017/06/15 USD 50.00 CAD\n");
    let raws: Vec<(&DirectiveKind, &str)> = root
        .iter()
        .filter_map(|node| match node {
            Node::Directive(d) => Some((&d.keyword, d.raw.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(
        raws,
        vec![
            (&DirectiveKind::Account, "account Expenses:Food"),
            (&DirectiveKind::Alias, "alias cash = Assets:Cash"),
            (&DirectiveKind::Price, "P 2017/06/15 USD 50.00 CAD"),
        ]
    );
}

#[test]
fn periodic_xact_is_kept_as_raw_span() {
    let root = parse_ok("~ monthly\n  A  20 CAD\n  B\n\n2016-09-09 P\n  A  1 CAD\n");
    match &root[0] {
        Node::PeriodicXact(raw) => {
            assert_eq!(raw.raw, "~ monthly\n  A  20 CAD\n  B\n");
        }
        other => panic!("expected periodic transaction, got {other:?}"),
    }
    assert!(matches!(&root[1], Node::Space(_)));
}

#[test]
fn automated_xact_is_kept_as_raw_span() {
    let root = parse_ok("= expr:true\n  A  20 CAD\n");
    match &root[0] {
        Node::AutomatedXact(raw) => {
            assert_eq!(raw.raw, "= expr:true\n  A  20 CAD\n");
        }
        other => panic!("expected automated transaction, got {other:?}"),
    }
}

#[test]
fn sort_transactions_keeps_attached_trivia() {
    let mut tree = parse(
        "file.ledger",
        "; second's comment\n2016-09-10 Second\n  A  2 CAD\n\n2016-09-09 First\n  A  1 CAD\n\n; trailing\n",
    )
    .unwrap();
    tree.sort_transactions();
    let descriptions: Vec<&str> = tree.transactions().map(|x| x.description.as_str()).collect();
    assert_eq!(descriptions, vec!["First", "Second"]);
    // The comment stays glued to the transaction it preceded.
    let comment_index = tree
        .root
        .iter()
        .position(|n| matches!(n, Node::Comment(c) if c.comment == "; second's comment"))
        .unwrap();
    assert!(matches!(&tree.root[comment_index + 1], Node::Xact(x) if x.description == "Second"));
    // Trailing trivia stays at the end.
    assert!(matches!(
        tree.root.last().unwrap(),
        Node::Space(_) | Node::Comment(_)
    ));
}

// Errors.

#[test]
fn duplicate_status_is_rejected() {
    assert_parse_err(
        "2016/09/09 * * heya!",
        "ledger: file.ledger:1: cannot specify cleared and/or pending more than once",
    );
}

#[test]
fn lexer_errors_carry_the_file_position() {
    assert_parse_err(
        "2016/09eee\n",
        "ledger: file.ledger:1: date format error, expects YYYY-MM-DD with '/', '-' or '.' as separators, received character U+0065 'e'",
    );
}

#[test]
fn include_requires_a_filename() {
    assert_parse_err(
        "include\n",
        "ledger: file.ledger:1: missing filename after 'include'",
    );
}

#[test]
fn note_before_description_is_rejected() {
    assert_parse_err(
        "2016/09/09 ; note\n",
        "ledger: file.ledger:1: missing payee/description before notes",
    );
}

#[test]
fn unsupported_top_level_directive() {
    assert_parse_err(
        "foo bar\n",
        "ledger: file.ledger:1: unsupported top-level directive",
    );
}

#[test]
fn error_line_numbers_count_from_one() {
    assert_parse_err(
        "2016/09/09 P\n  A  20 CAD\n\n2016/09/10 * * Q\n",
        "ledger: file.ledger:4: cannot specify cleared and/or pending more than once",
    );
}

#[test]
fn negative_price_is_rejected() {
    let err = parse("file.ledger", "2016/09/09 P\n  A  1 AAPL @ -5 CAD\n").unwrap_err();
    assert_eq!(
        err,
        ParseError {
            file: "file.ledger".to_string(),
            line: 2,
            message: "negative prices are not allowed".to_string(),
        }
    );
}
