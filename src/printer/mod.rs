#[cfg(test)]
mod tests;

use chrono::NaiveDate;

use crate::parser::nodes::{AmountNode, Node, PostingNode, Status, XactNode};
use crate::parser::Tree;

/// Formats a parse tree back into a properly laid out ledger file.
///
/// Trivia nodes are reproduced verbatim; transactions are re-emitted in
/// canonical form: `YYYY-MM-DD` dates, postings indented by
/// `postings_indent`, amounts right-aligned against
/// `minimum_account_width`.
pub struct Printer<'a> {
    tree: &'a Tree,
    pub minimum_account_width: usize,
    pub postings_indent: usize,
}

impl<'a> Printer<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Printer {
            tree,
            minimum_account_width: 48,
            postings_indent: 4,
        }
    }

    /// Renders the whole tree.
    pub fn print(&self) -> String {
        let mut out = String::with_capacity(self.tree.text().len() + 64);
        for node in &self.tree.root {
            match node {
                Node::Space(n) => out.push_str(&n.space),
                Node::Comment(n) => {
                    out.push_str(&n.comment);
                    if !n.comment.ends_with('\n') {
                        out.push('\n');
                    }
                }
                Node::Directive(n) => out.push_str(&n.raw),
                Node::AutomatedXact(n) | Node::PeriodicXact(n) => out.push_str(&n.raw),
                Node::Xact(x) => self.write_xact(&mut out, x),
            }
        }
        out
    }

    fn write_xact(&self, out: &mut String, x: &XactNode) {
        out.push_str(&to_date(x.date));
        if let Some(effective) = x.effective_date {
            out.push_str(" = ");
            out.push_str(&to_date(effective));
        }
        match x.status {
            Status::Pending => out.push_str(" !"),
            Status::Cleared => out.push_str(" *"),
            Status::None => {}
        }
        if let Some(code) = &x.code {
            out.push_str(" (");
            out.push_str(code);
            out.push(')');
        }
        out.push(' ');
        out.push_str(&x.description);
        if !x.note.is_empty() {
            out.push_str(&x.note_pre_space);
            out.push_str(&self.comment_returns(x, &x.note));
        }

        for posting in &x.postings {
            out.push('\n');
            out.push_str(&self.posting_account_pre_space(x));
            match posting.status {
                Status::Pending => out.push_str("! "),
                Status::Cleared => out.push_str("* "),
                Status::None => {}
            }
            out.push_str(&posting.account);
            out.push_str(&self.posting_account_post_space(x, posting));
            if let Some(assignment) = &posting.balance_assignment {
                out.push_str("= ");
                out.push_str(&emit_amount(assignment));
            }
            if let Some(amount) = &posting.amount {
                out.push_str(&emit_amount(amount));
            }
            if let Some(lot_price) = &posting.lot_price {
                out.push_str(" { ");
                out.push_str(&emit_amount(lot_price));
                out.push_str(" }");
            }
            if let Some(lot_date) = posting.lot_date {
                out.push_str(" [");
                out.push_str(&to_date(lot_date));
                out.push(']');
            }
            if let Some(price) = &posting.price {
                out.push(' ');
                if posting.price_is_for_whole {
                    out.push('@');
                }
                out.push_str("@ ");
                out.push_str(&emit_amount(price));
            }
            if let Some(assertion) = &posting.balance_assertion {
                out.push_str(" = ");
                out.push_str(&emit_amount(assertion));
            }
            if !posting.note.is_empty() {
                out.push_str(&posting.note_pre_space);
                out.push_str(&self.comment_returns(x, &posting.note));
            }
        }
        out.push('\n');
    }

    /// Indents continuation lines of a multi-line note so they stay
    /// aligned with the postings column.
    fn comment_returns(&self, x: &XactNode, input: &str) -> String {
        let width = if self.postings_indent == 0 {
            x.postings
                .first()
                .map(|p| p.account_pre_space.chars().count())
                .unwrap_or(0)
        } else {
            self.postings_indent
        };
        input.replace('\n', &format!("\n{}", " ".repeat(width)))
    }

    fn posting_account_pre_space(&self, x: &XactNode) -> String {
        if self.postings_indent == 0 {
            return x
                .postings
                .first()
                .map(|p| p.account_pre_space.clone())
                .unwrap_or_default();
        }
        " ".repeat(self.postings_indent)
    }

    /// Computes the whitespace between an account name and its amount so
    /// amounts right-align across the transaction. Value expressions align
    /// on their left-most character; a posting with nothing after the
    /// account gets no trailing spaces at all.
    fn posting_account_post_space(&self, x: &XactNode, posting: &PostingNode) -> String {
        let mut longest_account = 0;
        let mut longest_quantity = 0;
        for posting in &x.postings {
            longest_account = longest_account.max(account_length(posting));
            if let Some(amount) = &posting.amount {
                longest_quantity = longest_quantity.max(quantity_length(amount));
            }
        }
        longest_account = longest_account.max(self.minimum_account_width);

        let mut spacing = longest_account - account_length(posting) + 4;

        if let Some(amount) = &posting.amount {
            if !amount.value_expr.is_empty() {
                return " ".repeat(spacing);
            }
        }
        if posting.amount.is_none()
            && posting.balance_assignment.is_none()
            && posting.lot_price.is_none()
            && posting.lot_date.is_none()
            && posting.price.is_none()
            && posting.note.is_empty()
        {
            return String::new();
        }

        if let Some(amount) = &posting.amount {
            if !amount.quantity.is_empty() {
                spacing += longest_quantity - quantity_length(amount);
            }
        }
        " ".repeat(spacing)
    }
}

/// Account column width: the account name in runes, plus the status
/// marker when present.
fn account_length(posting: &PostingNode) -> usize {
    let mut len = posting.account.chars().count();
    if posting.status.is_set() {
        len += 2;
    }
    len
}

/// Quantity column width: the quantity in runes, plus the sign.
fn quantity_length(amount: &AmountNode) -> usize {
    let mut len = amount.quantity.chars().count();
    if amount.negative {
        len += 1;
    }
    len
}

/// Emits an amount. A captured raw spelling wins; otherwise the canonical
/// notation is used, with `$` attached directly in front of the quantity
/// and other commodities after it.
fn emit_amount(amount: &AmountNode) -> String {
    if !amount.raw.is_empty() {
        return amount.raw.clone();
    }
    if !amount.value_expr.is_empty() {
        return amount.value_expr.clone();
    }
    let mut out = String::new();
    if amount.negative {
        out.push('-');
    }
    if amount.commodity == "$" {
        out.push('$');
        out.push_str(&amount.quantity);
    } else {
        out.push_str(&amount.quantity);
        if !amount.commodity.is_empty() {
            out.push(' ');
            out.push_str(&amount.commodity);
        }
    }
    out
}

fn to_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
