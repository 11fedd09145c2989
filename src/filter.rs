//! Simple combinators to filter ledger transactions.

use chrono::NaiveDate;

use crate::parser::nodes::XactNode;

/// A predicate over transactions.
pub type FilterFn = Box<dyn Fn(&XactNode) -> bool>;

/// Collects transactions passing every attached predicate.
pub struct Filter<'x> {
    txs: Vec<&'x XactNode>,
    filters: Vec<FilterFn>,
}

impl<'x> Filter<'x> {
    pub fn new(txs: Vec<&'x XactNode>) -> Self {
        Filter {
            txs,
            filters: Vec::new(),
        }
    }

    pub fn with(mut self, filter: FilterFn) -> Self {
        self.filters.push(filter);
        self
    }

    /// Transactions matching all predicates, in their original order.
    pub fn apply(self) -> Vec<&'x XactNode> {
        let filters = self.filters;
        self.txs
            .into_iter()
            .filter(|tx| filters.iter().all(|f| f(tx)))
            .collect()
    }
}

/// Transactions strictly after `date`.
pub fn since(date: NaiveDate) -> FilterFn {
    Box::new(move |tx| tx.date > date)
}

/// Transactions strictly before `date`.
pub fn until(date: NaiveDate) -> FilterFn {
    Box::new(move |tx| tx.date < date)
}

/// Transactions with a posting for exactly this account.
pub fn account(account: impl Into<String>) -> FilterFn {
    let account = account.into();
    Box::new(move |tx| tx.posting(&account).is_some())
}

/// Transactions whose description contains `text`.
pub fn description(text: impl Into<String>) -> FilterFn {
    let text = text.into();
    Box::new(move |tx| tx.description.contains(&text))
}

/// Transactions whose note carries `token` as a whitespace-delimited word.
pub fn note(token: impl Into<String>) -> FilterFn {
    let token = token.into();
    Box::new(move |tx| tx.note.split_whitespace().any(|word| word == token))
}

/// Inverts a predicate.
pub fn not(filter: FilterFn) -> FilterFn {
    Box::new(move |tx| !filter(tx))
}
