//! Monthly expansion of budget template transactions.
//!
//! A template is any transaction whose note carries the
//! whitespace-delimited token `budget:`. Each template is projected
//! monthly from its own date through `today`; the resulting report covers
//! only the accounts the templates touch.

use std::collections::BTreeSet;

use chrono::{Months, NaiveDate};

use crate::filter::{self, Filter};
use crate::journal::amount::Amount;
use crate::journal::{Journal, JournalError};
use crate::parser::nodes::XactNode;
use crate::reports::{self, BalanceReport};

pub const BUDGET_TOKEN: &str = "budget:";

/// The budget template transactions among `txs`.
pub fn find_budget_txs<'x>(txs: &[&'x XactNode]) -> Vec<&'x XactNode> {
    txs.iter()
        .copied()
        .filter(|tx| tx.note.split_whitespace().any(|word| word == BUDGET_TOKEN))
        .collect()
}

struct Template {
    date: NaiveDate,
    postings: Vec<(String, Amount)>,
}

/// Expands the journal's budget templates monthly through `today` and
/// reports the balance of all non-template activity since `since`,
/// restricted to the accounts the templates name.
pub fn balance(
    journal: &mut Journal,
    since: NaiveDate,
    today: NaiveDate,
) -> Result<BalanceReport, JournalError> {
    let mut templates = Vec::new();
    let mut affected: BTreeSet<String> = BTreeSet::new();
    {
        let txs = journal.transactions();
        for tx in find_budget_txs(&txs) {
            let mut postings = Vec::new();
            for posting in &tx.postings {
                affected.insert(posting.account.clone());
                if let Some(amount) = posting.amount_value()? {
                    postings.push((posting.account.clone(), amount));
                }
            }
            templates.push(Template {
                date: tx.date,
                postings,
            });
        }
    }

    for template in &templates {
        if template.date > today {
            continue;
        }
        let mut month = 0u32;
        loop {
            let date = template.date + Months::new(month);
            if date > today {
                break;
            }
            let tx = journal.add_transaction(date, "budget");
            for (account, amount) in &template.postings {
                tx.new_posting(account.clone())
                    .set_amount(&amount.commodity, amount.quantity.clone());
            }
            month += 1;
        }
    }

    let txs = journal.transactions();
    let txs = Filter::new(txs)
        .with(filter::since(since))
        .with(filter::not(filter::note(BUDGET_TOKEN)))
        .apply();
    let full = reports::balance(&txs)?;

    let mut report = BalanceReport::new();
    for account in &affected {
        if let Some(balance) = full.accounts.get(account) {
            report.accounts.insert(account.clone(), balance.clone());
        }
    }
    Ok(report)
}
