//! Aggregation and reporting of journal balances.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

use num::{BigRational, Zero};

use crate::journal::account::base;
use crate::journal::amount::{Amount, AmountError};
use crate::parser::nodes::XactNode;

/// Per-commodity rational balances of one account.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountBalance {
    pub name: String,
    pub amounts: BTreeMap<String, BigRational>,
}

impl AccountBalance {
    pub fn new(name: impl Into<String>) -> Self {
        AccountBalance {
            name: name.into(),
            amounts: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, amount: &Amount) {
        let entry = self
            .amounts
            .entry(amount.commodity.clone())
            .or_insert_with(BigRational::zero);
        *entry += &amount.quantity;
    }

    /// The balances as displayable amounts, ordered by commodity.
    pub fn amounts(&self) -> Vec<Amount> {
        self.amounts
            .iter()
            .map(|(commodity, quantity)| Amount {
                commodity: commodity.clone(),
                quantity: quantity.clone(),
            })
            .collect()
    }
}

/// Aggregated balances per account, with child sums rolled up into their
/// parents and a grand total.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceReport {
    pub accounts: BTreeMap<String, AccountBalance>,
    pub total: AccountBalance,
}

impl BalanceReport {
    pub fn new() -> Self {
        BalanceReport {
            accounts: BTreeMap::new(),
            total: AccountBalance::new(""),
        }
    }

    fn account_mut(&mut self, name: &str) -> &mut AccountBalance {
        if name.is_empty() {
            return &mut self.total;
        }
        self.accounts
            .entry(name.to_string())
            .or_insert_with(|| AccountBalance::new(name))
    }

    /// Writes the report with amounts right-aligned, a dashed rule and
    /// the total row.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let total = format_account(&self.total);
        let mut width = total.width;
        let mut rows: Vec<FormattedAccount> = self
            .accounts
            .values()
            .map(format_account)
            .collect();
        for row in &rows {
            width = width.max(row.width);
        }
        rows.sort_by(|a, b| a.name.cmp(&b.name));

        for row in &rows {
            writeln!(w, "{}{}", " ".repeat(width - row.width), row.text)?;
        }
        writeln!(w, "{}", "-".repeat(width))?;
        writeln!(w, "{}{}", " ".repeat(width - total.width), total.text)?;
        Ok(())
    }
}

impl Default for BalanceReport {
    fn default() -> Self {
        Self::new()
    }
}

struct FormattedAccount {
    name: String,
    text: String,
    /// Rune length of the widest amount, used to right-align rows.
    width: usize,
}

fn format_account(account: &AccountBalance) -> FormattedAccount {
    let mut text = String::new();
    let mut width = 0;
    for amount in account.amounts() {
        let value = amount.to_string();
        width = width.max(value.chars().count());
        text.push_str(&value);
        text.push('\n');
    }
    let mut text = text.trim().to_string();
    text.push_str("  ");
    text.push_str(&account.name);
    FormattedAccount {
        name: account.name.clone(),
        text,
        width,
    }
}

/// Sums all postings of the given transactions into a balance report.
pub fn balance(txs: &[&XactNode]) -> Result<BalanceReport, AmountError> {
    balance_filtered(txs, None)
}

/// Like [`balance`], keeping only accounts relevant to `filter`. An
/// account is relevant when the predicate accepts it or any of its
/// ancestors; hidden children still influence their parents' sums.
pub fn balance_filtered(
    txs: &[&XactNode],
    filter: Option<&dyn Fn(&str) -> bool>,
) -> Result<BalanceReport, AmountError> {
    let mut report = BalanceReport::new();

    // Sum up balances of all individual accounts.
    for tx in txs {
        for posting in &tx.postings {
            if let Some(amount) = posting.amount_value()? {
                report.account_mut(&posting.account).add(&amount);
            }
        }
    }

    // Mark relevant accounts and the ancestors to display for them.
    let mut displayed: BTreeSet<String> = BTreeSet::new();
    let names: Vec<String> = report.accounts.keys().cloned().collect();
    for name in &names {
        let mut relevant = false;
        let mut current = name.as_str();
        while !current.is_empty() {
            if filter.map_or(true, |f| f(current)) {
                relevant = true;
            }
            if relevant {
                displayed.insert(current.to_string());
            }
            current = base(current);
        }
        if !relevant {
            report.accounts.remove(name);
        }
    }

    // Make sure all displayed parent accounts exist.
    for name in &displayed {
        report.account_mut(name);
    }

    // Aggregate child accounts into parents, children before parents.
    let mut names: Vec<String> = report.accounts.keys().cloned().collect();
    names.sort_by(|a, b| {
        let (an, bn) = (depth(a), depth(b));
        if an == bn {
            a.cmp(b)
        } else {
            bn.cmp(&an)
        }
    });
    for name in names {
        let amounts = report.accounts[&name].amounts();
        let parent = base(&name).to_string();
        for amount in amounts {
            report.account_mut(&parent).add(&amount);
        }
    }

    // Drop hidden child accounts.
    report.accounts.retain(|name, _| displayed.contains(name));

    Ok(report)
}

fn depth(name: &str) -> usize {
    name.matches(':').count()
}
