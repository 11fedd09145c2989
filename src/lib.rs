//! Lossless parser, canonical formatter and toolkit for Ledger-style
//! plain-text accounting journals.
//!
//! A journal is tokenized, parsed into a concrete syntax tree that keeps
//! whitespace, comments and raw amount spellings, optionally mutated
//! through the [`journal::Journal`] facade, and re-emitted in canonical
//! form by the [`printer::Printer`].

pub mod budget;
#[doc(hidden)]
#[cfg(feature = "cli")]
pub mod cli;
pub mod filter;
pub mod journal;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod reports;
#[cfg(feature = "tracing")]
mod tracing;

pub use parser::errors::ParseError;
pub use parser::{parse, Tree};
pub use printer::Printer;

/// Formats a ledger journal string into its canonical form with default
/// settings.
pub fn format_journal(content: &str) -> Result<String, ParseError> {
    let tree = parser::parse("stdin", content)?;
    Ok(Printer::new(&tree).print())
}

/// Formats a ledger journal string with an explicit posting indent and
/// minimum account column width.
pub fn format_journal_with_options(
    content: &str,
    postings_indent: usize,
    minimum_account_width: usize,
) -> Result<String, ParseError> {
    let tree = parser::parse("stdin", content)?;
    let mut printer = Printer::new(&tree);
    printer.postings_indent = postings_indent;
    printer.minimum_account_width = minimum_account_width;
    Ok(printer.print())
}
