use thiserror::Error;

/// Error occurring while parsing a journal file.
///
/// Displays as `ledger: <file>:<line>: <message>`, the same shape the
/// original tools print. The first error aborts the parse; there are no
/// warnings and no partial trees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ledger: {file}:{line}: {message}")]
pub struct ParseError {
    /// Name of the input, as given to the parser.
    pub file: String,
    /// Line number of the offending token (1-indexed).
    pub line: usize,
    pub message: String,
}
