pub mod account;
pub mod amount;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

pub use amount::{Amount, AmountError, AmountValue};

use crate::parser::errors::ParseError;
use crate::parser::nodes::{Node, SpaceNode, XactNode};
use crate::parser::{self, Tree};
use crate::printer::Printer;

/// Error opening, saving or aggregating a journal.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("ledger: {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// A ledger file opened for reading and mutation, with its `include`d
/// journals resolved.
///
/// Includes are loaded depth-first, relative to the including file. A
/// visited-path cache guards the expansion, so include cycles terminate
/// instead of looping.
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    tree: Tree,
    included: Vec<Journal>,
}

impl Journal {
    /// Opens and parses a journal file and every journal it includes.
    pub fn open(path: impl AsRef<Path>) -> Result<Journal, JournalError> {
        let mut seen = HashSet::new();
        Self::open_with_cache(path.as_ref(), &mut seen)
    }

    fn open_with_cache(
        path: &Path,
        seen: &mut HashSet<PathBuf>,
    ) -> Result<Journal, JournalError> {
        let canonical = path.canonicalize().map_err(|source| JournalError::Io {
            path: path.display().to_string(),
            source,
        })?;
        seen.insert(canonical);

        let content = std::fs::read_to_string(path).map_err(|source| JournalError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tree = parser::parse(&path.display().to_string(), &content)?;

        let mut included = Vec::new();
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        for node in &tree.root {
            if let Node::Directive(directive) = node {
                if let Some(name) = directive.include_path() {
                    let target = parent.join(name);
                    // An already opened journal is not expanded again.
                    if let Ok(canonical) = target.canonicalize() {
                        if seen.contains(&canonical) {
                            continue;
                        }
                    }
                    included.push(Self::open_with_cache(&target, seen)?);
                }
            }
        }

        Ok(Journal {
            path: path.to_path_buf(),
            tree,
            included,
        })
    }

    /// Wraps an already parsed tree, e.g. one built from a string.
    pub fn from_tree(tree: Tree) -> Journal {
        Journal {
            path: PathBuf::from(&tree.file_name),
            tree,
            included: Vec::new(),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn included(&self) -> &[Journal] {
        &self.included
    }

    /// All plain transactions: this journal's in source order, then each
    /// included journal's, depth-first.
    pub fn transactions(&self) -> Vec<&XactNode> {
        let mut txs: Vec<&XactNode> = self.tree.transactions().collect();
        for journal in &self.included {
            txs.extend(journal.transactions());
        }
        txs
    }

    /// Appends a new transaction after a blank line and returns it for
    /// mutation. Existing nodes are left untouched, so reprinting keeps
    /// all original trivia byte-identical.
    pub fn add_transaction(
        &mut self,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> &mut XactNode {
        self.tree.root.push(Node::Space(SpaceNode {
            pos: 0,
            space: "\n".to_string(),
        }));
        self.tree.root.push(Node::Xact(XactNode::new(date, description)));
        match self.tree.root.last_mut() {
            Some(Node::Xact(x)) => x,
            _ => unreachable!("transaction was just pushed"),
        }
    }

    /// Pretty-prints the journal with default settings.
    pub fn marshal(&self) -> String {
        Printer::new(&self.tree).print()
    }

    /// Writes the formatted journal back to the path it was opened from.
    pub fn save(&self) -> Result<(), JournalError> {
        let path = self.path.clone();
        self.save_to(path)
    }

    /// Writes the formatted journal to `path`.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), JournalError> {
        let path = path.as_ref();
        std::fs::write(path, self.marshal()).map_err(|source| JournalError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}
