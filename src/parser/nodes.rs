use chrono::NaiveDate;

/// A top-level element of a parsed journal file.
///
/// Nodes keep enough surface detail (verbatim whitespace, raw amount
/// spellings, note positions) for the printer to re-emit the file without
/// losing anything the author wrote.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub enum Node {
    /// One or more consecutive whitespace characters, newlines included,
    /// stored verbatim.
    Space(SpaceNode),
    /// A full-line comment starting at column 0, stored verbatim with its
    /// leading character.
    Comment(CommentNode),
    /// A keyword-led top-level line (`include`, `account`, `end`, `alias`,
    /// `P`) with its raw text and argument payload.
    Directive(DirectiveNode),
    /// A dated transaction with its postings.
    Xact(XactNode),
    /// An automated transaction (`=` at column 0), kept as a raw span.
    AutomatedXact(RawXactNode),
    /// A periodic transaction (`~` at column 0), kept as a raw span.
    PeriodicXact(RawXactNode),
}

impl Node {
    /// Byte offset of the node's first token in the original input.
    pub fn position(&self) -> usize {
        match self {
            Node::Space(n) => n.pos,
            Node::Comment(n) => n.pos,
            Node::Directive(n) => n.pos,
            Node::Xact(n) => n.pos,
            Node::AutomatedXact(n) | Node::PeriodicXact(n) => n.pos,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct SpaceNode {
    pub pos: usize,
    pub space: String,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct CommentNode {
    pub pos: usize,
    /// The whole comment line, leading character included, newline
    /// excluded.
    pub comment: String,
}

/// Identity of a top-level directive keyword.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub enum DirectiveKind {
    Include,
    Account,
    End,
    Alias,
    Price,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct DirectiveNode {
    pub pos: usize,
    pub keyword: DirectiveKind,
    /// The argument payload, verbatim. For `include` this is the filename,
    /// surrounding quotes included if the author wrote them.
    pub args: String,
    /// The whole directive line, newline excluded.
    pub raw: String,
}

impl DirectiveNode {
    /// The include filename with surrounding quotes stripped, or `None`
    /// for other directives.
    pub fn include_path(&self) -> Option<&str> {
        if self.keyword != DirectiveKind::Include {
            return None;
        }
        let args = self.args.trim();
        Some(args.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(args))
    }
}

/// An automated or periodic transaction, preserved as its raw span. The
/// full semantics of these entries are intentionally out of scope; the
/// printer re-emits them verbatim.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct RawXactNode {
    pub pos: usize,
    /// The head line and all following indented lines, newlines included.
    pub raw: String,
}

/// Clearing status of a transaction or posting.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub enum Status {
    #[default]
    None,
    /// `!`
    Pending,
    /// `*`
    Cleared,
}

impl Status {
    pub fn is_set(&self) -> bool {
        *self != Status::None
    }
}

/// A plain dated transaction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct XactNode {
    pub pos: usize,
    pub date: NaiveDate,
    /// Secondary date after `=` in the head line.
    pub effective_date: Option<NaiveDate>,
    pub status: Status,
    /// Code between parentheses in the head line, e.g. a check number.
    pub code: Option<String>,
    pub description: String,
    /// Head-line and continuation notes, joined with `\n`. Empty when the
    /// transaction has no note.
    pub note: String,
    /// Verbatim spacing between the description and the first note line.
    pub note_pre_space: String,
    pub postings: Vec<PostingNode>,
}

impl XactNode {
    pub fn new(date: NaiveDate, description: impl Into<String>) -> Self {
        XactNode {
            pos: 0,
            date,
            effective_date: None,
            status: Status::None,
            code: None,
            description: description.into(),
            note: String::new(),
            note_pre_space: String::new(),
            postings: Vec::new(),
        }
    }

    /// Appends an empty posting for `account` and returns it for further
    /// mutation.
    pub fn new_posting(&mut self, account: impl Into<String>) -> &mut PostingNode {
        self.postings.push(PostingNode::new(account));
        self.postings.last_mut().expect("posting was just pushed")
    }

    /// The first posting for exactly this account name, if any.
    pub fn posting(&self, account: &str) -> Option<&PostingNode> {
        self.postings.iter().find(|p| p.account == account)
    }
}

/// One leg of a transaction.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct PostingNode {
    pub pos: usize,
    /// Indentation before the account name or status, verbatim.
    pub account_pre_space: String,
    pub status: Status,
    /// Colon-separated account path; may contain embedded single spaces.
    pub account: String,
    /// The column-aligning whitespace run after the account, verbatim.
    /// The printer recomputes it; this keeps the original.
    pub account_post_space: String,
    pub amount: Option<AmountNode>,
    pub price: Option<AmountNode>,
    /// Distinguishes `@@` (price for the whole posting) from `@`
    /// (per-unit price). Meaningful only when `price` is set.
    pub price_is_for_whole: bool,
    /// `= amount` when the posting has its own amount.
    pub balance_assertion: Option<AmountNode>,
    /// `= amount` when the posting has no amount of its own.
    pub balance_assignment: Option<AmountNode>,
    pub lot_price: Option<AmountNode>,
    pub lot_date: Option<NaiveDate>,
    /// Posting notes, joined with `\n`. Empty when absent.
    pub note: String,
    pub note_pre_space: String,
}

impl PostingNode {
    pub fn new(account: impl Into<String>) -> Self {
        PostingNode {
            account: account.into(),
            ..PostingNode::default()
        }
    }
}

/// A numeric quantity with an optional commodity and sign, or an opaque
/// parenthesized value expression.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct AmountNode {
    pub pos: usize,
    /// The exact source spelling. When non-empty it is the source of truth
    /// for printing; mutation clears it.
    pub raw: String,
    /// Decimal quantity, `,` and `.` allowed, no exponent. Unsigned; the
    /// sign lives in `negative`.
    pub quantity: String,
    pub negative: bool,
    /// Bare symbol (`$`), identifier (`USD`) or quoted label
    /// (`"fine wine"`), verbatim.
    pub commodity: String,
    /// The full parenthesized expression when the amount is a value
    /// expression. Mutually exclusive with `quantity`.
    pub value_expr: String,
}
