pub mod errors;
pub mod nodes;
#[cfg(test)]
mod tests;

use chrono::NaiveDate;

use crate::lexer::{Lexer, Token, TokenKind};
use errors::ParseError;
use nodes::{
    AmountNode, CommentNode, DirectiveKind, DirectiveNode, Node, PostingNode, RawXactNode,
    SpaceNode, Status, XactNode,
};

/// The representation of a single parsed ledger file: the original text
/// plus an ordered list of top-level nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub file_name: String,
    pub root: Vec<Node>,
    text: String,
}

impl Tree {
    /// The original input text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Line number (1-indexed) of a byte offset in the original input.
    pub fn line_of(&self, pos: usize) -> usize {
        let end = pos.min(self.text.len());
        1 + self.text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count()
    }

    /// Iterates over the plain transactions in source order.
    pub fn transactions(&self) -> impl Iterator<Item = &XactNode> {
        self.root.iter().filter_map(|n| match n {
            Node::Xact(x) => Some(x),
            _ => None,
        })
    }

    /// Reorders transactions by date, stably. Non-transaction nodes stay
    /// immediately in front of the next transaction they preceded; nodes
    /// trailing the last transaction stay at the end of the file.
    pub fn sort_transactions(&mut self) {
        let nodes = std::mem::take(&mut self.root);
        let mut chunks: Vec<(NaiveDate, Vec<Node>)> = Vec::new();
        let mut pending: Vec<Node> = Vec::new();
        for node in nodes {
            let date = match &node {
                Node::Xact(x) => Some(x.date),
                _ => None,
            };
            pending.push(node);
            if let Some(date) = date {
                chunks.push((date, std::mem::take(&mut pending)));
            }
        }
        chunks.sort_by_key(|(date, _)| *date);
        for (_, chunk) in chunks {
            self.root.extend(chunk);
        }
        self.root.extend(pending);
    }
}

/// Parses a ledger file content into a [`Tree`].
///
/// `file_name` only appears in error messages. The whole input is parsed
/// eagerly; the first error aborts and surfaces as
/// `ledger: <file>:<line>: <message>`.
pub fn parse(file_name: &str, input: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new(file_name, input);
    let root = parser.parse_journal()?;
    Ok(Tree {
        file_name: file_name.to_string(),
        root,
        text: input.to_string(),
    })
}

/// Token kinds that can form part of an amount after its first token.
const AMOUNT_COMPONENTS: [TokenKind; 3] =
    [TokenKind::Neg, TokenKind::Commodity, TokenKind::Quantity];

/// Recursive-descent parser over the lexer's token stream, with the
/// original's three-token lookahead ring.
struct Parser<'a> {
    file_name: &'a str,
    input: &'a str,
    lex: Lexer<'a>,
    /// Lookahead ring; `token[peek_count - 1]` is the next token.
    token: [Token<'a>; 3],
    peek_count: usize,
    /// Position of the most recently fetched token, for line numbers.
    last_pos: usize,
}

impl<'a> Parser<'a> {
    fn new(file_name: &'a str, input: &'a str) -> Self {
        let placeholder = Token {
            kind: TokenKind::Eof,
            pos: 0,
            text: std::borrow::Cow::Borrowed(""),
        };
        Parser {
            file_name,
            input,
            lex: Lexer::new(input),
            token: [placeholder.clone(), placeholder.clone(), placeholder],
            peek_count: 0,
            last_pos: 0,
        }
    }

    // Token ring plumbing.

    fn fetch(&mut self) -> Token<'a> {
        let token = self.lex.next_token();
        self.last_pos = token.pos;
        token
    }

    /// Returns the next token.
    fn next(&mut self) -> Token<'a> {
        if self.peek_count > 0 {
            self.peek_count -= 1;
        } else {
            self.token[0] = self.fetch();
        }
        self.token[self.peek_count].clone()
    }

    /// Backs the input stream up one token.
    fn backup(&mut self) {
        self.peek_count += 1;
    }

    /// Backs the input stream up two tokens; the zeroth is already there.
    fn backup2(&mut self, t1: Token<'a>) {
        self.token[1] = t1;
        self.peek_count = 2;
    }

    /// Returns but does not consume the next token.
    fn peek(&mut self) -> Token<'a> {
        if self.peek_count > 0 {
            return self.token[self.peek_count - 1].clone();
        }
        self.peek_count = 1;
        self.token[0] = self.fetch();
        self.token[0].clone()
    }

    /// Returns the next non-space token.
    fn next_non_space(&mut self) -> Token<'a> {
        loop {
            let token = self.next();
            if token.kind != TokenKind::Space {
                return token;
            }
        }
    }

    /// Returns but does not consume the next non-space token.
    fn peek_non_space(&mut self) -> Token<'a> {
        let token = self.next_non_space();
        self.backup();
        token
    }

    // Error plumbing.

    fn line_number(&self) -> usize {
        let end = self.last_pos.min(self.input.len());
        1 + self.input.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count()
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            file: self.file_name.to_string(),
            line: self.line_number(),
            message: message.into(),
        }
    }

    fn unexpected(&self, token: &Token<'_>, context: &str) -> ParseError {
        if token.kind == TokenKind::Error {
            return self.error(token.text.to_string());
        }
        self.error(format!("unexpected {token} in {context}"))
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Result<Token<'a>, ParseError> {
        let token = self.next_non_space();
        if token.kind != kind {
            return Err(self.unexpected(&token, context));
        }
        Ok(token)
    }

    /// Consumes the end of the current line. End of input is accepted and
    /// left in place for the top-level loop.
    fn expect_eol(&mut self, context: &str) -> Result<(), ParseError> {
        let token = self.next();
        match token.kind {
            TokenKind::Eol => Ok(()),
            TokenKind::Eof => {
                self.backup();
                Ok(())
            }
            _ => Err(self.unexpected(&token, context)),
        }
    }

    // Grammar.

    /// Top-level loop: dispatches on the next token until end of input.
    fn parse_journal(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut root = Vec::new();
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Error => {
                    let token = self.next();
                    return Err(self.error(token.text.to_string()));
                }
                TokenKind::Space | TokenKind::Eol => {
                    root.push(self.parse_space_run());
                }
                TokenKind::Comment => {
                    let token = self.next();
                    root.push(Node::Comment(CommentNode {
                        pos: token.pos,
                        comment: token.text.to_string(),
                    }));
                    self.expect_eol("comment")?;
                }
                TokenKind::Equal => {
                    let raw = self.parse_raw_xact()?;
                    root.push(Node::AutomatedXact(raw));
                }
                TokenKind::Tilde => {
                    let raw = self.parse_raw_xact()?;
                    root.push(Node::PeriodicXact(raw));
                }
                TokenKind::Date => {
                    root.push(Node::Xact(self.parse_xact()?));
                }
                TokenKind::Include
                | TokenKind::AccountKw
                | TokenKind::End
                | TokenKind::Alias
                | TokenKind::Price => {
                    root.push(Node::Directive(self.parse_directive()));
                }
                _ => {
                    let token = self.next();
                    if token.kind == TokenKind::Error {
                        return Err(self.error(token.text.to_string()));
                    }
                    return Err(self.error("unsupported top-level directive"));
                }
            }
        }
        Ok(root)
    }

    /// Coalesces adjacent space and end-of-line tokens into a single
    /// trivia node, preserving the exact text.
    fn parse_space_run(&mut self) -> Node {
        let first = self.next();
        let pos = first.pos;
        let mut space = first.text.to_string();
        while matches!(self.peek().kind, TokenKind::Space | TokenKind::Eol) {
            space.push_str(&self.next().text);
        }
        Node::Space(SpaceNode { pos, space })
    }

    /// A keyword-led directive line. The terminating end of line is left
    /// for the top-level loop so the surrounding trivia stays intact.
    fn parse_directive(&mut self) -> DirectiveNode {
        let keyword_token = self.next();
        let keyword = match keyword_token.kind {
            TokenKind::Include => DirectiveKind::Include,
            TokenKind::AccountKw => DirectiveKind::Account,
            TokenKind::End => DirectiveKind::End,
            TokenKind::Alias => DirectiveKind::Alias,
            _ => DirectiveKind::Price,
        };
        let pos = keyword_token.pos;
        let mut raw = keyword_token.text.to_string();
        if self.peek().kind == TokenKind::Space {
            raw.push_str(&self.next().text);
        }
        let mut args = String::new();
        if self.peek().kind == TokenKind::String {
            let token = self.next();
            args = token.text.to_string();
            raw.push_str(&token.text);
        }
        DirectiveNode { pos, keyword, args, raw }
    }

    /// Captures an automated (`=`) or periodic (`~`) transaction as a raw
    /// span: the head line plus every following indented line.
    fn parse_raw_xact(&mut self) -> Result<RawXactNode, ParseError> {
        let start = self.next();
        let pos = start.pos;
        let mut raw = start.text.to_string();
        self.consume_raw_line(&mut raw)?;
        loop {
            let token = self.peek();
            if token.kind != TokenKind::Space {
                break;
            }
            let indent = self.next();
            if self.peek().kind == TokenKind::Eol {
                // A blank line ends the entry; leave it as trivia.
                self.backup2(indent);
                break;
            }
            raw.push_str(&indent.text);
            self.consume_raw_line(&mut raw)?;
        }
        Ok(RawXactNode { pos, raw })
    }

    /// Appends token texts verbatim up to and including the end of line.
    fn consume_raw_line(&mut self, raw: &mut String) -> Result<(), ParseError> {
        loop {
            let token = self.next();
            match token.kind {
                TokenKind::Error => return Err(self.error(token.text.to_string())),
                TokenKind::Eof => {
                    self.backup();
                    return Ok(());
                }
                TokenKind::Eol => {
                    raw.push_str(&token.text);
                    return Ok(());
                }
                _ => raw.push_str(&token.text),
            }
        }
    }

    /// A plain transaction: head line, then postings.
    fn parse_xact(&mut self) -> Result<XactNode, ParseError> {
        let date_token = self.next();
        let date = self.to_date(&date_token.text)?;
        let mut x = XactNode::new(date, "");
        x.pos = date_token.pos;

        if self.peek_non_space().kind == TokenKind::Equal {
            self.next_non_space();
            let token = self.next_non_space();
            if token.kind != TokenKind::Date {
                return Err(self.unexpected(&token, "transaction effective date"));
            }
            x.effective_date = Some(self.to_date(&token.text)?);
        }

        match self.peek_non_space().kind {
            TokenKind::Asterisk => {
                self.next_non_space();
                x.status = Status::Cleared;
            }
            TokenKind::Exclamation => {
                self.next_non_space();
                x.status = Status::Pending;
            }
            TokenKind::Note => {
                return Err(self.error("missing payee/description before notes"));
            }
            TokenKind::Eol | TokenKind::Eof => {
                return Err(self.error("unexpected end of input"));
            }
            _ => {}
        }

        if matches!(
            self.peek_non_space().kind,
            TokenKind::Asterisk | TokenKind::Exclamation
        ) {
            return Err(self.error("cannot specify cleared and/or pending more than once"));
        }

        if self.peek_non_space().kind == TokenKind::LeftParen {
            self.next_non_space();
            let token = self.next();
            if token.kind != TokenKind::String {
                return Err(self.unexpected(&token, "transaction code"));
            }
            x.code = Some(token.text.to_string());
            self.expect(TokenKind::RightParen, "transaction code")?;
        }

        let token = self.next_non_space();
        match token.kind {
            TokenKind::String => x.description = token.text.to_string(),
            TokenKind::Note => {
                return Err(self.error("missing payee/description before notes"));
            }
            TokenKind::Eol | TokenKind::Eof => {
                return Err(self.error("unexpected end of input"));
            }
            _ => return Err(self.unexpected(&token, "transaction description")),
        }

        if self.peek().kind == TokenKind::Note {
            let token = self.next();
            x.note = token.text.to_string();
        }

        self.expect_eol("transaction")?;

        // With no trailing note the description keeps no meaning in its
        // trailing spaces.
        if x.note.is_empty() {
            x.description = x.description.trim_end().to_string();
        }

        self.parse_postings(&mut x)?;
        Ok(x)
    }

    /// The indented block after a transaction head. Exits on the first
    /// line that does not begin with whitespace.
    fn parse_postings(&mut self, x: &mut XactNode) -> Result<(), ParseError> {
        loop {
            if self.peek().kind != TokenKind::Space {
                break;
            }
            let indent = self.next();
            let token = self.peek();
            match token.kind {
                TokenKind::AccountName | TokenKind::Asterisk | TokenKind::Exclamation => {
                    let posting = self.parse_posting(&indent)?;
                    x.postings.push(posting);
                }
                TokenKind::Note => {
                    let note_token = self.next();
                    attach_note(x, &indent.text, &note_token.text);
                    self.expect_eol("note")?;
                }
                _ => {
                    self.backup2(indent);
                    break;
                }
            }
        }
        Ok(())
    }

    fn parse_posting(&mut self, indent: &Token<'_>) -> Result<PostingNode, ParseError> {
        let mut posting = PostingNode::new("");
        posting.pos = indent.pos;
        posting.account_pre_space = indent.text.to_string();

        match self.peek().kind {
            TokenKind::Asterisk => {
                self.next();
                posting.status = Status::Cleared;
            }
            TokenKind::Exclamation => {
                self.next();
                posting.status = Status::Pending;
            }
            _ => {}
        }

        let token = self.next_non_space();
        if token.kind != TokenKind::AccountName {
            return Err(self.unexpected(&token, "posting account"));
        }
        posting.account = token.text.to_string();

        if self.peek().kind == TokenKind::Space {
            posting.account_post_space = self.next().text.to_string();
        }

        if self.peek().kind == TokenKind::Note {
            let token = self.next();
            posting.note = token.text.to_string();
            self.expect_eol("posting")?;
            return Ok(posting);
        }

        posting.amount = self.parse_amount()?;
        self.parse_posting_elements(&mut posting)?;
        self.expect_eol("posting")?;
        Ok(posting)
    }

    /// Prices, balance assertions/assignments, lot annotations and the
    /// trailing note, each at most once, in any order.
    fn parse_posting_elements(&mut self, posting: &mut PostingNode) -> Result<(), ParseError> {
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Space => {
                    let space = self.next();
                    match self.peek().kind {
                        TokenKind::Note => {
                            posting.note_pre_space = space.text.to_string();
                            let note = self.next();
                            posting.note = note.text.to_string();
                            return Ok(());
                        }
                        TokenKind::Eol | TokenKind::Eof => {
                            return Ok(());
                        }
                        TokenKind::Error => {
                            let token = self.next();
                            return Err(self.error(token.text.to_string()));
                        }
                        TokenKind::At
                        | TokenKind::DoubleAt
                        | TokenKind::Equal
                        | TokenKind::LotPrice
                        | TokenKind::LotDate => {
                            // Element separator; canonical printing re-adds
                            // single spaces.
                        }
                        _ => {
                            self.backup2(space);
                            return Ok(());
                        }
                    }
                }
                TokenKind::At | TokenKind::DoubleAt if posting.price.is_none() => {
                    self.next();
                    self.skip_one_space();
                    let amount = match self.parse_amount()? {
                        Some(amount) => amount,
                        None => {
                            let token = self.peek();
                            return Err(self.unexpected(&token, "posting price"));
                        }
                    };
                    if amount.negative {
                        return Err(self.error("negative prices are not allowed"));
                    }
                    posting.price_is_for_whole = token.kind == TokenKind::DoubleAt;
                    posting.price = Some(amount);
                }
                TokenKind::Equal
                    if posting.balance_assertion.is_none()
                        && posting.balance_assignment.is_none() =>
                {
                    self.next();
                    self.skip_one_space();
                    let amount = match self.parse_amount()? {
                        Some(amount) => amount,
                        None => {
                            let token = self.peek();
                            return Err(self.unexpected(&token, "balance amount"));
                        }
                    };
                    if posting.amount.is_some() {
                        posting.balance_assertion = Some(amount);
                    } else {
                        posting.balance_assignment = Some(amount);
                    }
                }
                TokenKind::LotPrice if posting.lot_price.is_none() => {
                    let token = self.next();
                    let inner = token.text[1..token.text.len() - 1].trim();
                    posting.lot_price = Some(AmountNode {
                        pos: token.pos,
                        quantity: inner.to_string(),
                        ..AmountNode::default()
                    });
                }
                TokenKind::LotDate if posting.lot_date.is_none() => {
                    let token = self.next();
                    posting.lot_date = Some(self.to_date(&token.text)?);
                }
                TokenKind::Note => {
                    let note = self.next();
                    posting.note = note.text.to_string();
                    return Ok(());
                }
                _ => return Ok(()),
            }
        }
    }

    /// Consumes a single space token if one is next.
    fn skip_one_space(&mut self) {
        if self.peek().kind == TokenKind::Space {
            self.next();
        }
    }

    /// The free-order amount sub-grammar over `{Neg, Commodity, Quantity}`
    /// with at most one of each, or a single value expression. Returns
    /// `None` when no amount is present at all. The raw text of the
    /// consumed tokens, interstitial spaces included, is kept so the
    /// printer can reproduce the exact spelling.
    fn parse_amount(&mut self) -> Result<Option<AmountNode>, ParseError> {
        let first = self.peek();
        match first.kind {
            TokenKind::Error => {
                let token = self.next();
                return Err(self.error(token.text.to_string()));
            }
            TokenKind::ValueExpr => {
                let token = self.next();
                return Ok(Some(AmountNode {
                    pos: token.pos,
                    raw: token.text.to_string(),
                    value_expr: token.text.to_string(),
                    ..AmountNode::default()
                }));
            }
            TokenKind::Neg | TokenKind::Commodity | TokenKind::Quantity => {}
            _ => return Ok(None),
        }

        let pos = first.pos;
        let mut raw = String::new();
        let mut amount = AmountNode {
            pos,
            ..AmountNode::default()
        };

        if self.peek().kind == TokenKind::Neg {
            let token = self.next();
            raw.push_str(&token.text);
            amount.negative = true;
            self.absorb_space(&mut raw);
        }

        let token = self.peek();
        match token.kind {
            TokenKind::Commodity => {
                let token = self.next();
                raw.push_str(&token.text);
                amount.commodity = token.text.to_string();
            }
            TokenKind::Quantity => {
                let token = self.next();
                raw.push_str(&token.text);
                amount.quantity = token.text.to_string();
            }
            _ => return Err(self.unexpected(&token, "amount")),
        }

        self.absorb_space(&mut raw);
        if self.peek().kind == TokenKind::Neg {
            let token = self.next();
            if amount.negative {
                return Err(self.unexpected(&token, "amount"));
            }
            raw.push_str(&token.text);
            amount.negative = true;
            self.absorb_space(&mut raw);
        }

        if matches!(
            self.peek().kind,
            TokenKind::Commodity | TokenKind::Quantity
        ) {
            let token = self.next();
            match token.kind {
                TokenKind::Commodity if amount.commodity.is_empty() => {
                    amount.commodity = token.text.to_string();
                }
                TokenKind::Quantity if amount.quantity.is_empty() => {
                    amount.quantity = token.text.to_string();
                }
                _ => return Err(self.unexpected(&token, "amount")),
            }
            raw.push_str(&token.text);
        }

        amount.raw = raw;
        Ok(Some(amount))
    }

    /// Consumes a space into `raw` only when the token after it still
    /// belongs to the amount; otherwise puts it back.
    fn absorb_space(&mut self, raw: &mut String) {
        if self.peek().kind != TokenKind::Space {
            return;
        }
        let space = self.next();
        if AMOUNT_COMPONENTS.contains(&self.peek().kind) {
            raw.push_str(&space.text);
        } else {
            self.backup2(space);
        }
    }

    /// Normalizes `/` and `.` separators to `-`, strips lot brackets and
    /// parses a `YYYY-MM-DD` date.
    fn to_date(&self, text: &str) -> Result<NaiveDate, ParseError> {
        let trimmed = text
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(text);
        let normalized = trimmed.replace(['/', '.'], "-");
        NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
            .map_err(|e| self.error(format!("cannot parse date {trimmed:?}: {e}")))
    }
}

/// Attaches an indented free-standing note line to the current posting,
/// or to the transaction itself when no posting exists yet in the block.
fn attach_note(x: &mut XactNode, indent: &str, note: &str) {
    let (target_note, target_pre_space) = match x.postings.last_mut() {
        Some(posting) => (&mut posting.note, &mut posting.note_pre_space),
        None => (&mut x.note, &mut x.note_pre_space),
    };
    if target_note.is_empty() {
        *target_note = note.to_string();
        *target_pre_space = format!("\n{indent}");
    } else {
        target_note.push('\n');
        target_note.push_str(note);
    }
}
