
use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;

/// The type of a lexed token.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A lexing error occurred; the token text is the error message.
    Error,
    Eof,
    String,
    /// A `;`-prefixed comment inside a transaction or posting line.
    Note,
    /// A full-line comment starting at column 0 with one of `;#%|*`.
    Comment,
    Date,
    /// A `[YYYY-MM-DD]` lot date, brackets included.
    LotDate,
    /// A `{ ... }` lot price, braces included.
    LotPrice,
    Space,
    Eol,
    At,
    DoubleAt,
    Equal,
    Asterisk,
    Exclamation,
    Semicolon,
    Commodity,
    Identifier,
    LeftParen,
    RightParen,
    Neg,
    Quantity,
    /// A `(`-balanced value expression, parentheses included.
    ValueExpr,
    Tilde,
    Dot,
    AccountName,

    // Keywords recognized at the top level.
    Include,
    AccountKw,
    End,
    Alias,
    Price,
}

/// A token returned from the scanner.
///
/// `text` borrows the exact input substring, except for `Error` tokens
/// where it owns the error message.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Byte offset of the token start in the input.
    pub pos: usize,
    pub text: Cow<'a, str>,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "EOF"),
            TokenKind::Error => write!(f, "{}", self.text),
            TokenKind::Include
            | TokenKind::AccountKw
            | TokenKind::End
            | TokenKind::Alias
            | TokenKind::Price => write!(f, "<{}>", self.text),
            _ if self.text.chars().count() > 10 => {
                let prefix: String = self.text.chars().take(10).collect();
                write!(f, "{prefix:?}...")
            }
            _ => write!(f, "{:?}", self.text),
        }
    }
}

/// Scanner mode. Each mode covers one region of the line-oriented grammar;
/// `step` dispatches on the current mode and the next character.
#[derive(Debug, Copy, Clone, PartialEq)]
enum Mode {
    /// Top level constructs: directives, comments, transaction heads.
    Journal,
    /// The rest of a transaction's first line, after the date.
    XactHead,
    /// Start of a line inside a postings block.
    PostingLineStart,
    /// A posting line after its indent: status, account name, notes.
    PostingBody,
    /// Amounts, prices, lots and notes after an account name.
    PostingValues,
    /// The rest of a `~` line: period expression and optional note.
    PeriodicHead,
    /// The rest of a `=` line: value expression and optional note.
    AutomatedHead,
}

/// A pull-driven tokenizer for the ledger grammar.
///
/// The original channel-and-goroutine pairing becomes a stateful iterator:
/// `next_token` is a pure step function over `(input, pos, mode)`. On a
/// fatal lexical error exactly one `Error` token is produced, then `Eof`
/// forever.
pub struct Lexer<'a> {
    input: &'a str,
    /// Current scan position, in bytes.
    pos: usize,
    /// Start position of the pending token.
    start: usize,
    mode: Mode,
    pending: VecDeque<Token<'a>>,
    done: bool,
}

const COMMENT_CHARS: [char; 5] = [';', '#', '%', '|', '*'];

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            start: 0,
            mode: Mode::Journal,
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// Returns the next token. Called by the parser on demand.
    pub fn next_token(&mut self) -> Token<'a> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return token;
            }
            if self.done {
                return Token {
                    kind: TokenKind::Eof,
                    pos: self.pos,
                    text: Cow::Borrowed(""),
                };
            }
            self.step();
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Peeks the character after the next one.
    fn peek_char2(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn emit(&mut self, kind: TokenKind) {
        self.pending.push_back(Token {
            kind,
            pos: self.start,
            text: Cow::Borrowed(&self.input[self.start..self.pos]),
        });
        self.start = self.pos;
    }

    fn errorf(&mut self, message: String) {
        self.pending.push_back(Token {
            kind: TokenKind::Error,
            pos: self.start,
            text: Cow::Owned(message),
        });
        self.done = true;
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || matches!(self.input.as_bytes()[self.pos - 1], b'\n' | b'\r')
    }

    fn step(&mut self) {
        match self.mode {
            Mode::Journal => self.step_journal(),
            Mode::XactHead => self.step_xact_head(),
            Mode::PostingLineStart => self.step_posting_line_start(),
            Mode::PostingBody => self.step_posting_body(),
            Mode::PostingValues => self.step_posting_values(),
            Mode::PeriodicHead => self.step_raw_xact_head(),
            Mode::AutomatedHead => self.step_raw_xact_head(),
        }
    }

    fn step_journal(&mut self) {
        let at_line_start = self.at_line_start();
        match self.peek_char() {
            None => {
                self.emit(TokenKind::Eof);
                self.done = true;
            }
            Some(' ') | Some('\t') => {
                self.scan_spaces();
            }
            Some('~') => {
                self.bump();
                self.emit(TokenKind::Tilde);
                self.mode = Mode::PeriodicHead;
            }
            Some('=') if at_line_start => {
                self.bump();
                self.emit(TokenKind::Equal);
                self.mode = Mode::AutomatedHead;
            }
            Some(c) if at_line_start && COMMENT_CHARS.contains(&c) => {
                self.scan_to_eol();
                self.emit(TokenKind::Comment);
            }
            Some(c) if c.is_ascii_digit() => {
                self.scan_xact_date();
            }
            Some(c) if c.is_alphabetic() => {
                self.scan_identifier();
            }
            Some('\n') | Some('\r') => {
                self.scan_eol();
            }
            Some(c) => {
                self.errorf(format!(
                    "unrecognized character in directive: {}",
                    format_char(c)
                ));
            }
        }
    }

    /// Scans the date opening a plain transaction, then its head.
    fn scan_xact_date(&mut self) {
        if !self.scan_date() {
            return;
        }
        match self.peek_char() {
            Some(' ') | Some('\t') => {
                self.emit(TokenKind::Date);
                self.scan_spaces();
                self.mode = Mode::XactHead;
            }
            Some('\n') | Some('\r') => {
                self.errorf(
                    "unexpected end-of-line, expected transaction Payee or Description"
                        .to_string(),
                );
            }
            None => {
                self.errorf(
                    "unexpected end-of-file, expected transaction Payee or Description"
                        .to_string(),
                );
            }
            Some(c) => {
                self.errorf(format!(
                    "invalid character in transaction date specification: {c:?}"
                ));
            }
        }
    }

    /// Scans a strict `YYYY-MM-DD` date with `/`, `-` or `.` separators.
    /// Emits nothing on success; the caller decides the token kind.
    fn scan_date(&mut self) -> bool {
        for (part, count) in [4usize, 2, 2].into_iter().enumerate() {
            for _ in 0..count {
                match self.peek_char() {
                    Some(c) if c.is_ascii_digit() => {
                        self.bump();
                    }
                    other => return self.date_error(other),
                }
            }
            // No separator follows the day part.
            if part == 2 {
                break;
            }
            match self.peek_char() {
                Some('/') | Some('-') | Some('.') => {
                    self.bump();
                }
                other => return self.date_error(other),
            }
        }
        true
    }

    fn pending_len(&self) -> usize {
        self.pos - self.start
    }

    fn date_error(&mut self, c: Option<char>) -> bool {
        let received = match c {
            Some(c) => format!("character {}", format_char(c)),
            None => "end-of-file".to_string(),
        };
        self.errorf(format!(
            "date format error, expects YYYY-MM-DD with '/', '-' or '.' as separators, received {received}"
        ));
        false
    }

    fn step_xact_head(&mut self) {
        match self.peek_char() {
            None => {
                self.emit(TokenKind::Eof);
                self.done = true;
            }
            Some(' ') | Some('\t') => {
                self.scan_spaces();
            }
            Some('=') => {
                self.bump();
                self.emit(TokenKind::Equal);
            }
            Some(c) if c.is_ascii_digit() => {
                if self.scan_date() {
                    match self.peek_char() {
                        Some(' ') | Some('\t') => self.emit(TokenKind::Date),
                        Some('\n') | Some('\r') => {
                            self.errorf(
                                "unexpected end-of-line, expected transaction Payee or Description"
                                    .to_string(),
                            );
                        }
                        None => {
                            self.errorf(
                                "unexpected end-of-file, expected transaction Payee or Description"
                                    .to_string(),
                            );
                        }
                        Some(c) => {
                            self.errorf(format!(
                                "invalid character in transaction date specification: {c:?}"
                            ));
                        }
                    }
                }
            }
            Some('*') => {
                self.bump();
                self.emit(TokenKind::Asterisk);
            }
            Some('!') => {
                self.bump();
                self.emit(TokenKind::Exclamation);
            }
            Some('(') => {
                self.scan_code();
            }
            Some(';') => {
                self.scan_to_eol();
                self.emit(TokenKind::Note);
            }
            Some('\n') | Some('\r') => {
                self.scan_eol();
                self.mode = Mode::PostingLineStart;
            }
            Some(_) => {
                // Description: everything up to a note or end of line,
                // trailing spaces included.
                self.scan_until(&[b';', b'\n', b'\r']);
                self.emit(TokenKind::String);
            }
        }
    }

    /// Scans a parenthesized transaction code: `(`, inner string, `)`.
    fn scan_code(&mut self) {
        self.bump();
        self.emit(TokenKind::LeftParen);
        loop {
            match self.peek_char() {
                Some(')') => break,
                Some('\n') | Some('\r') => {
                    self.errorf("unexpected end-of-line in transaction code".to_string());
                    return;
                }
                None => {
                    self.errorf("unexpected end-of-file in transaction code".to_string());
                    return;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        self.emit(TokenKind::String);
        self.bump();
        self.emit(TokenKind::RightParen);
    }

    fn step_posting_line_start(&mut self) {
        match self.peek_char() {
            Some(' ') | Some('\t') => {
                self.scan_spaces();
                self.mode = Mode::PostingBody;
            }
            // A logical line beginning without leading whitespace ends the
            // postings block.
            _ => {
                self.mode = Mode::Journal;
            }
        }
    }

    fn step_posting_body(&mut self) {
        match self.peek_char() {
            None => {
                self.mode = Mode::Journal;
            }
            Some(' ') | Some('\t') => {
                self.scan_spaces();
            }
            Some(';') => {
                self.scan_to_eol();
                self.emit(TokenKind::Note);
            }
            Some('*') => {
                self.bump();
                self.emit(TokenKind::Asterisk);
            }
            Some('!') => {
                self.bump();
                self.emit(TokenKind::Exclamation);
            }
            Some('\n') | Some('\r') => {
                self.scan_eol();
                self.mode = Mode::PostingLineStart;
            }
            Some(c) if c.is_alphabetic() => {
                self.scan_account_name();
                self.mode = Mode::PostingValues;
            }
            Some(c) => {
                self.errorf(format!(
                    "unrecognized character in posting: {}",
                    format_char(c)
                ));
            }
        }
    }

    /// Scans an account name. Embedded single spaces are part of the name;
    /// a run of two or more spaces, a tab, or the end of the line stops it.
    fn scan_account_name(&mut self) {
        loop {
            match self.peek_char() {
                None | Some('\n') | Some('\r') | Some('\t') => break,
                Some(' ') => match self.peek_char2() {
                    Some(' ') | Some('\t') | Some('\n') | Some('\r') | None => break,
                    Some(_) => {
                        self.bump();
                    }
                },
                Some(_) => {
                    self.bump();
                }
            }
        }
        self.emit(TokenKind::AccountName);
    }

    fn step_posting_values(&mut self) {
        match self.peek_char() {
            None => {
                self.mode = Mode::Journal;
            }
            Some(' ') | Some('\t') => {
                self.scan_spaces();
            }
            Some('\n') | Some('\r') => {
                self.scan_eol();
                self.mode = Mode::PostingLineStart;
            }
            Some('-') => {
                self.bump();
                self.emit(TokenKind::Neg);
            }
            Some(c) if c.is_ascii_digit() || c == '.' => {
                self.scan_quantity();
            }
            Some('@') => {
                self.bump();
                if self.peek_char() == Some('@') {
                    self.bump();
                    self.emit(TokenKind::DoubleAt);
                } else {
                    self.emit(TokenKind::At);
                }
            }
            Some('=') => {
                self.bump();
                self.emit(TokenKind::Equal);
            }
            Some('(') => {
                self.scan_value_expr();
            }
            Some('[') => {
                self.scan_lot_date();
            }
            Some('{') => {
                self.scan_lot_price();
            }
            Some(';') => {
                self.scan_to_eol();
                self.emit(TokenKind::Note);
            }
            Some(_) => {
                self.scan_commodity();
            }
        }
    }

    /// Scans a decimal quantity: digits with `,` and `.`, no exponent.
    fn scan_quantity(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() || c == '.' || c == ',' {
                self.bump();
            } else {
                break;
            }
        }
        self.emit(TokenKind::Quantity);
    }

    /// Scans a `(`-balanced value expression, nested parentheses included.
    fn scan_value_expr(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.peek_char() {
                Some('(') => {
                    depth += 1;
                    self.bump();
                }
                Some(')') => {
                    depth -= 1;
                    self.bump();
                    if depth == 0 {
                        break;
                    }
                }
                Some('\n') | Some('\r') | None => {
                    self.errorf("unterminated value expression".to_string());
                    return;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        self.emit(TokenKind::ValueExpr);
    }

    fn scan_lot_date(&mut self) {
        self.bump();
        if !self.scan_date() {
            return;
        }
        if self.peek_char() == Some(']') {
            self.bump();
            self.emit(TokenKind::LotDate);
        } else {
            self.errorf("expected ']' to close lot date".to_string());
        }
    }

    fn scan_lot_price(&mut self) {
        self.bump();
        loop {
            match self.peek_char() {
                Some('}') => {
                    self.bump();
                    self.emit(TokenKind::LotPrice);
                    return;
                }
                Some('\n') | Some('\r') | None => {
                    self.errorf("unterminated lot price".to_string());
                    return;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Scans a commodity: either a quoted string with backslash escapes or
    /// a contiguous run of graphic characters. A digit, space, `-`, `.` or
    /// `;` terminates the unquoted form.
    fn scan_commodity(&mut self) {
        if self.peek_char() == Some('"') {
            self.bump();
            loop {
                match self.peek_char() {
                    Some('"') => {
                        self.bump();
                        break;
                    }
                    Some('\\') => {
                        self.bump();
                        match self.peek_char() {
                            Some('\n') | Some('\r') | None => {
                                self.errorf("bad escape in quoted commodity".to_string());
                                return;
                            }
                            Some(_) => {
                                self.bump();
                            }
                        }
                    }
                    Some('\n') | Some('\r') | None => {
                        self.errorf("unterminated quoted commodity".to_string());
                        return;
                    }
                    Some(_) => {
                        self.bump();
                    }
                }
            }
            self.emit(TokenKind::Commodity);
            return;
        }
        while let Some(c) = self.peek_char() {
            if c.is_whitespace()
                || c.is_ascii_digit()
                || c == '-'
                || c == '.'
                || c == ';'
            {
                break;
            }
            self.bump();
        }
        self.emit(TokenKind::Commodity);
    }

    /// Scans the remainder of a `~` or `=` head line: spaces, a raw
    /// expression up to any note, the note itself.
    fn step_raw_xact_head(&mut self) {
        self.scan_spaces();
        self.scan_until(&[b';', b'\n', b'\r']);
        if self.pending_len() > 0 {
            self.emit(TokenKind::String);
        }
        match self.peek_char() {
            Some(';') => {
                self.scan_to_eol();
                self.emit(TokenKind::Note);
            }
            Some('\n') | Some('\r') => {
                self.scan_eol();
                self.mode = Mode::PostingLineStart;
            }
            None => {
                self.emit(TokenKind::Eof);
                self.done = true;
            }
            Some(_) => unreachable!("scan_until stops at ';' or end of line"),
        }
    }

    /// Scans an alphanumeric word at the top level and classifies it as a
    /// keyword or a plain identifier.
    fn scan_identifier(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        if !self.at_terminator() {
            let c = self.peek_char().unwrap();
            self.errorf(format!("bad character {}", format_char(c)));
            return;
        }
        let word = &self.input[self.start..self.pos];
        match word {
            "include" => {
                self.emit(TokenKind::Include);
                self.scan_spaces();
                if !self.scan_string_to_eol() {
                    self.errorf("missing filename after 'include'".to_string());
                }
            }
            "account" | "end" | "alias" | "P" => {
                self.emit(match word {
                    "account" => TokenKind::AccountKw,
                    "end" => TokenKind::End,
                    "alias" => TokenKind::Alias,
                    _ => TokenKind::Price,
                });
                self.scan_spaces();
                self.scan_string_to_eol();
            }
            _ => self.emit(TokenKind::Identifier),
        }
    }

    fn at_terminator(&self) -> bool {
        matches!(
            self.peek_char(),
            None | Some(' ') | Some('\t') | Some('\n') | Some('\r')
        )
    }

    /// Emits a `Space` token for the run of spaces and tabs at the current
    /// position, if any.
    fn scan_spaces(&mut self) -> bool {
        while matches!(self.peek_char(), Some(' ') | Some('\t')) {
            self.bump();
        }
        if self.pending_len() == 0 {
            return false;
        }
        self.emit(TokenKind::Space);
        true
    }

    /// Emits a `String` token for everything up to the end of the line, if
    /// anything remains on it.
    fn scan_string_to_eol(&mut self) -> bool {
        self.scan_until(&[b'\n', b'\r']);
        if self.pending_len() == 0 {
            return false;
        }
        self.emit(TokenKind::String);
        true
    }

    fn scan_eol(&mut self) {
        if self.peek_char() == Some('\r') {
            self.bump();
        }
        if self.peek_char() == Some('\n') {
            self.bump();
        }
        self.emit(TokenKind::Eol);
    }

    /// Advances to the end of the line without consuming the terminator.
    fn scan_to_eol(&mut self) {
        self.scan_until(&[b'\n', b'\r']);
    }

    /// Advances until one of the given ASCII bytes or the end of input.
    fn scan_until(&mut self, stops: &[u8]) {
        let bytes = &self.input.as_bytes()[self.pos..];
        let found = match *stops {
            [a, b] => memchr::memchr2(a, b, bytes),
            [a, b, c] => memchr::memchr3(a, b, c, bytes),
            _ => bytes.iter().position(|byte| stops.contains(byte)),
        };
        self.pos += found.unwrap_or(bytes.len());
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.done && self.pending.is_empty() {
            return None;
        }
        Some(self.next_token())
    }
}

/// Formats a character the way errors report it, e.g. `U+0065 'e'`.
fn format_char(c: char) -> String {
    format!("U+{:04X} {c:?}", c as u32)
}
