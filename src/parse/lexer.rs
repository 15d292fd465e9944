//! Character lexer for the BibTeX reader.
//!
//! The lexer is a small struct holding the input, a byte offset, and at most
//! one buffered token. Structural characters come out as single tokens;
//! longer runs (identifiers, cite keys, digit strings, value interiors) are
//! consumed by the raw scanners below, which operate on the underlying bytes
//! directly so they can lean on `memchr`.
use memchr::{memchr, memchr2_iter, memchr3_iter};

use crate::error::{Error, ErrorCode, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    LBrace,
    RBrace,
    LParen,
    RParen,
    Quote,
    Comma,
    Equals,
    Pound,
    At,
    Whitespace,
    Char,
    Eos,
}

impl TokenKind {
    fn of(c: char) -> Self {
        match c {
            '{' => Self::LBrace,
            '}' => Self::RBrace,
            '(' => Self::LParen,
            ')' => Self::RParen,
            '"' => Self::Quote,
            ',' => Self::Comma,
            '=' => Self::Equals,
            '#' => Self::Pound,
            '@' => Self::At,
            ' ' | '\t' | '\n' | '\r' => Self::Whitespace,
            _ => Self::Char,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub ch: Option<char>,
    pub offset: usize,
}

pub(crate) struct Lexer<'r> {
    input: &'r str,
    pos: usize,
    lookahead: Option<Token>,
}

#[inline]
fn is_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b':')
}

impl<'r> Lexer<'r> {
    pub fn new(input: &'r str) -> Self {
        Self {
            input,
            pos: 0,
            lookahead: None,
        }
    }

    fn read_token(&mut self) -> Token {
        let offset = self.pos;
        match self.input[self.pos..].chars().next() {
            Some(c) => {
                self.pos += c.len_utf8();
                Token {
                    kind: TokenKind::of(c),
                    ch: Some(c),
                    offset,
                }
            }
            None => Token {
                kind: TokenKind::Eos,
                ch: None,
                offset,
            },
        }
    }

    pub fn peek(&mut self) -> Token {
        match self.lookahead {
            Some(t) => t,
            None => {
                let t = self.read_token();
                self.lookahead = Some(t);
                t
            }
        }
    }

    pub fn bump(&mut self) -> Token {
        match self.lookahead.take() {
            Some(t) => t,
            None => self.read_token(),
        }
    }

    /// Push the buffered token back into the input so the raw scanners see
    /// it again.
    fn rewind(&mut self) {
        if let Some(t) = self.lookahead.take() {
            self.pos = t.offset;
        }
    }

    pub fn eat(&mut self, kind: TokenKind, expected: &'static str) -> Result<()> {
        let t = self.peek();
        if t.kind == kind {
            self.bump();
            Ok(())
        } else {
            Err(Error::syntax(
                ErrorCode::ExpectedToken {
                    expected,
                    found: t.ch,
                },
                t.offset,
            ))
        }
    }

    pub fn skip_whitespace(&mut self) {
        self.rewind();
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && matches!(bytes[self.pos], b' ' | b'\t' | b'\n' | b'\r') {
            self.pos += 1;
        }
    }

    /// Consume everything up to and including the next `@`; anything skipped
    /// is between-entry junk. Returns false when the input ran out first.
    pub fn next_entry_or_eof(&mut self) -> bool {
        self.rewind();
        match memchr(b'@', &self.input.as_bytes()[self.pos..]) {
            Some(idx) => {
                self.pos += idx + 1;
                true
            }
            None => {
                self.pos = self.input.len();
                false
            }
        }
    }

    /// Consume the rest of the line, newline included if present.
    pub fn skip_line(&mut self) {
        self.rewind();
        match memchr(b'\n', &self.input.as_bytes()[self.pos..]) {
            Some(idx) => self.pos += idx + 1,
            None => self.pos = self.input.len(),
        }
    }

    fn expected_here(&self, expected: &'static str) -> Error {
        Error::syntax(
            ErrorCode::ExpectedToken {
                expected,
                found: self.input[self.pos..].chars().next(),
            },
            self.pos,
        )
    }

    /// Read an identifier `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn identifier(&mut self) -> Result<&'r str> {
        self.rewind();
        let bytes = self.input.as_bytes();
        let start = self.pos;
        match bytes.get(start) {
            Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
            _ => return Err(self.expected_here("identifier")),
        }
        let mut end = start + 1;
        while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
            end += 1;
        }
        self.pos = end;
        Ok(&self.input[start..end])
    }

    /// Read a cite key or field key `[A-Za-z0-9_\-:]+`.
    pub fn key(&mut self) -> Result<&'r str> {
        self.rewind();
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut end = start;
        while end < bytes.len() && is_key_byte(bytes[end]) {
            end += 1;
        }
        if end == start {
            return Err(self.expected_here("key"));
        }
        self.pos = end;
        Ok(&self.input[start..end])
    }

    /// Read an integer literal `[0-9]+`.
    pub fn digits(&mut self) -> Result<&'r str> {
        self.rewind();
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end == start {
            return Err(self.expected_here("integer"));
        }
        self.pos = end;
        Ok(&self.input[start..end])
    }

    /// Scan the interior of a `{...}` piece. The opening brace must already
    /// be consumed; the matching closing brace is consumed and excluded.
    ///
    /// A backslash is an ordinary character here; escape interpretation
    /// belongs to the LaTeX layer.
    pub fn balanced(&mut self) -> Result<&'r str> {
        self.rewind();
        let start = self.pos;
        let bytes = &self.input.as_bytes()[start..];
        let mut depth = 0usize;
        for idx in memchr2_iter(b'{', b'}', bytes) {
            if bytes[idx] == b'{' {
                depth += 1;
            } else if depth == 0 {
                self.pos = start + idx + 1;
                return Ok(&self.input[start..start + idx]);
            } else {
                depth -= 1;
            }
        }
        Err(Error::syntax(ErrorCode::UnclosedBrace, self.input.len()))
    }

    /// Scan the interior of a `"..."` piece. The opening quote must already
    /// be consumed; a quote only terminates when no brace is open, so a `"`
    /// can be embedded inside a brace group.
    pub fn protected(&mut self) -> Result<&'r str> {
        self.rewind();
        let start = self.pos;
        let bytes = &self.input.as_bytes()[start..];
        let mut depth = 0usize;
        for idx in memchr3_iter(b'"', b'{', b'}', bytes) {
            match bytes[idx] {
                b'"' if depth == 0 => {
                    self.pos = start + idx + 1;
                    return Ok(&self.input[start..start + idx]);
                }
                b'{' => depth += 1,
                b'}' => {
                    if depth == 0 {
                        return Err(Error::syntax(
                            ErrorCode::UnexpectedClosingBrace,
                            start + idx,
                        ));
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        Err(Error::syntax(ErrorCode::UnclosedQuote, self.input.len()))
    }
}
