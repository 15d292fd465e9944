//! Character lexer for the LaTeX transducer.
//!
//! Unlike the BibTeX lexer, this one cares whether a character is
//! alphabetic: macro names are maximal alphabetic runs, and the mandatory
//! space after an alphabetic macro name is a token of its own.
use memchr::{memchr, memchr2_iter};

use crate::error::{Error, ErrorCode, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    LBrace,
    RBrace,
    Space,
    Alpha,
    Other,
    Backslash,
    Eos,
}

impl TokenKind {
    fn of(c: char) -> Self {
        match c {
            '{' => Self::LBrace,
            '}' => Self::RBrace,
            ' ' => Self::Space,
            '\\' => Self::Backslash,
            c if c.is_alphabetic() => Self::Alpha,
            _ => Self::Other,
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

impl<'r> Lexer<'r> {
    pub fn new(input: &'r str) -> Self {
        Self {
            input,
            pos: 0,
            lookahead: None,
        }
    }

    pub fn input_len(&self) -> usize {
        self.input.len()
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

    /// Consume plain text up to the next backslash or end of input.
    pub fn take_plain(&mut self) -> &'r str {
        self.rewind();
        let start = self.pos;
        match memchr(b'\\', &self.input.as_bytes()[start..]) {
            Some(idx) => self.pos = start + idx,
            None => self.pos = self.input.len(),
        }
        &self.input[start..self.pos]
    }

    /// Consume a maximal run of alphabetic characters.
    pub fn alpha_run(&mut self) -> &'r str {
        self.rewind();
        let start = self.pos;
        for c in self.input[start..].chars() {
            if TokenKind::of(c) != TokenKind::Alpha {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    /// Scan exactly-balanced brace content; the opening brace must already
    /// be consumed, and the matching closer is consumed and excluded.
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
}
