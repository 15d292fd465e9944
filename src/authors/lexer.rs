//! Tokenizer for author-name strings.
//!
//! Brace groups come out as single tokens carrying the whole `{...}` slice,
//! split into two kinds: a *special character* when the first inner
//! character is a backslash (`{\'E}`), and a plain *brace group* otherwise
//! (`{E}`). Brace matching is exact; an unmatched `{` is fatal.
use memchr::memchr2_iter;

use crate::error::{Error, ErrorCode, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Comma,
    Space,
    Letter,
    BracedItem,
    SpecialChar,
    Eos,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Token<'r> {
    pub kind: TokenKind,
    pub text: &'r str,
    pub offset: usize,
}

pub(crate) struct Lexer<'r> {
    input: &'r str,
    pos: usize,
    lookahead: Option<Token<'r>>,
}

impl<'r> Lexer<'r> {
    pub fn new(input: &'r str) -> Self {
        Self {
            input,
            pos: 0,
            lookahead: None,
        }
    }

    fn read_token(&mut self) -> Result<Token<'r>> {
        let offset = self.pos;
        let Some(c) = self.input[self.pos..].chars().next() else {
            return Ok(Token {
                kind: TokenKind::Eos,
                text: "",
                offset,
            });
        };

        let (kind, len) = match c {
            ',' => (TokenKind::Comma, 1),
            c if c.is_ascii_whitespace() => (TokenKind::Space, 1),
            '{' => return self.read_group(),
            c => (TokenKind::Letter, c.len_utf8()),
        };
        self.pos += len;
        Ok(Token {
            kind,
            text: &self.input[offset..offset + len],
            offset,
        })
    }

    /// Read a `{...}` group, braces included.
    fn read_group(&mut self) -> Result<Token<'r>> {
        let offset = self.pos;
        let bytes = &self.input.as_bytes()[offset..];
        let mut depth = 0usize;
        for idx in memchr2_iter(b'{', b'}', bytes) {
            if bytes[idx] == b'{' {
                depth += 1;
            } else {
                depth -= 1;
                if depth == 0 {
                    let text = &self.input[offset..offset + idx + 1];
                    self.pos += idx + 1;
                    let kind = if text.as_bytes().get(1) == Some(&b'\\') {
                        TokenKind::SpecialChar
                    } else {
                        TokenKind::BracedItem
                    };
                    return Ok(Token { kind, text, offset });
                }
            }
        }
        Err(Error::syntax(ErrorCode::UnclosedBrace, offset))
    }

    pub fn peek(&mut self) -> Result<Token<'r>> {
        match self.lookahead {
            Some(t) => Ok(t),
            None => {
                let t = self.read_token()?;
                self.lookahead = Some(t);
                Ok(t)
            }
        }
    }

    pub fn bump(&mut self) -> Result<Token<'r>> {
        match self.lookahead.take() {
            Some(t) => Ok(t),
            None => self.read_token(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut lex = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let t = lex.bump().unwrap();
            if t.kind == TokenKind::Eos {
                return out;
            }
            out.push(t.kind);
        }
    }

    #[test]
    fn test_plain_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds("de X,\tY"),
            vec![Letter, Letter, Space, Letter, Comma, Space, Letter]
        );
    }

    #[test]
    fn test_groups() {
        let mut lex = Lexer::new("{\\'E}a {bb}");
        let t = lex.bump().unwrap();
        assert_eq!(t.kind, TokenKind::SpecialChar);
        assert_eq!(t.text, "{\\'E}");

        assert_eq!(lex.bump().unwrap().kind, TokenKind::Letter);
        assert_eq!(lex.bump().unwrap().kind, TokenKind::Space);

        let t = lex.bump().unwrap();
        assert_eq!(t.kind, TokenKind::BracedItem);
        assert_eq!(t.text, "{bb}");
    }

    #[test]
    fn test_nested_group_is_one_token() {
        let mut lex = Lexer::new("{{\\'E}}");
        let t = lex.bump().unwrap();
        // two pairs of braces: a plain group, not a special character
        assert_eq!(t.kind, TokenKind::BracedItem);
        assert_eq!(t.text, "{{\\'E}}");
        assert_eq!(lex.bump().unwrap().kind, TokenKind::Eos);
    }

    #[test]
    fn test_unmatched_brace() {
        let mut lex = Lexer::new("a {open");
        assert!(lex.bump().is_ok());
        assert!(lex.bump().is_ok());
        let err = lex.bump().unwrap_err();
        assert_eq!(err.code(), &ErrorCode::UnclosedBrace);
        assert_eq!(err.position(), 2);
    }

    use proptest::prelude::*;
    proptest! {
        #[test]
        fn no_panic(s in "\\PC*") {
            let mut lex = Lexer::new(&s);
            for _ in 0..=s.len() {
                match lex.bump() {
                    Ok(t) if t.kind == TokenKind::Eos => break,
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
        }
    }
}
