//! The BibTeX database reader.
//!
//! A database is a stream of `@`-entries separated by arbitrary junk:
//!
//! ```bib
//! database   := junk (entry junk)*
//! entry      := "@" identifier ws? ( "{" body "}" | "(" body ")" )
//! body       := string_def | preamble | item_body          -- by entry type
//! string_def := identifier ws? "=" ws? value
//! item_body  := cite_key ws? "," ws? (field ("," field)*)? ","?
//! field      := key ws? "=" ws? value
//! value      := piece (ws? "#" ws? piece)*
//! piece      := integer | identifier | "{" balanced "}" | "\"" protected "\""
//! ```
//!
//! `@comment` swallows the rest of its line without looking at brackets.
//! A bare identifier piece is resolved against the [`StringTable`] right
//! away, so stored field values are final text.
mod lexer;

use std::collections::HashMap;

use unicase::UniCase;

use crate::bibliography::{Database, Item};
use crate::error::{Error, ErrorCode, Result};
use lexer::{Lexer, TokenKind};

/// Resolved `@string` definitions, owned by the [`Parser`] that filled it.
///
/// Values are fully resolved at definition time, so a definition may refer
/// to earlier definitions but never to later ones.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StringTable {
    map: HashMap<String, String>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a placeholder to its resolved text, replacing any earlier
    /// binding.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.map.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// What an entry's identifier makes it. `@string`, `@comment` and
/// `@preamble` are matched case-insensitively.
#[derive(Debug, PartialEq)]
enum EntryKind<'r> {
    Comment,
    Macro,
    Preamble,
    Regular(&'r str),
}

impl<'r> EntryKind<'r> {
    fn classify(ident: &'r str) -> Self {
        let uni = UniCase::ascii(ident);
        if uni == UniCase::ascii("comment") {
            Self::Comment
        } else if uni == UniCase::ascii("string") {
            Self::Macro
        } else if uni == UniCase::ascii("preamble") {
            Self::Preamble
        } else {
            Self::Regular(ident)
        }
    }
}

/// A single-use BibTeX reader.
///
/// The parser holds the string-variable table it builds up while reading;
/// after [`parse`](Parser::parse) returns, ask for it with
/// [`string_table`](Parser::string_table) or take it with
/// [`into_string_table`](Parser::into_string_table).
pub struct Parser<'r> {
    lexer: Lexer<'r>,
    strings: StringTable,
    preambles: Vec<String>,
}

impl<'r> Parser<'r> {
    pub fn new(input: &'r str) -> Self {
        Self {
            lexer: Lexer::new(input),
            strings: StringTable::new(),
            preambles: Vec::new(),
        }
    }

    /// Read the whole input into a [`Database`].
    ///
    /// Errors are fatal: no partial database is returned, and the parser
    /// should not be reused afterwards.
    pub fn parse(&mut self) -> Result<Database> {
        let mut db = Database::new();
        while self.lexer.next_entry_or_eof() {
            self.entry(&mut db)?;
        }
        log::debug!(
            "parsed {} entries and {} string variables",
            db.len(),
            self.strings.len()
        );
        Ok(db)
    }

    /// The `@string` definitions seen so far.
    pub fn string_table(&self) -> &StringTable {
        &self.strings
    }

    pub fn into_string_table(self) -> StringTable {
        self.strings
    }

    /// Resolved `@preamble` texts, in source order.
    pub fn preambles(&self) -> &[String] {
        &self.preambles
    }

    /// Parse one entry; the `@` is already consumed.
    fn entry(&mut self, db: &mut Database) -> Result<()> {
        let ident = self.lexer.identifier()?;
        let kind = EntryKind::classify(ident);

        if kind == EntryKind::Comment {
            self.lexer.skip_line();
            return Ok(());
        }

        self.lexer.skip_whitespace();
        let closing = self.opening()?;
        self.lexer.skip_whitespace();

        match kind {
            EntryKind::Macro => self.string_def()?,
            EntryKind::Preamble => {
                let text = self.value()?;
                self.preambles.push(text);
            }
            EntryKind::Regular(item_type) => {
                let item = self.item(item_type)?;
                db.insert(item);
            }
            EntryKind::Comment => {}
        }

        self.lexer.skip_whitespace();
        self.close(closing)
    }

    /// Parse the opening bracket, returning the matching closer.
    fn opening(&mut self) -> Result<TokenKind> {
        let t = self.lexer.peek();
        match t.kind {
            TokenKind::LBrace => {
                self.lexer.bump();
                Ok(TokenKind::RBrace)
            }
            TokenKind::LParen => {
                self.lexer.bump();
                Ok(TokenKind::RParen)
            }
            _ => Err(Error::syntax(
                ErrorCode::ExpectedToken {
                    expected: "'{' or '('",
                    found: t.ch,
                },
                t.offset,
            )),
        }
    }

    fn close(&mut self, closing: TokenKind) -> Result<()> {
        let expected = if closing == TokenKind::RBrace {
            "'}'"
        } else {
            "')'"
        };
        self.lexer.eat(closing, expected)
    }

    /// `@string` body: `identifier = value`.
    fn string_def(&mut self) -> Result<()> {
        let name = self.lexer.identifier()?;
        self.lexer.skip_whitespace();
        self.lexer.eat(TokenKind::Equals, "'='")?;
        self.lexer.skip_whitespace();
        let value = self.value()?;
        self.strings.define(name, value);
        Ok(())
    }

    /// Regular entry body: cite key, then comma-separated fields.
    fn item(&mut self, item_type: &str) -> Result<Item> {
        let cite_key = self.lexer.key()?;
        self.lexer.skip_whitespace();
        self.lexer.eat(TokenKind::Comma, "','")?;
        self.lexer.skip_whitespace();

        let mut item = Item::new(cite_key, item_type);
        loop {
            match self.lexer.peek().kind {
                // stray separator, as in `a = 1, , b = 2` or a trailing comma
                TokenKind::Comma => {
                    self.lexer.bump();
                    self.lexer.skip_whitespace();
                    continue;
                }
                TokenKind::RBrace | TokenKind::RParen => break,
                _ => {}
            }

            let (name, value) = self.field().map_err(|e| e.in_entry(cite_key))?;
            item.set(name, value);

            self.lexer.skip_whitespace();
            if self.lexer.peek().kind == TokenKind::Comma {
                self.lexer.bump();
                self.lexer.skip_whitespace();
            } else {
                break;
            }
        }
        Ok(item)
    }

    /// `key = value`.
    fn field(&mut self) -> Result<(&'r str, String)> {
        let name = self.lexer.key()?;
        self.lexer.skip_whitespace();
        self.lexer.eat(TokenKind::Equals, "'='")?;
        self.lexer.skip_whitespace();
        Ok((name, self.value()?))
    }

    /// One or more pieces joined by `#`, concatenated with no separator.
    fn value(&mut self) -> Result<String> {
        let mut value = self.piece()?;
        self.lexer.skip_whitespace();
        while self.lexer.peek().kind == TokenKind::Pound {
            self.lexer.bump();
            self.lexer.skip_whitespace();
            value.push_str(&self.piece()?);
            self.lexer.skip_whitespace();
        }
        Ok(value)
    }

    fn piece(&mut self) -> Result<String> {
        let t = self.lexer.peek();
        match t.kind {
            TokenKind::LBrace => {
                self.lexer.bump();
                Ok(self.lexer.balanced()?.to_owned())
            }
            TokenKind::Quote => {
                self.lexer.bump();
                Ok(self.lexer.protected()?.to_owned())
            }
            TokenKind::Char if t.ch.is_some_and(|c| c.is_ascii_digit()) => {
                Ok(self.lexer.digits()?.to_owned())
            }
            TokenKind::Char => {
                let name = self.lexer.identifier().map_err(|_| {
                    Error::syntax(
                        ErrorCode::ExpectedToken {
                            expected: "value",
                            found: t.ch,
                        },
                        t.offset,
                    )
                })?;
                match self.strings.get(name) {
                    Some(resolved) => Ok(resolved.to_owned()),
                    None => Err(Error::syntax(
                        ErrorCode::UndefinedVariable(name.to_owned()),
                        t.offset,
                    )),
                }
            }
            _ => Err(Error::syntax(
                ErrorCode::ExpectedToken {
                    expected: "value",
                    found: t.ch,
                },
                t.offset,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Database {
        Parser::new(input).parse().unwrap()
    }

    fn parse_err(input: &str) -> Error {
        Parser::new(input).parse().unwrap_err()
    }

    #[test]
    fn test_one_item_no_fields() {
        for input in ["@article{test, }", "@article(test, )"] {
            let db = parse(input);
            assert_eq!(db.len(), 1);
            let item = db.get("test").unwrap();
            assert_eq!(item.cite_key(), "test");
            assert_eq!(item.item_type(), "article");
            assert!(item.is_empty());
        }
    }

    #[test]
    fn test_fields() {
        let db = parse("@article{test, abc = \"de f\", ijh = \"test@xyz\", }");
        let item = db.get("test").unwrap();
        assert_eq!(item.len(), 2);
        assert_eq!(item.get("abc"), Some("de f"));
        assert_eq!(item.get("ijh"), Some("test@xyz"));
    }

    #[test]
    fn test_value_delimiters() {
        let db = parse("@misc(item1, key = {val{u}e}) @misc(item2, key = \"valu{\"}e{\"}\")");
        assert_eq!(db.get("item1").unwrap().get("key"), Some("val{u}e"));
        assert_eq!(db.get("item2").unwrap().get("key"), Some("valu{\"}e{\"}"));
    }

    #[test]
    fn test_integer_value() {
        let db = parse("@misc{m, year = 1988}");
        assert_eq!(db.get("m").unwrap().get("year"), Some("1988"));
    }

    #[test]
    fn test_backslash_is_literal() {
        let db = parse("@misc{m, title = \"BiB\\TeX\"}");
        assert_eq!(db.get("m").unwrap().get("title"), Some("BiB\\TeX"));
        // a backslash right before the delimiter is still plain content
        let db = parse("@misc{m, title = {x\\}}");
        assert_eq!(db.get("m").unwrap().get("title"), Some("x\\"));
    }

    #[test]
    fn test_junk_between_entries() {
        let db = parse("@misc{a, } this is a comment !!! @misc{b, }");
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn test_at_comment_swallows_line() {
        let db = parse("@misc{a, }\n@comment{whatever @article{\n fits your boat }} @misc{b, }");
        assert_eq!(db.len(), 2);
        assert!(db.contains_key("a"));
        assert!(db.contains_key("b"));
    }

    #[test]
    fn test_string_def_and_use() {
        let mut parser = Parser::new("@string(tmp = \"xyz\") @article(whatever, key = tmp)");
        let db = parser.parse().unwrap();
        assert_eq!(parser.string_table().get("tmp"), Some("xyz"));
        assert_eq!(db.get("whatever").unwrap().get("key"), Some("xyz"));
    }

    #[test]
    fn test_string_concatenation() {
        let db = parse(
            "@string(tmp = \"xyz\") @string(_whatever = \"abc\")\n\
             @article(whatever, key = tmp # \"efg\" # _whatever)",
        );
        assert_eq!(db.get("whatever").unwrap().get("key"), Some("xyzefgabc"));
    }

    #[test]
    fn test_string_names_are_case_sensitive() {
        let err = parse_err("@string(tmp = \"x\") @misc(m, k = TMP)");
        assert_eq!(err.code(), &ErrorCode::UndefinedVariable("TMP".into()));
    }

    #[test]
    fn test_undefined_variable() {
        let err = parse_err("@misc{m, k = nope}");
        assert_eq!(err.code(), &ErrorCode::UndefinedVariable("nope".into()));
        assert_eq!(err.entry_key(), Some("m"));
    }

    #[test]
    fn test_preamble() {
        let mut parser =
            Parser::new("@string{s = \"half\"}@preamble{ s # \" and half\" }@misc{m, }");
        let db = parser.parse().unwrap();
        assert_eq!(db.len(), 1);
        assert_eq!(parser.preambles().len(), 1);
        assert_eq!(parser.preambles()[0], "half and half");
    }

    #[test]
    fn test_entry_keywords_any_case() {
        let mut parser = Parser::new("@STRING{v = {x}}@Comment rest of line\n@misc{m, k = v}");
        let db = parser.parse().unwrap();
        assert_eq!(db.get("m").unwrap().get("k"), Some("x"));
    }

    #[test]
    fn test_mismatched_entry_delimiter() {
        assert!(Parser::new("@misc(m, }").parse().is_err());
        assert!(Parser::new("@misc{m, )").parse().is_err());
    }

    #[test]
    fn test_at_without_entry_is_an_error() {
        // an @ that does not open a valid entry is not junk
        let err = parse_err("text with a bare @ sign");
        assert!(matches!(
            err.code(),
            ErrorCode::ExpectedToken {
                expected: "identifier",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_comma_between_fields() {
        let err = parse_err("@misc{m, a = 1 b = 2}");
        assert_eq!(err.entry_key(), None);
        // the error is at the closing check, after field parsing stopped
        assert!(matches!(err.code(), ErrorCode::ExpectedToken { .. }));
    }

    #[test]
    fn test_error_carries_entry_key() {
        let err = parse_err("@misc{m, a = }");
        assert_eq!(err.entry_key(), Some("m"));
    }

    #[test]
    fn test_unterminated_value() {
        let err = parse_err("@misc{m, a = \"open");
        assert_eq!(err.code(), &ErrorCode::UnclosedQuote);
        let err = parse_err("@misc{m, a = {open");
        assert_eq!(err.code(), &ErrorCode::UnclosedBrace);
        // a closing brace inside a quote piece must be protected
        let err = parse_err("@misc{m, a = \"open}\"}");
        assert_eq!(err.code(), &ErrorCode::UnexpectedClosingBrace);
    }

    #[test]
    fn test_duplicate_field_last_wins() {
        let db = parse("@misc{m, k = {a}, k = {b}}");
        assert_eq!(db.get("m").unwrap().get("k"), Some("b"));
        assert_eq!(db.get("m").unwrap().len(), 1);
    }

    #[test]
    fn test_roundtrip_is_idempotent() {
        let db1 = parse("@misc(item1, key = {val{u}e}) @misc(item2, key = \"valu{\"}e{\"}\")");
        let db2 = parse(&db1.to_string());
        assert_eq!(db1, db2);
        assert_eq!(db1.to_string(), db2.to_string());
    }

    use proptest::prelude::*;
    proptest! {
        #[test]
        fn no_panic(s in "\\PC*") {
            let _ = Parser::new(&s).parse();
        }

        #[test]
        fn parse_or_single_error(s in "@[a-z]{1,8}\\{[a-z]{1,8}, [a-z]{1,4} = \\{[a-zA-Z ]*\\}\\}") {
            // well-formed single entries always parse
            prop_assume!(["comment", "string", "preamble"]
                .iter()
                .all(|special| !s[1..].starts_with(special)));
            let db = Parser::new(&s).parse().unwrap();
            prop_assert_eq!(db.len(), 1);
        }
    }
}
