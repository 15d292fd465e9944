//! Translation between LaTeX macro spellings and the code points they stand
//! for.
//!
//! The two directions are not symmetric. Decoding (code point → macro) is a
//! per-character table lookup and cannot fail. Encoding (macro → code point)
//! runs a small parser over the input: it reads macro invocations, consumes
//! at most one argument, substitutes known combinations and leaves unknown
//! macros untouched.
mod lexer;
mod tables;

use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::Result;
use lexer::{Lexer, TokenKind};
pub use tables::macro_table;

/// A single macro definition: either a bare code point (`\ss` → ß) or a
/// table of argument spellings (`\'` with `e` → é).
#[derive(Debug, Clone, PartialEq)]
pub enum MacroDef {
    CodePoint(char),
    Args(HashMap<String, char>),
}

/// Mapping from macro name to definition. A name is either a single control
/// symbol (`'`, `^`, ...) or an alphabetic command (`ss`, `c`, ...).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MacroTable {
    map: HashMap<String, MacroDef>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a macro that substitutes without an argument.
    pub fn define(&mut self, name: impl Into<String>, code_point: char) {
        self.map.insert(name.into(), MacroDef::CodePoint(code_point));
    }

    /// Define one argument spelling of a macro. A previous no-argument
    /// definition under the same name is replaced.
    pub fn define_arg(
        &mut self,
        name: impl Into<String>,
        arg: impl Into<String>,
        code_point: char,
    ) {
        let def = self
            .map
            .entry(name.into())
            .or_insert_with(|| MacroDef::Args(HashMap::new()));
        match def {
            MacroDef::Args(args) => {
                args.insert(arg.into(), code_point);
            }
            MacroDef::CodePoint(_) => {
                *def = MacroDef::Args(HashMap::from([(arg.into(), code_point)]));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&MacroDef> {
        self.map.get(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Replace every code point that has a macro spelling by that spelling.
///
/// Characters absent from the built-in table pass through unchanged, so the
/// output only ever loses non-ASCII code points. The transform is idempotent
/// because every spelling in the table is pure ASCII.
pub fn utf8_decode(input: &str) -> String {
    let table = tables::decode_table();
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match table.get(&c) {
            Some(spelling) => out.push_str(spelling),
            None => out.push(c),
        }
    }
    out
}

/// Replace every known macro invocation by its code point, using the
/// built-in table.
pub fn utf8_encode(input: &str) -> Result<String> {
    Transducer::new(input, macro_table()).transform()
}

/// Outcome of reading one macro invocation.
enum Expansion {
    /// The macro (and argument, if any) matched the table.
    Substituted(char),
    /// Unknown macro or unknown argument; the text to emit verbatim.
    Verbatim(String),
}

/// A single-use LaTeX → code point transducer over a caller-supplied
/// [`MacroTable`].
pub struct Transducer<'r> {
    lexer: Lexer<'r>,
    macros: &'r MacroTable,
}

impl<'r> Transducer<'r> {
    pub fn new(input: &'r str, macros: &'r MacroTable) -> Self {
        Self {
            lexer: Lexer::new(input),
            macros,
        }
    }

    /// Transform the whole input.
    ///
    /// Fails only on an unmatched `{` while reading a brace-delimited
    /// argument; unknown macros are passed through, never rejected.
    pub fn transform(mut self) -> Result<String> {
        let mut out = String::with_capacity(self.lexer.input_len());
        loop {
            match self.lexer.peek().kind {
                TokenKind::Eos => break,
                TokenKind::Backslash => {
                    let brace_open = out.ends_with('{');
                    match self.macro_call(false)? {
                        Expansion::Substituted(c) => {
                            // `{\'e}` collapses to the bare substitution
                            if brace_open && self.lexer.peek().kind == TokenKind::RBrace {
                                self.lexer.bump();
                                out.pop();
                            }
                            out.push(c);
                        }
                        Expansion::Verbatim(text) => out.push_str(&text),
                    }
                }
                _ => out.push_str(self.lexer.take_plain()),
            }
        }
        Ok(out)
    }

    /// Read the macro name after a consumed backslash: a maximal alphabetic
    /// run, or a single non-alphabetic character.
    fn macro_name(&mut self) -> (Cow<'r, str>, bool) {
        let t = self.lexer.peek();
        match t.kind {
            TokenKind::Alpha => (Cow::Borrowed(self.lexer.alpha_run()), true),
            TokenKind::Other => {
                self.lexer.bump();
                match t.ch {
                    Some(c) => (Cow::Owned(c.to_string()), false),
                    None => (Cow::Borrowed(""), false),
                }
            }
            _ => (Cow::Borrowed(""), false),
        }
    }

    /// Read one `\name` invocation. With `skip_arg`, the name is read but
    /// never looked up or given an argument; this is how a macro used *as*
    /// an argument is taken literally.
    fn macro_call(&mut self, skip_arg: bool) -> Result<Expansion> {
        self.lexer.eat(TokenKind::Backslash, "'\\\\'")?;
        let (name, alpha_name) = self.macro_name();

        if skip_arg {
            return Ok(Expansion::Verbatim(format!("\\{name}")));
        }

        let macros: &'r MacroTable = self.macros;
        let Some(def) = macros.get(&name) else {
            return Ok(Expansion::Verbatim(format!("\\{name}")));
        };

        match def {
            MacroDef::CodePoint(c) => Ok(Expansion::Substituted(*c)),
            MacroDef::Args(args) => {
                let (arg, literal) = self.argument(alpha_name)?;
                match args.get(&arg) {
                    Some(c) => Ok(Expansion::Substituted(*c)),
                    None => {
                        let mut text = format!("\\{name}");
                        text.push_str(&literal);
                        Ok(Expansion::Verbatim(text))
                    }
                }
            }
        }
    }

    /// Read one macro argument, returning the lookup key and the literal
    /// spelling to emit when the combination is unknown.
    ///
    /// The argument is a nested macro name (`\'\i`), an exactly-balanced
    /// brace group (`\'{e}`, braces excluded from the key), or a single
    /// character. Alphabetic macro names require a separating space before a
    /// bare character argument; the space belongs to the invocation, not to
    /// the argument.
    fn argument(&mut self, alpha_name: bool) -> Result<(String, String)> {
        let t = self.lexer.peek();
        match t.kind {
            TokenKind::Backslash => {
                self.lexer.bump();
                let (name, _) = self.macro_name();
                let arg = format!("\\{name}");
                Ok((arg.clone(), arg))
            }
            TokenKind::LBrace => {
                self.lexer.bump();
                let content = self.lexer.balanced()?;
                Ok((content.to_owned(), format!("{{{content}}}")))
            }
            _ => {
                let mut literal = String::new();
                if alpha_name {
                    self.lexer.eat(TokenKind::Space, "' '")?;
                    literal.push(' ');
                }
                let mut arg = String::new();
                if let Some(c) = self.lexer.bump().ch {
                    arg.push(c);
                    literal.push(c);
                }
                Ok((arg, literal))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(input: &str, macros: &MacroTable) -> String {
        Transducer::new(input, macros).transform().unwrap()
    }

    fn acute() -> MacroTable {
        let mut macros = MacroTable::new();
        macros.define("x", '\u{E9}');
        macros.define_arg("y", "a", '\u{E9}');
        macros.define_arg("'", "e", '\u{E9}');
        macros
    }

    #[test]
    fn test_macro_without_argument() {
        let macros = acute();
        assert_eq!(transform("plant\\x, le sapin", &macros), "planté, le sapin");
        // unknown macros are left alone
        assert_eq!(transform("plant\\z", &macros), "plant\\z");
    }

    #[test]
    fn test_alphabetic_macro_with_argument() {
        let mut macros = MacroTable::new();
        macros.define_arg("xe", "a", '\u{E8}');
        macros.define_arg("xe", "b", '\u{E9}');

        assert_eq!(transform("plant\\xe{b} un arbre", &macros), "planté un arbre");
        // `m\xe are` is equivalent to `m\xe{a}re`
        assert_eq!(transform("m\\xe are", &macros), "mère");
    }

    #[test]
    fn test_control_symbol_with_argument() {
        let mut macros = MacroTable::new();
        macros.define_arg("^", "a", '\u{E2}');
        macros.define_arg("^", "e", '\u{EA}');

        assert_eq!(transform("\\^etre", &macros), "être");
        assert_eq!(transform("gr\\^ace", &macros), "grâce");
    }

    #[test]
    fn test_brace_elision_around_substitution() {
        let macros = acute();
        assert_eq!(transform("mang{\\x}", &macros), "mangé");
        assert_eq!(transform("mang{\\'e}", &macros), "mangé");
        assert_eq!(transform("mang{\\y a}", &macros), "mangé");
        assert_eq!(transform("mang{\\y{a}}", &macros), "mangé");
        // no elision when nothing was substituted
        assert_eq!(transform("mang{\\z}", &macros), "mang{\\z}");
    }

    #[test]
    fn test_unknown_argument_passes_through() {
        let macros = acute();
        assert_eq!(transform("\\y{oops}", &macros), "\\y{oops}");
        assert_eq!(transform("\\y b", &macros), "\\y b");
        assert_eq!(transform("\\'a", &macros), "\\'a");
    }

    #[test]
    fn test_nested_macro_argument_is_not_substituted() {
        let mut macros = acute();
        macros.define_arg("'", "\\i", '\u{ED}');
        assert_eq!(transform("f\\'\\inir", &macros), "f\\'\\inir");
        assert_eq!(transform("f\\'\\i nir", &macros), "fí nir");
    }

    #[test]
    fn test_unmatched_brace_argument_fails() {
        let macros = acute();
        assert!(Transducer::new("\\y{open", &macros).transform().is_err());
    }

    #[test]
    fn test_decode() {
        assert_eq!(
            utf8_decode("Cet été, j'ai été à la chasse aux mûres"),
            "Cet \\'et\\'e, j'ai \\'et\\'e \\`a la chasse aux m\\^ures"
        );
    }

    #[test]
    fn test_encode() {
        assert_eq!(
            utf8_encode("Cet \\'et\\'e, j'ai \\'et\\'e \\`a la chasse aux m\\^ures").unwrap(),
            "Cet été, j'ai été à la chasse aux mûres"
        );
    }

    #[test]
    fn test_decode_is_idempotent_on_sample() {
        let once = utf8_decode("Ces caractères-là: ĳ, ß, Ő — et «ça»");
        assert_eq!(utf8_decode(&once), once);
    }

    #[test]
    fn test_table_round_trips() {
        for (code_point, spelling) in tables::DECODE_PAIRS.iter().copied() {
            assert_eq!(utf8_decode(&code_point.to_string()), spelling);
            assert_eq!(
                utf8_encode(spelling).unwrap(),
                code_point.to_string(),
                "{spelling:?}"
            );
            // the brace-elision law
            assert_eq!(
                utf8_encode(&format!("{{{spelling}}}")).unwrap(),
                code_point.to_string(),
                "{{{spelling}}}"
            );
        }
    }

    use proptest::prelude::*;
    proptest! {
        #[test]
        fn decode_idempotent(s in "\\PC*") {
            let once = utf8_decode(&s);
            prop_assert_eq!(utf8_decode(&once), once);
        }

        #[test]
        fn encode_no_panic(s in "\\PC*") {
            let _ = utf8_encode(&s);
        }
    }
}
