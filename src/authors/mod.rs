//! Splitting author fields into structured names.
//!
//! An input holds one or more names separated by the word `and`. Every name
//! is split into the four canonical parts following the rules described in
//! "Tame the BeaST" (<http://tug.ctan.org/info/bibtex/tamethebeast/ttb_en.pdf>):
//! with no comma the order is `First von Last`, with one comma `von Last,
//! First`, and with two commas `von Last, Jr, First`. Which words land in
//! which part is decided by per-word capitalization.
mod lexer;

use std::fmt;

use unicase::UniCase;

use crate::error::{Error, ErrorCode, Result};
use lexer::{Lexer, TokenKind};

/// One structured author name.
///
/// `von` is empty when the name has no von part; `jr` is only ever present
/// for the three-group comma form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Author {
    pub first: String,
    pub von: String,
    pub last: String,
    pub jr: Option<String>,
}

impl fmt::Display for Author {
    /// Canonical comma form: `von Last, Jr, First`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.von.is_empty() {
            write!(f, "{} ", self.von)?;
        }
        f.write_str(&self.last)?;
        if let Some(jr) = &self.jr {
            write!(f, ", {jr}")?;
        }
        write!(f, ", {}", self.first)
    }
}

/// Capitalization of one word, used solely to split name parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Case {
    Caseless,
    Lower,
    Upper,
}

/// The case of a single character, by comparison with its own uppercasing.
/// Characters without case distinction count as upper, like the original
/// BibTeX purification does.
fn alpha_case(c: char) -> Case {
    if c.to_uppercase().eq(std::iter::once(c)) {
        Case::Upper
    } else {
        Case::Lower
    }
}

/// The case of a special character `{\...}`: skip the macro name, then take
/// the first alphanumeric character. Digits count as lower case.
fn special_case(group: &str) -> Option<Case> {
    let mut rest = group.chars().skip(2).peekable();
    if rest.peek().is_some_and(|c| c.is_alphabetic()) {
        while rest.peek().is_some_and(|c| c.is_alphabetic()) {
            rest.next();
        }
    }
    rest.find(|c| c.is_alphanumeric()).map(|c| {
        if c.is_numeric() {
            Case::Lower
        } else {
            alpha_case(c)
        }
    })
}

#[derive(Debug)]
struct Word {
    text: String,
    case: Case,
}

fn join(words: &[Word]) -> String {
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&word.text);
    }
    out
}

/// Natural form `First von Last`: the von part runs from the first to the
/// last lower-case word, the final word always belongs to `last`, and with
/// no lower-case word everything before the final word is `first`.
fn natural_form(words: &[Word]) -> Author {
    let Some((last_word, head)) = words.split_last() else {
        return Author {
            first: String::new(),
            von: String::new(),
            last: String::new(),
            jr: None,
        };
    };

    let mut von_start = None;
    let mut von_end = 0;
    for (idx, word) in head.iter().enumerate() {
        if word.case == Case::Lower {
            von_start.get_or_insert(idx);
            von_end = idx + 1;
        }
    }

    match von_start {
        Some(start) => Author {
            first: join(&head[..start]),
            von: join(&head[start..von_end]),
            last: join(&words[von_end..]),
            jr: None,
        },
        None => Author {
            first: join(head),
            von: String::new(),
            last: last_word.text.clone(),
            jr: None,
        },
    }
}

/// Split the `von Last` block of a comma form: everything up to and
/// including the rightmost lower-case word is `von`, except that the final
/// word always stays in `last`.
fn split_von_last(group: &[Word]) -> (String, String) {
    let Some((_, head)) = group.split_last() else {
        return (String::new(), String::new());
    };
    match head.iter().rposition(|w| w.case == Case::Lower) {
        Some(idx) => (join(&group[..=idx]), join(&group[idx + 1..])),
        None => (String::new(), join(group)),
    }
}

/// Parser for an `and`-separated list of author names.
pub struct AuthorsParser<'r> {
    lexer: Lexer<'r>,
}

impl<'r> AuthorsParser<'r> {
    pub fn new(input: &'r str) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    /// Parse the whole input into a list of authors.
    pub fn authors(mut self) -> Result<Vec<Author>> {
        let mut authors = Vec::new();
        loop {
            while self.lexer.peek()?.kind == TokenKind::Space {
                self.lexer.bump()?;
            }
            if self.lexer.peek()?.kind == TokenKind::Eos {
                return Ok(authors);
            }
            authors.push(self.author()?);
        }
    }

    /// Parse one author record, consuming a trailing `and` separator.
    fn author(&mut self) -> Result<Author> {
        let mut words: Vec<Word> = Vec::new();
        let mut commas: Vec<usize> = Vec::new();

        loop {
            let t = self.lexer.peek()?;
            match t.kind {
                TokenKind::Letter | TokenKind::BracedItem | TokenKind::SpecialChar => {
                    let word = self.word()?;
                    if UniCase::ascii(word.text.as_str()) == UniCase::ascii("and") {
                        break;
                    }
                    words.push(word);
                }
                TokenKind::Comma => {
                    if commas.len() == 2 {
                        return Err(Error::syntax(ErrorCode::TooManyCommas, t.offset));
                    }
                    commas.push(words.len());
                    self.lexer.bump()?;
                }
                TokenKind::Space => {
                    self.lexer.bump()?;
                }
                TokenKind::Eos => break,
            }
        }

        Ok(if commas.is_empty() {
            natural_form(&words)
        } else {
            let (von, last) = split_von_last(&words[..commas[0]]);
            let (jr, first) = if commas.len() == 2 {
                (
                    Some(join(&words[commas[0]..commas[1]])),
                    join(&words[commas[1]..]),
                )
            } else {
                (None, join(&words[commas[0]..]))
            };
            Author {
                first,
                von,
                last,
                jr,
            }
        })
    }

    /// Assemble one word and its capitalization. The case comes from the
    /// first determining token: brace groups never determine, a special
    /// character defers to its argument, and a plain character only counts
    /// once an alphabetic character shows up.
    fn word(&mut self) -> Result<Word> {
        let mut text = String::new();
        let mut case = None;

        loop {
            let t = self.lexer.peek()?;
            match t.kind {
                TokenKind::Letter => {
                    if case.is_none() {
                        case = t
                            .text
                            .chars()
                            .next()
                            .filter(|c| c.is_alphabetic())
                            .map(alpha_case);
                    }
                }
                TokenKind::SpecialChar => {
                    if case.is_none() {
                        case = special_case(t.text);
                    }
                }
                TokenKind::BracedItem => {}
                _ => break,
            }
            text.push_str(t.text);
            self.lexer.bump()?;
        }

        Ok(Word {
            text,
            case: case.unwrap_or(Case::Caseless),
        })
    }
}
