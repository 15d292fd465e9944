//! # bibdb
//!
//! A library for reading bibliographic databases in the BibTeX family of
//! formats.
//! ```bib
//! @article{key,
//!   title = {Title},
//!   author = {One, Author},
//!   year = 2024,
//! }
//! ```
//! Parsing resolves `@string` substitutions and `#` concatenation up front,
//! so every stored field value is final text. Two auxiliary transformations
//! round out the crate: a bidirectional mapping between code points and
//! their LaTeX macro spellings, and a splitter that takes author fields
//! apart into `first`, `von`, `last` and `jr` parts.
//!
//! ## Reading a database
//!
//! [`parse`] returns the entries together with the `@string` table that was
//! built while reading:
//! ```
//! let input = r#"
//!     @string{ tug = "TUG" }
//!     @article{Knuth1984,
//!       author = {Knuth, Donald E.},
//!       journal = tug # "boat",
//!       year = 1984,
//!     }
//! "#;
//!
//! let (database, strings) = bibdb::parse(input)?;
//!
//! let item = database.get("knuth1984").unwrap();
//! assert_eq!(item.cite_key(), "Knuth1984");
//! assert_eq!(item.get("journal"), Some("TUGboat"));
//! assert_eq!(strings.get("tug"), Some("TUG"));
//!
//! let authors = item.authors()?;
//! assert_eq!(authors[0].last, "Knuth");
//! assert_eq!(authors[0].first, "Donald E.");
//! # Ok::<(), bibdb::Error>(())
//! ```
//!
//! ## LaTeX accents
//!
//! [`utf8_decode`] spells out non-ASCII code points as LaTeX macros;
//! [`utf8_encode`] reads them back, leaving unknown macros untouched:
//! ```
//! assert_eq!(bibdb::utf8_decode("déjà"), "d\\'ej\\`a");
//! assert_eq!(bibdb::utf8_encode("d\\'ej\\`a vu")?, "déjà vu");
//! # Ok::<(), bibdb::Error>(())
//! ```
//! Both directions run against the built-in table; [`Transducer`] accepts a
//! caller-supplied [`MacroTable`] instead.
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`Item`], [`Database`] and
//!   [`Author`], for re-encoding parsed bibliographies in other formats.

pub mod authors;
pub mod bibliography;
pub mod error;
pub mod latex;
pub mod parse;

pub use crate::{
    authors::{Author, AuthorsParser},
    bibliography::{Database, Item},
    error::{Error, Result},
    latex::{MacroDef, MacroTable, Transducer, macro_table, utf8_decode, utf8_encode},
    parse::{Parser, StringTable},
};

/// Parse a BibTeX database, returning the entries and the `@string` table.
///
/// This is the convenience form of driving a [`Parser`] by hand, which also
/// gives access to `@preamble` texts.
pub fn parse(input: &str) -> Result<(Database, StringTable)> {
    let mut parser = Parser::new(input);
    let database = parser.parse()?;
    Ok((database, parser.into_string_table()))
}
