//! Fundamental components of a bibliography: items and the database that
//! owns them.
//!
//! Lookup is always case-insensitive on the cite key, using a
//! locale-independent ASCII fold; non-ASCII code points are compared as-is.
use std::collections::HashMap;
use std::fmt;

use crate::authors::{Author, AuthorsParser};
use crate::error::Result;

/// Field names scanned by [`Item::authors`], in order.
pub const AUTHOR_FIELDS: &[&str] = &["author", "Author", "AUTHOR"];

/// A single `@type{key, field = value, ...}` record.
///
/// 1. The cite key keeps the case it was written with; [`Database`] lookup
///    folds it.
/// 2. The item type is normalised to ASCII lower case.
/// 3. Field names keep their case as read and are unique within the item;
///    assigning an existing field replaces its value in place.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    cite_key: String,
    item_type: String,
    fields: Vec<(String, String)>,
}

impl Item {
    /// Construct an item with no fields.
    pub fn new(cite_key: impl Into<String>, item_type: &str) -> Self {
        Self {
            cite_key: cite_key.into(),
            item_type: item_type.to_ascii_lowercase(),
            fields: Vec::new(),
        }
    }

    /// The cite key, in its original case.
    pub fn cite_key(&self) -> &str {
        &self.cite_key
    }

    /// The item type (`article`, `book`, ...), in lower case.
    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    /// Look up a field value. The field name is matched exactly.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the item has a field with this exact name.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Assign a field. An existing field keeps its position in iteration
    /// order but takes the new value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value.into(),
            None => self.fields.push((name, value.into())),
        }
    }

    /// Iterate over `(name, value)` pairs in the order they were assigned.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse the author list from the first of [`AUTHOR_FIELDS`] present.
    ///
    /// Returns an empty list if none of the candidate fields exist.
    pub fn authors(&self) -> Result<Vec<Author>> {
        self.authors_in(AUTHOR_FIELDS)
    }

    /// Parse the author list from the first of `candidates` present.
    ///
    /// The candidate names are matched exactly, so the caller controls the
    /// case-sensitivity of the scan through the list itself.
    pub fn authors_in(&self, candidates: &[&str]) -> Result<Vec<Author>> {
        for name in candidates {
            if let Some(value) = self.get(name) {
                return AuthorsParser::new(value).authors();
            }
        }
        Ok(Vec::new())
    }
}

impl fmt::Display for Item {
    /// Canonical BibTeX rendering. All values come out brace-delimited.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}{{{},\n  ", self.item_type, self.cite_key)?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",\n  ")?;
            }
            write!(f, "{name} = {{{value}}}")?;
        }
        f.write_str("\n}")
    }
}

/// An ordered collection of [`Item`]s, indexed by folded cite key.
///
/// Iteration order is insertion order. Inserting an item whose cite key is
/// already present (case-insensitively) replaces the old item but keeps its
/// position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Database {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item, replacing any existing item with the same folded key.
    pub fn insert(&mut self, item: Item) {
        match self.index.entry(item.cite_key.to_ascii_lowercase()) {
            std::collections::hash_map::Entry::Occupied(slot) => {
                self.items[*slot.get()] = item;
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(self.items.len());
                self.items.push(item);
            }
        }
    }

    /// Look up an item by cite key, ignoring ASCII case.
    pub fn get(&self, cite_key: &str) -> Option<&Item> {
        self.index
            .get(&cite_key.to_ascii_lowercase())
            .map(|&i| &self.items[i])
    }

    /// Whether an item with this cite key exists, ignoring ASCII case.
    pub fn contains_key(&self, cite_key: &str) -> bool {
        self.index.contains_key(&cite_key.to_ascii_lowercase())
    }

    /// Iterate over the items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Item> for Database {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        let mut db = Self::new();
        for item in iter {
            db.insert(item);
        }
        db
    }
}

impl<'a> IntoIterator for &'a Database {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{item}")?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Database {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.items)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Database {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        Ok(Vec::<Item>::deserialize(deserializer)?
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Item {
        let mut item = Item::new("Patashnik1988", "Misc");
        item.set("author", "Oren Patashnik");
        item.set("title", "BiB\\TeXing");
        item
    }

    #[test]
    fn test_item_type_folded() {
        assert_eq!(sample().item_type(), "misc");
    }

    #[test]
    fn test_field_overwrite_keeps_position() {
        let mut item = sample();
        item.set("author", "O. Patashnik");
        let fields: Vec<_> = item.fields().collect();
        assert_eq!(
            fields,
            vec![("author", "O. Patashnik"), ("title", "BiB\\TeXing")]
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut db = Database::new();
        db.insert(sample());

        assert!(db.contains_key("patashnik1988"));
        assert!(db.contains_key("PATASHNIK1988"));
        let item = db.get("pataSHNIK1988").unwrap();
        // the original case survives
        assert_eq!(item.cite_key(), "Patashnik1988");
        assert!(!db.contains_key("patashnik"));
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut db = Database::new();
        db.insert(sample());
        db.insert(Item::new("other", "book"));
        db.insert(Item::new("PATASHNIK1988", "article"));

        let types: Vec<_> = db.iter().map(Item::item_type).collect();
        assert_eq!(types, vec!["article", "book"]);
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn test_render_item() {
        assert_eq!(
            sample().to_string(),
            "@misc{Patashnik1988,\n  author = {Oren Patashnik},\n  title = {BiB\\TeXing}\n}"
        );
    }

    #[test]
    fn test_render_empty_item() {
        let item = Item::new("k", "misc");
        assert_eq!(item.to_string(), "@misc{k,\n  \n}");
    }

    #[test]
    fn test_authors_scans_candidates() {
        let mut item = Item::new("k", "misc");
        item.set("AUTHOR", "Fontaine, Jean");
        let authors = item.authors().unwrap();
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].last, "Fontaine");

        assert!(item.authors_in(&["editor"]).unwrap().is_empty());
    }
}
