//! Named character reference table.
//!
//! Covers the markup delimiters `quot`, `amp`, `gt` and `lt`, the Latin-1
//! letters HTML 2.0 defined, and `nbsp`/`copy`. Every entry maps to exactly
//! one character.

use std::collections::HashMap;

/// `(name, character)` pairs, without the leading `&` or trailing `;`.
pub const LATIN1_ENTITIES: &[(&str, char)] = &[
    // Markup delimiters
    ("quot", '"'),
    ("amp", '&'),
    ("gt", '>'),
    ("lt", '<'),
    // Symbols
    ("nbsp", '\u{00A0}'),
    ("copy", '\u{00A9}'),
    // Upper-case Latin-1 letters
    ("Agrave", '\u{00C0}'),
    ("Aacute", '\u{00C1}'),
    ("Acirc", '\u{00C2}'),
    ("Atilde", '\u{00C3}'),
    ("Auml", '\u{00C4}'),
    ("Aring", '\u{00C5}'),
    ("AElig", '\u{00C6}'),
    ("Ccedil", '\u{00C7}'),
    ("Egrave", '\u{00C8}'),
    ("Eacute", '\u{00C9}'),
    ("Ecirc", '\u{00CA}'),
    ("Euml", '\u{00CB}'),
    ("Igrave", '\u{00CC}'),
    ("Iacute", '\u{00CD}'),
    ("Icirc", '\u{00CE}'),
    ("Iuml", '\u{00CF}'),
    ("Ntilde", '\u{00D1}'),
    ("Ograve", '\u{00D2}'),
    ("Oacute", '\u{00D3}'),
    ("Ocirc", '\u{00D4}'),
    ("Otilde", '\u{00D5}'),
    ("Ouml", '\u{00D6}'),
    ("Oslash", '\u{00D8}'),
    ("Ugrave", '\u{00D9}'),
    ("Uacute", '\u{00DA}'),
    ("Ucirc", '\u{00DB}'),
    ("Uuml", '\u{00DC}'),
    ("Yacute", '\u{00DD}'),
    ("THORN", '\u{00DE}'),
    // Lower-case Latin-1 letters
    ("szlig", '\u{00DF}'),
    ("agrave", '\u{00E0}'),
    ("aacute", '\u{00E1}'),
    ("acirc", '\u{00E2}'),
    ("atilde", '\u{00E3}'),
    ("auml", '\u{00E4}'),
    ("aring", '\u{00E5}'),
    ("aelig", '\u{00E6}'),
    ("ccedil", '\u{00E7}'),
    ("egrave", '\u{00E8}'),
    ("eacute", '\u{00E9}'),
    ("ecirc", '\u{00EA}'),
    ("euml", '\u{00EB}'),
    ("igrave", '\u{00EC}'),
    ("iacute", '\u{00ED}'),
    ("icirc", '\u{00EE}'),
    ("iuml", '\u{00EF}'),
    ("eth", '\u{00F0}'),
    ("ntilde", '\u{00F1}'),
    ("ograve", '\u{00F2}'),
    ("oacute", '\u{00F3}'),
    ("ocirc", '\u{00F4}'),
    ("otilde", '\u{00F5}'),
    ("ouml", '\u{00F6}'),
    ("oslash", '\u{00F8}'),
    ("ugrave", '\u{00F9}'),
    ("uacute", '\u{00FA}'),
    ("ucirc", '\u{00FB}'),
    ("uuml", '\u{00FC}'),
    ("yacute", '\u{00FD}'),
    ("thorn", '\u{00FE}'),
    ("yuml", '\u{00FF}'),
];

/// Immutable name to character lookup.
///
/// A [`Tokenizer`](crate::Tokenizer) builds one the first time it meets a
/// named reference and keeps it for every later parse.
#[derive(Debug, Clone)]
pub struct EntityTable {
    map: HashMap<&'static str, char>,
}

impl Default for EntityTable {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityTable {
    /// Build the table from [`LATIN1_ENTITIES`].
    #[must_use]
    pub fn new() -> Self {
        tracing::trace!(entries = LATIN1_ENTITIES.len(), "building entity table");
        Self {
            map: LATIN1_ENTITIES.iter().copied().collect(),
        }
    }

    /// Character for `name` (case-sensitive, no `&` or `;`).
    ///
    /// ```
    /// use tagscan::EntityTable;
    ///
    /// let table = EntityTable::new();
    /// assert_eq!(table.lookup("amp"), Some('&'));
    /// assert_eq!(table.lookup("AMP"), None);
    /// ```
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<char> {
        self.map.get(name).copied()
    }

    /// Whether `name` is a known entity.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let table = EntityTable::new();
        assert_eq!(table.len(), LATIN1_ENTITIES.len());
    }

    #[test]
    fn every_entry_is_latin1_or_xml() {
        for &(_, c) in LATIN1_ENTITIES {
            assert!(u32::from(c) <= 0xFF, "{c:?} is outside Latin-1");
        }
    }

    #[test]
    fn no_name_shadows_a_longer_one() {
        // First-hit matching would shadow a longer name sharing a prefix.
        let table = EntityTable::new();
        for &(name, _) in LATIN1_ENTITIES {
            for end in 1..name.len() {
                assert!(
                    !table.contains(&name[..end]),
                    "`{}` shadows `{name}`",
                    &name[..end]
                );
            }
        }
    }
}
