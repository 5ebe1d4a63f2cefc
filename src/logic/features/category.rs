//! Character Categories
//!
//! Disjoint character classes used by the extractor. Membership is
//! case-sensitive: only lowercase ASCII letters are vowels/consonants,
//! uppercase letters fall in no category. Trained models depend on this,
//! so do NOT "fix" it.

use serde::{Deserialize, Serialize};

pub const VOWEL_CHARS: &str = "aeiou";
pub const CONSONANT_CHARS: &str = "bcdfghjklmnpqrstvwxyz";
pub const NUMERIC_CHARS: &str = "0123456789";
pub const SPECIAL_CHARS: &str = "!\"#|\\$%&/()=?«»´`*+ºª^~;,-_@£€{[]}'";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Vowel,
    Consonant,
    Numeric,
    Special,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Vowel => "vowel",
            CategoryKind::Consonant => "consonant",
            CategoryKind::Numeric => "numeric",
            CategoryKind::Special => "special",
        }
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable named character set.
///
/// ASCII members live in a 128-bit mask (O(1) test); the few non-ASCII
/// symbols of the special class are kept in a short list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterCategory {
    kind: CategoryKind,
    ascii_mask: u128,
    extra: Vec<char>,
}

impl CharacterCategory {
    pub fn new(kind: CategoryKind, members: &str) -> Self {
        let mut ascii_mask = 0u128;
        let mut extra = Vec::new();

        for c in members.chars() {
            if c.is_ascii() {
                ascii_mask |= 1u128 << (c as u32);
            } else if !extra.contains(&c) {
                extra.push(c);
            }
        }

        Self { kind, ascii_mask, extra }
    }

    pub fn kind(&self) -> CategoryKind {
        self.kind
    }

    #[inline]
    pub fn contains(&self, c: char) -> bool {
        if c.is_ascii() {
            self.ascii_mask & (1u128 << (c as u32)) != 0
        } else {
            self.extra.contains(&c)
        }
    }

    /// Number of distinct members
    pub fn len(&self) -> usize {
        self.ascii_mask.count_ones() as usize + self.extra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The full set of categories, built once and handed to the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterCategories {
    pub vowel: CharacterCategory,
    pub consonant: CharacterCategory,
    pub numeric: CharacterCategory,
    pub special: CharacterCategory,
}

impl CharacterCategories {
    pub fn standard() -> Self {
        Self {
            vowel: CharacterCategory::new(CategoryKind::Vowel, VOWEL_CHARS),
            consonant: CharacterCategory::new(CategoryKind::Consonant, CONSONANT_CHARS),
            numeric: CharacterCategory::new(CategoryKind::Numeric, NUMERIC_CHARS),
            special: CharacterCategory::new(CategoryKind::Special, SPECIAL_CHARS),
        }
    }

    /// Category a character belongs to, if any
    pub fn classify(&self, c: char) -> Option<CategoryKind> {
        [&self.vowel, &self.consonant, &self.numeric, &self.special]
            .into_iter()
            .find(|cat| cat.contains(c))
            .map(|cat| cat.kind())
    }
}

impl Default for CharacterCategories {
    fn default() -> Self {
        Self::standard()
    }
}
