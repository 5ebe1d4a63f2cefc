//! Feature Layout - Centralized Dataset Schema
//!
//! **CRITICAL: This file controls the dataset schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Change a feature definition → increment FEATURE_VERSION
//!
//! Models trained on one layout are not valid on another.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// LAYOUT (Authoritative source)
// ============================================================================

/// Model features in the order they appear in every dataset row
pub const FEATURE_LAYOUT: &[&str] = &[
    "domain_length",      // 0: Character count
    "strange_char_count", // 1: Anomaly score (symbols + excess digits)
    "numeric_sequence",   // 2: Longest run of digits
    "numeric_ratio",      // 3: Share of digits
    "consonant_ratio",    // 4: Share of lowercase consonants
    "vowel_ratio",        // 5: Share of lowercase vowels
];

/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 6;

pub const DOMAIN_COLUMN: &str = "domain";
pub const CLASS_COLUMN: &str = "class";
pub const ID_COLUMN: &str = "id";

/// Full CSV column order: domain, features, class, id
pub fn dataset_columns(with_id: bool) -> Vec<&'static str> {
    let mut columns = Vec::with_capacity(FEATURE_COUNT + 3);
    columns.push(DOMAIN_COLUMN);
    columns.extend_from_slice(FEATURE_LAYOUT);
    columns.push(CLASS_COLUMN);
    if with_id {
        columns.push(ID_COLUMN);
    }
    columns
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over version and full column order
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in dataset_columns(true) {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
    pub columns: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            columns: dataset_columns(true).iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// HEADER VALIDATION
// ============================================================================

/// Header of a dataset file doesn't match the expected columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMismatchError {
    pub expected: Vec<String>,
    pub found: Vec<String>,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Dataset layout mismatch (v{}): expected [{}], found [{}]",
            FEATURE_VERSION,
            self.expected.join(","),
            self.found.join(",")
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Check a CSV header against the dataset layout (exact names, exact order)
pub fn validate_header<'a, I>(headers: I, with_id: bool) -> Result<(), LayoutMismatchError>
where
    I: IntoIterator<Item = &'a str>,
{
    let found: Vec<String> = headers.into_iter().map(|h| h.to_string()).collect();
    let expected = dataset_columns(with_id);

    if found.len() != expected.len() || found.iter().zip(&expected).any(|(f, e)| f != e) {
        return Err(LayoutMismatchError {
            expected: expected.iter().map(|s| s.to_string()).collect(),
            found,
        });
    }

    Ok(())
}

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

// ============================================================================
// TESTS
// ============================================================================
