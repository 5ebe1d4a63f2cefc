//! Domain Feature Extraction
//!
//! Pure per-domain functions. A computation that can't produce a value
//! (e.g. ratio over an empty domain) degrades to a neutral default and is
//! reported as `Extraction::Defaulted`; callers that know where the row
//! came from log it. Nothing in this module fails a batch.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::category::{CharacterCategories, CharacterCategory};
use super::vector::DomainFeatures;

/// Digits tolerated before they count towards the anomaly score
/// (version suffixes like `cdn2`, `s3` are normal)
pub const DIGIT_ALLOWANCE: usize = 2;

static LETTERS_AND_DOTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z.]+").expect("valid letters pattern"));
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid digits pattern"));

/// Anything with a digit value: decimal digits of every script plus the
/// superscript, subscript, circled and other digit forms outside `Nd`.
static DIGIT_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"[\p{Nd}",
        r"\u{00B2}\u{00B3}\u{00B9}",
        r"\u{1369}-\u{1371}\u{19DA}",
        r"\u{2070}\u{2074}-\u{2079}\u{2080}-\u{2089}",
        r"\u{2460}-\u{2468}\u{2474}-\u{247C}\u{2488}-\u{2490}",
        r"\u{24EA}\u{24F5}-\u{24FD}\u{24FF}",
        r"\u{2776}-\u{277E}\u{2780}-\u{2788}\u{278A}-\u{2792}",
        r"\u{10A40}-\u{10A43}\u{10E60}-\u{10E68}\u{11052}-\u{1105A}",
        r"\u{1E8C7}-\u{1E8CF}\u{1F100}-\u{1F10A}",
        r"]",
    ))
    .expect("valid digit-like pattern")
});

// ============================================================================
// EXTRACTION OUTCOME
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultReason {
    /// Zero-length domain: ratios and runs are undefined
    EmptyDomain,
}

impl std::fmt::Display for DefaultReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefaultReason::EmptyDomain => write!(f, "empty domain"),
        }
    }
}

/// Result of one feature computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extraction<T> {
    Computed(T),
    Defaulted { value: T, reason: DefaultReason },
}

impl<T: Copy> Extraction<T> {
    pub fn value(&self) -> T {
        match self {
            Extraction::Computed(v) => *v,
            Extraction::Defaulted { value, .. } => *value,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Extraction::Defaulted { .. })
    }
}

// ============================================================================
// FEATURE FUNCTIONS
// ============================================================================

/// Share of characters in `domain` that belong to `category`
pub fn ratio(domain: &str, category: &CharacterCategory) -> Extraction<f64> {
    let total = domain.chars().count();
    if total == 0 {
        log::debug!("ratio({}): empty domain, defaulting to 0.0", category.kind());
        return Extraction::Defaulted { value: 0.0, reason: DefaultReason::EmptyDomain };
    }

    let hits = domain.chars().filter(|&c| category.contains(c)).count();
    Extraction::Computed(hits as f64 / total as f64)
}

/// Length of the longest run of consecutive `category` characters
pub fn longest_run(domain: &str, category: &CharacterCategory) -> Extraction<u32> {
    if domain.is_empty() {
        log::debug!("longest_run({}): empty domain, defaulting to 0", category.kind());
        return Extraction::Defaulted { value: 0, reason: DefaultReason::EmptyDomain };
    }

    let mut longest = 0u32;
    let mut current = 0u32;
    for c in domain.chars() {
        if category.contains(c) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }

    // No member at all is a legitimate zero, not a failure
    Extraction::Computed(longest)
}

/// Anomaly score: non-alphanumeric symbols plus digits beyond the allowance.
///
/// Letters and dots are stripped first; what's left is the residue.
/// `a1b2c3.com` → residue `123` → 3 digits − 2 = 1.
/// `abc##12.com` → residue `##12` → 2 symbols + 0 = 2.
///
/// Digits are counted over every digit form (`٣`, `²`, ...) but only ASCII
/// `0-9` are removed before counting symbols, so a non-ASCII digit scores
/// both as a digit and as a symbol. Trained models depend on this.
pub fn strange_char_count(domain: &str) -> Extraction<u32> {
    let residue = LETTERS_AND_DOTS.replace_all(domain, "");
    if residue.is_empty() {
        return Extraction::Computed(0);
    }

    let digits = DIGIT_LIKE.find_iter(&residue).count();
    let excess_digits = digits.saturating_sub(DIGIT_ALLOWANCE);
    let symbols = DIGITS.replace_all(&residue, "").chars().count();

    Extraction::Computed((symbols + excess_digits) as u32)
}

// ============================================================================
// EXTRACTOR
// ============================================================================

/// Features of one domain plus how many of them fell back to a default
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFeatures {
    pub features: DomainFeatures,
    pub defaulted: u8,
}

/// Computes the full feature set using a borrowed category table
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor<'a> {
    categories: &'a CharacterCategories,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(categories: &'a CharacterCategories) -> Self {
        Self { categories }
    }

    pub fn extract(&self, domain: &str) -> ExtractedFeatures {
        let strange = strange_char_count(domain);
        let sequence = longest_run(domain, &self.categories.numeric);
        let numeric = ratio(domain, &self.categories.numeric);
        let consonant = ratio(domain, &self.categories.consonant);
        let vowel = ratio(domain, &self.categories.vowel);

        let defaulted = [
            strange.is_defaulted(),
            sequence.is_defaulted(),
            numeric.is_defaulted(),
            consonant.is_defaulted(),
            vowel.is_defaulted(),
        ]
        .iter()
        .filter(|d| **d)
        .count() as u8;

        ExtractedFeatures {
            features: DomainFeatures {
                domain_length: domain.chars().count(),
                strange_char_count: strange.value(),
                numeric_sequence: sequence.value(),
                numeric_ratio: numeric.value(),
                consonant_ratio: consonant.value(),
                vowel_ratio: vowel.value(),
            },
            defaulted,
        }
    }

    /// Extract a batch, spreading contiguous chunks over `workers` scoped
    /// threads. Output order always matches input order.
    pub fn extract_batch<S: AsRef<str> + Sync>(
        &self,
        domains: &[S],
        workers: usize,
    ) -> Vec<ExtractedFeatures> {
        let workers = workers.max(1);
        if workers == 1 || domains.len() < crate::constants::PARALLEL_MIN_ROWS {
            return domains.iter().map(|d| self.extract(d.as_ref())).collect();
        }

        let chunk_size = domains.len().div_ceil(workers);
        log::debug!(
            "Extracting {} domains on {} workers (chunk {})",
            domains.len(),
            workers,
            chunk_size
        );

        std::thread::scope(|scope| {
            let handles: Vec<_> = domains
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk.iter().map(|d| self.extract(d.as_ref())).collect::<Vec<_>>()
                    })
                })
                .collect();

            let mut out = Vec::with_capacity(domains.len());
            for handle in handles {
                let part = handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
                out.extend(part);
            }
            out
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
