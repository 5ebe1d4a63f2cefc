//! Features Module - Feature Extraction Engine
//!
//! Lexical features of domain names: character-class ratios, digit runs
//! and the strange-character anomaly score. `layout` is the schema
//! contract shared with the dataset files.

pub mod category;
pub mod extract;
pub mod layout;
pub mod vector;

// Re-export common types
pub use category::{CategoryKind, CharacterCategories, CharacterCategory};
pub use extract::{
    longest_run, ratio, strange_char_count, DefaultReason, ExtractedFeatures, Extraction,
    FeatureExtractor,
};
pub use layout::{LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::DomainFeatures;
