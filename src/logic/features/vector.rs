//! Domain Feature Vector
//!
//! The six model features of one domain, in `FEATURE_LAYOUT` order.

use serde::{Deserialize, Serialize};

use super::layout::{layout_hash, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DomainFeatures {
    pub domain_length: usize,
    pub strange_char_count: u32,
    pub numeric_sequence: u32,
    pub numeric_ratio: f64,
    pub consonant_ratio: f64,
    pub vowel_ratio: f64,
}

impl DomainFeatures {
    /// Values as a flat array (layout order)
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.domain_length as f64,
            self.strange_char_count as f64,
            self.numeric_sequence as f64,
            self.numeric_ratio,
            self.consonant_ratio,
            self.vowel_ratio,
        ]
    }

    /// Get feature by name
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).map(|i| self.as_array()[i])
    }

    /// JSON view for `inspect` output and debug logging
    pub fn to_log_entry(&self, domain: &str) -> serde_json::Value {
        let named: serde_json::Map<String, serde_json::Value> = FEATURE_LAYOUT
            .iter()
            .zip(self.as_array())
            .map(|(name, value)| (name.to_string(), serde_json::json!(value)))
            .collect();

        serde_json::json!({
            "domain": domain,
            "feature_version": FEATURE_VERSION,
            "layout_hash": layout_hash(),
            "features": self,
            "values": self.as_array(),
            "named_values": named,
        })
    }
}
