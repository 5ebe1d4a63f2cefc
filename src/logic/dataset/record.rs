use serde::{Deserialize, Serialize};

use crate::logic::features::DomainFeatures;

/// Class label, written as 0/1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    Benign,
    Malicious,
}

impl Label {
    pub fn from_suspicious(suspicious: bool) -> Self {
        if suspicious {
            Label::Malicious
        } else {
            Label::Benign
        }
    }

    pub fn is_malicious(&self) -> bool {
        matches!(self, Label::Malicious)
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        match label {
            Label::Benign => 0,
            Label::Malicious => 1,
        }
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::Benign),
            1 => Ok(Label::Malicious),
            other => Err(format!("invalid class label {}, expected 0 or 1", other)),
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Benign => write!(f, "benign"),
            Label::Malicious => write!(f, "malicious"),
        }
    }
}

/// One dataset row. Field order is the CSV column order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DomainRecord {
    pub domain: String,

    // ✅ Features (layout order)
    pub domain_length: usize,
    pub strange_char_count: u32,
    pub numeric_sequence: u32,
    pub numeric_ratio: f64,
    pub consonant_ratio: f64,
    pub vowel_ratio: f64,

    // ✅ Label, fixed by the source file
    pub class: Label,

    // ✅ Only present once the combined dataset has been cleaned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl DomainRecord {
    pub fn new(domain: String, features: DomainFeatures, class: Label) -> Self {
        Self {
            domain,
            domain_length: features.domain_length,
            strange_char_count: features.strange_char_count,
            numeric_sequence: features.numeric_sequence,
            numeric_ratio: features.numeric_ratio,
            consonant_ratio: features.consonant_ratio,
            vowel_ratio: features.vowel_ratio,
            class,
            id: None,
        }
    }
}
