//! Domain Classifier Dataset Builder
//!
//! Extracts lexical features from domain names, assembles a labeled
//! dataset from suspicious and benign source lists and produces
//! reproducible train/val/test splits.

pub mod constants;
pub mod logic;

pub use logic::config::{ConfigError, PipelineConfig};
pub use logic::dataset::{DatasetError, DatasetResult};
pub use logic::pipeline::{Pipeline, PipelineReport};
