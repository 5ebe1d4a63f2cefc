//! Logic Module - Feature & Dataset Engines
//!
//! - `features/` - Domain feature extraction and the dataset layout
//! - `dataset/` - Assembly, cleaning and stratified splits
//! - `config` - Pipeline configuration
//! - `pipeline` - Stage driver

pub mod config;
pub mod dataset;
pub mod features;
pub mod pipeline;
