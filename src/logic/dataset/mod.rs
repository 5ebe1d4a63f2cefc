//! Dataset Module - Combined Dataset Assembly & Splits
//!
//! Builds the labeled training data for the domain classifier:
//! source CSVs → combined CSV (deduplicated, with ids) → train/val/test.
//! Every file is written to a temp file and renamed into place.

pub mod assembler;
pub mod error;
pub mod manifest;
pub mod reader;
pub mod record;
pub mod splitter;
pub mod validate;
pub mod writer;

#[cfg(test)]
mod tests;

pub use assembler::{AssemblyReport, CleanReport, DatasetAssembler, SourceReport};
pub use error::{DatasetError, DatasetResult};
pub use manifest::{PartitionSummary, SplitManifest};
pub use record::{DomainRecord, Label};
pub use splitter::{DatasetSplit, DatasetSplitter};
pub use writer::DatasetWriter;
