//! CSV readers for source files and dataset files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use super::error::{DatasetError, DatasetResult};
use super::record::DomainRecord;
use crate::logic::features::layout::{self, DOMAIN_COLUMN};

/// Cell values treated as missing by tabular readers. A missing domain is
/// not dropped: it becomes the literal `nan`, like the rest of the string
/// coercion, so feature values stay comparable with existing datasets.
pub const MISSING_VALUE_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub const MISSING_PLACEHOLDER: &str = "nan";

/// String coercion of a raw `domain` cell. Case is never normalized.
pub fn coerce_domain(raw: &str) -> String {
    if MISSING_VALUE_TOKENS.contains(&raw) {
        MISSING_PLACEHOLDER.to_string()
    } else {
        raw.to_string()
    }
}

fn open(path: &Path) -> DatasetResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| DatasetError::io(path, e))
}

/// Read the `domain` column of a source file, one entry per data row.
/// Other columns are ignored.
pub fn read_source_domains(path: &Path) -> DatasetResult<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::None)
        .flexible(true)
        .from_reader(open(path)?);

    let headers = reader.headers().map_err(|e| DatasetError::csv(path, e))?.clone();
    let column = headers
        .iter()
        .position(|h| h == DOMAIN_COLUMN)
        .ok_or_else(|| DatasetError::MissingColumn {
            path: path.to_path_buf(),
            column: DOMAIN_COLUMN.to_string(),
        })?;

    let mut domains = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| DatasetError::csv(path, e))?;
        // Short rows behave like an empty cell
        domains.push(coerce_domain(record.get(column).unwrap_or("")));
    }

    log::debug!("Read {} rows from {}", domains.len(), path.display());
    Ok(domains)
}

/// A dataset file and whether it already carries the `id` column
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub records: Vec<DomainRecord>,
    pub has_id: bool,
}

/// Read a combined or split dataset file, validating its header against
/// the layout. Both the pre-clean layout (no `id`) and the final one are
/// accepted; callers decide which they require.
pub fn read_dataset(path: &Path) -> DatasetResult<LoadedDataset> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::None)
        .from_reader(open(path)?);

    let headers = reader.headers().map_err(|e| DatasetError::csv(path, e))?.clone();
    let has_id = headers.len() == layout::dataset_columns(true).len();
    layout::validate_header(headers.iter(), has_id).map_err(|mismatch| {
        DatasetError::SchemaMismatch { path: path.to_path_buf(), mismatch }
    })?;

    let mut records = Vec::new();
    for result in reader.deserialize::<DomainRecord>() {
        records.push(result.map_err(|e| DatasetError::csv(path, e))?);
    }

    Ok(LoadedDataset { records, has_id })
}
