//! Dataset Assembler
//!
//! Source CSVs → feature rows → one combined CSV, then a cleaning pass that
//! removes cross-source duplicates and assigns ids.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{DatasetError, DatasetResult};
use super::reader::{read_dataset, read_source_domains};
use super::record::{DomainRecord, Label};
use super::validate::{ensure_contiguous_ids, ensure_unique_domains};
use super::writer::{write_dataset, DatasetWriter};
use crate::logic::config::SourceConfig;
use crate::logic::features::{CharacterCategories, ExtractedFeatures, FeatureExtractor};

/// Per-source outcome of `assemble_all`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub role: String,
    pub class: Label,
    pub rows_read: usize,
    pub duplicates_dropped: usize,
    pub rows_written: usize,
    /// Rows where at least one feature fell back to a default
    pub rows_defaulted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyReport {
    pub sources: Vec<SourceReport>,
    pub total_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanReport {
    pub rows_before: usize,
    pub duplicates_dropped: usize,
    pub rows_after: usize,
}

/// Row indices (0-based, header excluded) whose features fell back to a
/// default, each logged with the source and domain it came from
pub fn flag_defaulted(role: &str, domains: &[String], extracted: &[ExtractedFeatures]) -> Vec<usize> {
    domains
        .iter()
        .zip(extracted)
        .enumerate()
        .filter(|(_, (_, out))| out.defaulted > 0)
        .map(|(row, (domain, out))| {
            log::warn!(
                "Source '{}' row {}: {} feature(s) defaulted for domain {:?}",
                role,
                row,
                out.defaulted,
                domain
            );
            row
        })
        .collect()
}

/// Keep the first occurrence of each domain, preserving order
pub fn dedup_by_domain(records: Vec<DomainRecord>) -> (Vec<DomainRecord>, usize) {
    let before = records.len();
    let mut seen = HashSet::with_capacity(before);
    let kept: Vec<DomainRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.domain.clone()))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

pub struct DatasetAssembler<'a> {
    extractor: FeatureExtractor<'a>,
    workers: usize,
}

impl<'a> DatasetAssembler<'a> {
    pub fn new(categories: &'a CharacterCategories, workers: usize) -> Self {
        Self {
            extractor: FeatureExtractor::new(categories),
            workers: workers.max(1),
        }
    }

    /// One record per input row, in input order, labeled by `suspicious`
    pub fn build_from_source(&self, path: &Path, suspicious: bool) -> DatasetResult<Vec<DomainRecord>> {
        let role = path.display().to_string();
        let (records, _) = self.build_counted(&role, path, suspicious)?;
        Ok(records)
    }

    fn build_counted(
        &self,
        role: &str,
        path: &Path,
        suspicious: bool,
    ) -> DatasetResult<(Vec<DomainRecord>, usize)> {
        let domains = read_source_domains(path)?;
        let class = Label::from_suspicious(suspicious);
        let extracted = self.extractor.extract_batch(&domains, self.workers);
        let defaulted = flag_defaulted(role, &domains, &extracted).len();

        let records: Vec<DomainRecord> = domains
            .into_iter()
            .zip(extracted)
            .map(|(domain, out)| DomainRecord::new(domain, out.features, class))
            .collect();

        Ok((records, defaulted))
    }

    /// Build every source in order and write them into `combined`.
    ///
    /// Duplicates are dropped within each source only; cross-source
    /// duplicates are left for `clean`. The header is written once.
    /// If any source fails, `combined` is left untouched.
    pub fn assemble_all(&self, sources: &[SourceConfig], combined: &Path) -> DatasetResult<AssemblyReport> {
        let mut writer = DatasetWriter::create(combined, false)?;
        let mut reports = Vec::with_capacity(sources.len());

        for source in sources {
            log::info!(
                "Building source '{}' ({}) from {}",
                source.role,
                Label::from_suspicious(source.suspicious),
                source.path.display()
            );

            let (records, rows_defaulted) = self.build_counted(&source.role, &source.path, source.suspicious)?;
            let rows_read = records.len();
            let (records, duplicates_dropped) = dedup_by_domain(records);
            let rows_written = writer.append_all(&records)?;

            if rows_defaulted > 0 {
                log::warn!(
                    "Source '{}': {} rows had defaulted features",
                    source.role,
                    rows_defaulted
                );
            }
            log::info!(
                "Source '{}': {} rows, {} duplicates dropped, {} written",
                source.role,
                rows_read,
                duplicates_dropped,
                rows_written
            );

            reports.push(SourceReport {
                role: source.role.clone(),
                class: Label::from_suspicious(source.suspicious),
                rows_read,
                duplicates_dropped,
                rows_written,
                rows_defaulted,
            });
        }

        let total_rows = writer.commit()?;
        log::info!("Combined dataset: {} rows -> {}", total_rows, combined.display());

        Ok(AssemblyReport { sources: reports, total_rows })
    }

    /// Drop duplicate domains across the whole combined file (first wins),
    /// assign `id` = row index and rewrite the file in place.
    pub fn clean(combined: &Path) -> DatasetResult<CleanReport> {
        let loaded = read_dataset(combined)?;
        let rows_before = loaded.records.len();

        let (mut records, duplicates_dropped) = dedup_by_domain(loaded.records);
        for (index, record) in records.iter_mut().enumerate() {
            record.id = Some(index as i64);
        }

        let context = combined.display().to_string();
        ensure_unique_domains(&records, &context)?;
        ensure_contiguous_ids(&records, &context)?;

        let rows_after = write_dataset(combined, &records, true)?;
        if rows_after != records.len() {
            return Err(DatasetError::InvariantViolation(format!(
                "{}: wrote {} of {} rows",
                context,
                rows_after,
                records.len()
            )));
        }

        log::info!(
            "Cleaned {}: {} rows, {} cross-source duplicates dropped",
            combined.display(),
            rows_after,
            duplicates_dropped
        );

        Ok(CleanReport { rows_before, duplicates_dropped, rows_after })
    }
}
