//! Dataset Splitter
//!
//! Class-stratified train/val/test partitions. Every random step is driven
//! by `StdRng::seed_from_u64(seed)`, so the same input and seed always give
//! byte-identical files.

use std::collections::BTreeMap;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::error::{DatasetError, DatasetResult};
use super::manifest::{PartitionSummary, SplitManifest};
use super::reader::read_dataset;
use super::record::{DomainRecord, Label};
use super::validate::{ensure_contiguous_ids, ensure_ratios_in_range, ensure_unique_domains};
use super::writer::{parent_dir, write_dataset};
use crate::constants::MANIFEST_FILE;
use crate::logic::config::{HoldoutFractions, OutputConfig, SplitConfig};
use crate::logic::features::layout::{dataset_columns, LayoutMismatchError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetSplit {
    pub train: Vec<DomainRecord>,
    pub val: Vec<DomainRecord>,
    pub test: Vec<DomainRecord>,
}

impl DatasetSplit {
    pub fn partitions(&self) -> [(&'static str, &[DomainRecord]); 3] {
        [
            ("train", self.train.as_slice()),
            ("val", self.val.as_slice()),
            ("test", self.test.as_slice()),
        ]
    }

    pub fn total(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }
}

/// Rows held out for a fraction (rounded up, like the usual
/// train/test split helpers)
pub fn holdout_size(n: usize, fraction: f64) -> usize {
    ((n as f64 * fraction).ceil() as usize).min(n)
}

pub fn shuffle(records: &mut [DomainRecord], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    records.shuffle(&mut rng);
}

/// Split into `(rest, held_out)`, holding out `fraction` of every class.
/// Each stratum is permuted with `seed`; the first rows of the
/// permutation are held out.
pub fn stratified_split(
    records: Vec<DomainRecord>,
    fraction: f64,
    seed: u64,
) -> (Vec<DomainRecord>, Vec<DomainRecord>) {
    let mut strata: BTreeMap<Label, Vec<DomainRecord>> = BTreeMap::new();
    for record in records {
        strata.entry(record.class).or_default().push(record);
    }

    let mut rest = Vec::new();
    let mut held_out = Vec::new();
    for (_, mut group) in strata {
        let n_held = holdout_size(group.len(), fraction);
        shuffle(&mut group, seed);
        let remainder = group.split_off(n_held);
        held_out.extend(group);
        rest.extend(remainder);
    }

    (rest, held_out)
}

pub struct DatasetSplitter {
    config: SplitConfig,
    seed: u64,
}

impl DatasetSplitter {
    pub fn new(config: SplitConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    /// Read a cleaned combined dataset and check its invariants
    pub fn load(path: &Path) -> DatasetResult<Vec<DomainRecord>> {
        let loaded = read_dataset(path)?;
        if !loaded.has_id {
            return Err(DatasetError::SchemaMismatch {
                path: path.to_path_buf(),
                mismatch: LayoutMismatchError {
                    expected: dataset_columns(true).iter().map(|s| s.to_string()).collect(),
                    found: dataset_columns(false).iter().map(|s| s.to_string()).collect(),
                },
            });
        }

        let context = path.display().to_string();
        ensure_unique_domains(&loaded.records, &context)?;
        ensure_contiguous_ids(&loaded.records, &context)?;
        ensure_ratios_in_range(&loaded.records, &context)?;

        Ok(loaded.records)
    }

    fn split_class(
        &self,
        records: Vec<DomainRecord>,
        fractions: HoldoutFractions,
        class: Label,
    ) -> (Vec<DomainRecord>, Vec<DomainRecord>, Vec<DomainRecord>) {
        if records.is_empty() {
            log::warn!("No {} rows in dataset; its partitions will be empty", class);
            return (Vec::new(), Vec::new(), Vec::new());
        }

        let total = records.len();
        let (train_val, test) = stratified_split(records, fractions.test_fraction, self.seed);
        let (train, val) = stratified_split(train_val, fractions.val_fraction, self.seed);

        log::info!(
            "{} rows: {} -> train {}, val {}, test {}",
            class,
            total,
            train.len(),
            val.len(),
            test.len()
        );
        (train, val, test)
    }

    /// Partition by class, hold out per-class shares, recombine and shuffle
    pub fn split(&self, dataset: &[DomainRecord]) -> DatasetResult<DatasetSplit> {
        ensure_unique_domains(dataset, "split input")?;

        let (positive, negative): (Vec<DomainRecord>, Vec<DomainRecord>) =
            dataset.iter().cloned().partition(|r| r.class.is_malicious());

        let (pos_train, pos_val, pos_test) =
            self.split_class(positive, self.config.positive, Label::Malicious);
        let (neg_train, neg_val, neg_test) =
            self.split_class(negative, self.config.negative, Label::Benign);

        let mut split = DatasetSplit {
            train: [pos_train, neg_train].concat(),
            val: [pos_val, neg_val].concat(),
            test: [pos_test, neg_test].concat(),
        };
        shuffle(&mut split.train, self.seed);
        shuffle(&mut split.val, self.seed);
        shuffle(&mut split.test, self.seed);

        for (name, records) in split.partitions() {
            ensure_unique_domains(records, name)?;
        }
        if split.total() != dataset.len() {
            return Err(DatasetError::InvariantViolation(format!(
                "split produced {} rows from {}",
                split.total(),
                dataset.len()
            )));
        }

        Ok(split)
    }

    /// Write each partition (ids kept as-is) plus the manifest, which goes
    /// next to the train file
    pub fn write(&self, split: &DatasetSplit, outputs: &OutputConfig) -> DatasetResult<SplitManifest> {
        let targets = [
            ("train", outputs.train.as_path(), &split.train),
            ("val", outputs.val.as_path(), &split.val),
            ("test", outputs.test.as_path(), &split.test),
        ];

        let mut summaries = Vec::with_capacity(targets.len());
        for (name, path, records) in targets {
            write_dataset(path, records, true)?;
            summaries.push(PartitionSummary::describe(name, path, records)?);
            log::info!("Wrote {} ({} rows) -> {}", name, records.len(), path.display());
        }

        let manifest = SplitManifest::new(self.seed, summaries);
        manifest.save(&parent_dir(&outputs.train).join(MANIFEST_FILE))?;
        Ok(manifest)
    }

    /// `write` with conventional file names in `dir`
    pub fn write_to_dir(&self, split: &DatasetSplit, dir: &Path) -> DatasetResult<SplitManifest> {
        self.write(split, &OutputConfig::in_dir(dir))
    }
}
