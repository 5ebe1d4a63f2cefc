//! Split Manifest
//!
//! Records seed, layout and a SHA-256 per split file so training runs can
//! check they are using byte-identical splits.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::{DatasetError, DatasetResult};
use super::record::DomainRecord;
use super::writer::write_atomic;
use crate::constants;
use crate::logic::features::layout::{layout_hash, FEATURE_VERSION};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub name: String,
    pub path: PathBuf,
    pub rows: usize,
    pub positives: usize,
    pub negatives: usize,
    pub sha256: String,
}

impl PartitionSummary {
    pub fn describe(name: &str, path: &Path, records: &[DomainRecord]) -> DatasetResult<Self> {
        let positives = records.iter().filter(|r| r.class.is_malicious()).count();
        Ok(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            rows: records.len(),
            positives,
            negatives: records.len() - positives,
            sha256: sha256_file(path)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitManifest {
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
    pub seed: u64,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub partitions: Vec<PartitionSummary>,
}

impl SplitManifest {
    pub fn new(seed: u64, partitions: Vec<PartitionSummary>) -> Self {
        Self {
            generated_at: Utc::now(),
            tool_version: constants::APP_VERSION.to_string(),
            seed,
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            partitions,
        }
    }

    pub fn save(&self, path: &Path) -> DatasetResult<()> {
        let json = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &json)
    }

    pub fn load(path: &Path) -> DatasetResult<Self> {
        let data = std::fs::read(path).map_err(|e| DatasetError::io(path, e))?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Names of partitions whose file no longer matches the recorded hash
    pub fn verify(&self) -> DatasetResult<Vec<String>> {
        let mut changed = Vec::new();
        for partition in &self.partitions {
            if sha256_file(&partition.path)? != partition.sha256 {
                changed.push(partition.name.clone());
            }
        }
        Ok(changed)
    }
}

pub fn sha256_file(path: &Path) -> DatasetResult<String> {
    let file = File::open(path).map_err(|e| DatasetError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        let n = reader.read(&mut buffer).map_err(|e| DatasetError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}
