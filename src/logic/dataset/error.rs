use std::path::{Path, PathBuf};

use crate::logic::config::ConfigError;
use crate::logic::features::layout::LayoutMismatchError;

pub type DatasetResult<T> = Result<T, DatasetError>;

/// Pipeline-level failures. Row-level problems never end up here;
/// they are defaulted and logged by the extractor.
#[derive(Debug)]
pub enum DatasetError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Csv {
        path: PathBuf,
        source: csv::Error,
    },
    Serialization(serde_json::Error),
    MissingColumn {
        path: PathBuf,
        column: String,
    },
    SchemaMismatch {
        path: PathBuf,
        mismatch: LayoutMismatchError,
    },
    /// Data model violated (duplicate domain, id gap). Never recoverable.
    InvariantViolation(String),
    Config(ConfigError),
}

impl DatasetError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        DatasetError::Io { path: path.to_path_buf(), source }
    }

    pub fn csv(path: &Path, source: csv::Error) -> Self {
        DatasetError::Csv { path: path.to_path_buf(), source }
    }
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Io { path, source } => {
                write!(f, "IO Error on {}: {}", path.display(), source)
            }
            DatasetError::Csv { path, source } => {
                write!(f, "CSV Error in {}: {}", path.display(), source)
            }
            DatasetError::Serialization(e) => write!(f, "Serialization Error: {}", e),
            DatasetError::MissingColumn { path, column } => {
                write!(f, "Missing required column '{}' in {}", column, path.display())
            }
            DatasetError::SchemaMismatch { path, mismatch } => {
                write!(f, "{}: {}", path.display(), mismatch)
            }
            DatasetError::InvariantViolation(msg) => write!(f, "Dataset invariant violated: {}", msg),
            DatasetError::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Io { source, .. } => Some(source),
            DatasetError::Csv { source, .. } => Some(source),
            DatasetError::Serialization(e) => Some(e),
            DatasetError::SchemaMismatch { mismatch, .. } => Some(mismatch),
            DatasetError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        DatasetError::Serialization(err)
    }
}

impl From<ConfigError> for DatasetError {
    fn from(err: ConfigError) -> Self {
        DatasetError::Config(err)
    }
}
