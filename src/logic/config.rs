//! Pipeline Configuration
//!
//! Maps every dataset role to a file and every output to a path.
//! Loaded from JSON; nothing about the filesystem layout is compiled in.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    NotFound(Vec<PathBuf>),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Config Error: cannot read {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Config Error: invalid JSON in {}: {}", path.display(), source)
            }
            ConfigError::NotFound(searched) => {
                let list: Vec<String> = searched.iter().map(|p| p.display().to_string()).collect();
                write!(f, "Config Error: no config file found (searched: {})", list.join(", "))
            }
            ConfigError::Invalid(msg) => write!(f, "Config Error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ============================================================================
// CONFIG TYPES
// ============================================================================

/// One labeled input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Logical role, e.g. "sans_high" or "top_sites"
    pub role: String,
    pub path: PathBuf,
    /// Every row of a suspicious source is labeled malicious
    pub suspicious: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub combined: PathBuf,
    pub train: PathBuf,
    pub val: PathBuf,
    pub test: PathBuf,
}

impl OutputConfig {
    /// Conventional file names inside one directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            combined: dir.join("all.csv"),
            train: dir.join("train.csv"),
            val: dir.join("val.csv"),
            test: dir.join("test.csv"),
        }
    }
}

/// Held-out shares for one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldoutFractions {
    /// Share of the class carved off as test
    pub test_fraction: f64,
    /// Share of the remainder carved off as validation
    pub val_fraction: f64,
}

/// Per-class holdout shares. The malicious class is usually much smaller,
/// so it gets larger held-out shares.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    pub positive: HoldoutFractions,
    pub negative: HoldoutFractions,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            positive: HoldoutFractions { test_fraction: 0.2, val_fraction: 0.2 },
            negative: HoldoutFractions { test_fraction: 0.1, val_fraction: 0.1 },
        }
    }
}

fn default_seed() -> u64 {
    constants::DEFAULT_SEED
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Processed in order; order only affects row order in the combined file
    pub sources: Vec<SourceConfig>,
    pub outputs: OutputConfig,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Extraction threads (defaults to available parallelism)
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub split: SplitConfig,
}

impl PipelineConfig {
    pub fn new(sources: Vec<SourceConfig>, outputs: OutputConfig) -> Self {
        Self {
            sources,
            outputs,
            seed: constants::DEFAULT_SEED,
            workers: None,
            split: SplitConfig::default(),
        }
    }

    /// Load, resolve relative paths against the file's directory, apply env
    /// overrides and validate
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: PipelineConfig =
            serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(base) = path.parent() {
            config.resolve_relative(base);
        }
        config.apply_overrides(constants::get_seed_override(), constants::get_workers_override());
        config.validate()?;

        log::info!(
            "Loaded config {} ({} sources, seed {})",
            path.display(),
            config.sources.len(),
            config.seed
        );
        Ok(config)
    }

    /// Find the config file: CLI flag, then env var, then working
    /// directory, then the user config directory
    pub fn discover(cli: Option<&Path>, env: Option<String>) -> Result<PathBuf, ConfigError> {
        if let Some(path) = cli {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = env {
            return Ok(PathBuf::from(path));
        }

        let mut searched = vec![PathBuf::from(constants::DEFAULT_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            searched.push(dir.join(constants::APP_NAME).join(constants::DEFAULT_CONFIG_FILE));
        }

        let found = searched.iter().find(|p| p.is_file()).cloned();
        found.ok_or(ConfigError::NotFound(searched))
    }

    pub fn resolve_relative(&mut self, base: &Path) {
        let fix = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        for source in &mut self.sources {
            fix(&mut source.path);
        }
        fix(&mut self.outputs.combined);
        fix(&mut self.outputs.train);
        fix(&mut self.outputs.val);
        fix(&mut self.outputs.test);
    }

    pub fn apply_overrides(&mut self, seed: Option<u64>, workers: Option<usize>) {
        if let Some(seed) = seed {
            log::info!("Seed overridden from environment: {}", seed);
            self.seed = seed;
        }
        if let Some(workers) = workers {
            self.workers = Some(workers);
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(constants::default_workers).max(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid("at least one source is required".into()));
        }

        let mut roles = HashSet::new();
        for source in &self.sources {
            if source.role.trim().is_empty() {
                return Err(ConfigError::Invalid("source role must not be empty".into()));
            }
            if !roles.insert(source.role.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate source role '{}'", source.role)));
            }
            if source.path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!("source '{}' has an empty path", source.role)));
            }
        }

        let outputs = [
            ("combined", &self.outputs.combined),
            ("train", &self.outputs.train),
            ("val", &self.outputs.val),
            ("test", &self.outputs.test),
        ];
        let mut seen = HashSet::new();
        for (name, path) in outputs {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!("output '{}' has an empty path", name)));
            }
            if !seen.insert(path) {
                return Err(ConfigError::Invalid(format!("output '{}' reuses another output path", name)));
            }
        }

        for (class, fractions) in [("positive", self.split.positive), ("negative", self.split.negative)] {
            for (name, value) in [("test_fraction", fractions.test_fraction), ("val_fraction", fractions.val_fraction)] {
                if !(value > 0.0 && value < 1.0) {
                    return Err(ConfigError::Invalid(format!(
                        "split.{}.{} must be in (0, 1), got {}",
                        class, name, value
                    )));
                }
            }
        }

        if self.workers == Some(0) {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "sources": [
            {"role": "sans_high", "path": "sus/sans_high.csv", "suspicious": true},
            {"role": "top_sites", "path": "/data/legit/top-1m.csv", "suspicious": false}
        ],
        "outputs": {
            "combined": "all.csv",
            "train": "train.csv",
            "val": "val.csv",
            "test": "test.csv"
        }
    }"#;

    fn sample() -> PipelineConfig {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let config = sample();
        assert_eq!(config.seed, 42);
        assert_eq!(config.workers, None);
        assert_eq!(config.split, SplitConfig::default());
        assert_eq!(config.split.positive.test_fraction, 0.2);
        assert_eq!(config.split.negative.val_fraction, 0.1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_relative_paths() {
        let mut config = sample();
        config.resolve_relative(Path::new("/srv/data"));

        assert_eq!(config.sources[0].path, PathBuf::from("/srv/data/sus/sans_high.csv"));
        assert_eq!(config.sources[1].path, PathBuf::from("/data/legit/top-1m.csv"));
        assert_eq!(config.outputs.train, PathBuf::from("/srv/data/train.csv"));
    }

    #[test]
    fn test_overrides() {
        let mut config = sample();
        config.apply_overrides(Some(7), Some(3));
        assert_eq!(config.seed, 7);
        assert_eq!(config.worker_count(), 3);

        config.apply_overrides(None, None);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_reject_duplicate_roles() {
        let mut config = sample();
        config.sources[1].role = "sans_high".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_reject_bad_fraction() {
        let mut config = sample();
        config.split.negative.test_fraction = 1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("split.negative.test_fraction"));
    }

    #[test]
    fn test_reject_shared_output_path() {
        let mut config = sample();
        config.outputs.val = config.outputs.train.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_empty_sources_and_zero_workers() {
        let mut config = sample();
        config.workers = Some(0);
        assert!(config.validate().is_err());

        config.workers = None;
        config.sources.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.outputs.combined, dir.path().join("all.csv"));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(PipelineConfig::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_discover_precedence() {
        let cli = PathBuf::from("/etc/cli.json");
        assert_eq!(
            PipelineConfig::discover(Some(&cli), Some("/etc/env.json".into())).unwrap(),
            cli
        );
        assert_eq!(
            PipelineConfig::discover(None, Some("/etc/env.json".into())).unwrap(),
            PathBuf::from("/etc/env.json")
        );
    }
}
