//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! File layout is never hard-coded here, only fallbacks and env var names.

/// Default shuffle/split seed
pub const DEFAULT_SEED: u64 = 42;

/// Default config file name (searched in the working directory first)
pub const DEFAULT_CONFIG_FILE: &str = "pipeline.json";

/// Env var pointing at the config file
pub const ENV_CONFIG_PATH: &str = "DOMAIN_DATASET_CONFIG";

/// Env var overriding the configured seed
pub const ENV_SEED: &str = "DOMAIN_DATASET_SEED";

/// Env var overriding the configured worker count
pub const ENV_WORKERS: &str = "DOMAIN_DATASET_WORKERS";

/// Manifest written next to the split files
pub const MANIFEST_FILE: &str = "split_manifest.json";

/// Rows below this count are extracted on the calling thread
pub const PARALLEL_MIN_ROWS: usize = 4096;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "domain-dataset";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get config path from environment, if set
pub fn get_config_path() -> Option<String> {
    std::env::var(ENV_CONFIG_PATH).ok().filter(|s| !s.trim().is_empty())
}

/// Get seed override from environment
pub fn get_seed_override() -> Option<u64> {
    std::env::var(ENV_SEED).ok().and_then(|s| s.trim().parse().ok())
}

/// Get worker count override from environment
pub fn get_workers_override() -> Option<usize> {
    std::env::var(ENV_WORKERS)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Number of worker threads when the config doesn't say
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
