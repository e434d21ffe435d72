use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use extract_bench::DEFAULT_BASE_URL;

pub const DEFAULT_PROVIDER: &str = "openrouter";
pub const DEFAULT_MAX_CONCURRENT: u32 = 5;

/// Client configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub provider: String,
    pub max_concurrent: u32,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables. `main` loads `.env`
    /// before this runs.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            api_url: non_empty("BENCH_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            provider: non_empty("BENCH_PROVIDER").unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            max_concurrent: non_empty("BENCH_MAX_CONCURRENT")
                .map(|v| v.trim().parse())
                .transpose()
                .context("BENCH_MAX_CONCURRENT must be a valid number")?
                .unwrap_or(DEFAULT_MAX_CONCURRENT),
            model: non_empty("BENCH_MODEL"),
            api_key: non_empty("OPENROUTER_API_KEY"),
            output_dir: non_empty("BENCH_OUTPUT_DIR").map(PathBuf::from),
        })
    }
}
