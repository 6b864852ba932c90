//! Configuration for screening
//!
//! Thresholds and scoring weights are configuration values, never
//! hardcoded: compliance teams tune them without code changes. All values
//! can come from a TOML file or environment variables.

use crate::engine::ScreenOptions;
use crate::error::{Error, Result};
use crate::score::{Scorer, DEFAULT_SEQUENCE_WEIGHT, DEFAULT_TOKEN_WEIGHT};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Screening configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory holding snapshots and audit logs
    pub data_dir: PathBuf,

    /// Decision configuration
    pub screening: ScreeningConfig,

    /// Scoring weights
    pub scoring: ScoringConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".sanctions"),
            screening: ScreeningConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Decision thresholds and result sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningConfig {
    /// Maximum hits returned per screening
    pub top_k: usize,

    /// Minimum score for a hit to surface
    pub review_threshold: f64,

    /// Minimum score to auto-block
    pub block_threshold: f64,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        // Low review threshold by default: surface every potential match
        // for human review rather than hide it.
        Self {
            top_k: 10,
            review_threshold: 20.0,
            block_threshold: 90.0,
        }
    }
}

/// Weights of the two score components; must sum to 1.0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight of the token-set component
    pub token_weight: f64,

    /// Weight of the sequence component
    pub sequence_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            token_weight: DEFAULT_TOKEN_WEIGHT,
            sequence_weight: DEFAULT_SEQUENCE_WEIGHT,
        }
    }
}

impl Config {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Load from environment variables, starting from defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(dir) = std::env::var("SCREEN_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(v) = std::env::var("SCREEN_TOP_K") {
            config.screening.top_k = parse_env("SCREEN_TOP_K", &v)?;
        }
        if let Ok(v) = std::env::var("SCREEN_REVIEW_THRESHOLD") {
            config.screening.review_threshold = parse_env("SCREEN_REVIEW_THRESHOLD", &v)?;
        }
        if let Ok(v) = std::env::var("SCREEN_BLOCK_THRESHOLD") {
            config.screening.block_threshold = parse_env("SCREEN_BLOCK_THRESHOLD", &v)?;
        }

        Ok(config)
    }

    /// Per-call options derived from this configuration
    pub fn screen_options(&self) -> ScreenOptions {
        ScreenOptions {
            top_k: self.screening.top_k,
            review_threshold: self.screening.review_threshold,
            block_threshold: self.screening.block_threshold,
        }
    }

    /// Scorer derived from this configuration; rejects invalid weights
    pub fn scorer(&self) -> Result<Scorer> {
        Scorer::new(self.scoring.token_weight, self.scoring.sequence_weight)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {:?}", name, value)))
}
