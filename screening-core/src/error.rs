//! Error types for the screening engine

use thiserror::Error;

/// Result type for screening operations
pub type Result<T> = std::result::Result<T, Error>;

/// Screening errors
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Invalid thresholds, top_k, or scoring weights
    #[error("Configuration error: {0}")]
    Config(String),

    /// Query that normalizes to nothing scoreable
    #[error("Invalid query {0:?}: empty after normalization")]
    InvalidQuery(String),
}
