//! Error types for watchlist ingestion

use thiserror::Error;

/// Result type for ingestion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ingestion errors; per-source, so a failed source never corrupts the
/// snapshot being built from the others
#[derive(Error, Debug)]
pub enum Error {
    /// Download failure
    #[error("HTTP error fetching {url}: {message}")]
    Http {
        /// URL that failed
        url: String,
        /// Underlying error description
        message: String,
    },

    /// Raw file could not be parsed into canonical records
    #[error("Failed to parse {source_id} ({file}): {message}")]
    Parse {
        /// Source being ingested
        source_id: String,
        /// File within the source
        file: String,
        /// What went wrong
        message: String,
    },

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl Error {
    pub(crate) fn parse(
        source_id: impl Into<String>,
        file: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Parse {
            source_id: source_id.into(),
            file: file.into(),
            message: message.into(),
        }
    }
}
