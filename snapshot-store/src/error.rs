//! Error types for snapshot and audit storage

use thiserror::Error;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Storage errors
#[derive(Error, Debug)]
pub enum Error {
    /// Requested snapshot id does not exist
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    /// "Latest" was requested but nothing has been persisted yet
    #[error("No snapshots in {0}: run an update first")]
    NoSnapshots(String),

    /// A snapshot with this id already exists; snapshots are never overwritten
    #[error("Snapshot already exists: {0}")]
    SnapshotExists(String),

    /// Two source batches carry the same source_id
    #[error("Duplicate source in snapshot: {0}")]
    DuplicateSource(String),

    /// Filesystem failure
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Manifest, record, or audit (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
