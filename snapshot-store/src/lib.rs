//! Append-only snapshot and audit storage
//!
//! Snapshots are immutable, content-addressed captures of all watchlist
//! source data at one point in time; the audit log is an append-only
//! JSON Lines file scoped to the snapshot it records screenings against.
//! Nothing in this crate ever rewrites or deletes persisted data.
//!
//! # Layout
//!
//! ```text
//! <data_dir>/snapshots/<snapshot_id>/
//!     manifest.json    per-source download metadata and hashes
//!     records.jsonl    canonical entity records, one per line
//!     audit.jsonl      one entry per screening invocation
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod audit;
pub mod error;
pub mod snapshot;

pub use audit::{AuditEntry, AuditRecorder};
pub use error::{Error, Result};
pub use snapshot::{ManifestEntry, Snapshot, SnapshotManager, SourceBatch};
