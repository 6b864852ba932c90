//! Append-only screening audit log (JSON Lines)
//!
//! One self-contained JSON object per screening invocation. Entries are
//! appended under a mutex and fsynced before the call returns, so a
//! successful screening is durable in the log and concurrent appends
//! never interleave. Prior entries are never rewritten or removed.

use crate::error::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use screening_core::{Decision, Hit, ScreeningResult};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One audit record, tied to the snapshot the screening ran against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the screening completed
    pub timestamp: DateTime<Utc>,

    /// The query as given by the caller
    pub query: String,

    /// Snapshot the query was screened against
    pub snapshot_id: String,

    /// Review threshold in force
    pub review_threshold: f64,

    /// Block threshold in force
    pub block_threshold: f64,

    /// Exactly the hits that were returned to the caller
    pub hits: Vec<Hit>,

    /// PASS / REVIEW / BLOCK
    pub decision: Decision,
}

impl AuditEntry {
    /// Build the audit entry for a completed screening, stamped now
    pub fn from_result(result: &ScreeningResult) -> Self {
        Self {
            timestamp: Utc::now(),
            query: result.query.clone(),
            snapshot_id: result.snapshot_id.clone(),
            review_threshold: result.thresholds_used.review_threshold,
            block_threshold: result.thresholds_used.block_threshold,
            hits: result.matches.clone(),
            decision: result.decision,
        }
    }
}

/// Appends audit entries to one snapshot-scoped log file
#[derive(Debug)]
pub struct AuditRecorder {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl AuditRecorder {
    /// Create a recorder appending to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry as a single JSON line, durably.
    ///
    /// The write happens under a lock and is fsynced before returning;
    /// an entry is either fully present or absent, never partial.
    pub fn record(&self, entry: &AuditEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let _guard = self.write_lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.sync_all()?;

        debug!(
            "Appended audit entry for {:?} against {}: {}",
            entry.query, entry.snapshot_id, entry.decision
        );

        Ok(())
    }

    /// Read back every entry, oldest first (audit review and tests)
    pub fn read_all(&self) -> Result<Vec<AuditEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(std::fs::File::open(&self.path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(&line)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screening_core::NameKind;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn entry(query: &str) -> AuditEntry {
        AuditEntry {
            timestamp: Utc::now(),
            query: query.to_string(),
            snapshot_id: "20260121T212239Z_aabbccddeeff".to_string(),
            review_threshold: 20.0,
            block_threshold: 90.0,
            hits: vec![Hit {
                source_id: "OFAC-SDN".to_string(),
                entity_id: "25237".to_string(),
                matched_name: "IRAN AIR".to_string(),
                matched_kind: NameKind::Primary,
                score: 100.0,
                programs: vec!["IFSR".to_string()],
            }],
            decision: Decision::Block,
        }
    }

    #[test]
    fn test_append_and_read_back() {
        let temp = TempDir::new().unwrap();
        let recorder = AuditRecorder::new(temp.path().join("audit.jsonl"));

        recorder.record(&entry("Iran Air")).unwrap();
        recorder.record(&entry("Aerospace Industries Organization")).unwrap();

        let entries = recorder.read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].query, "Iran Air");
        assert_eq!(entries[1].query, "Aerospace Industries Organization");
    }

    #[test]
    fn test_one_line_per_entry() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("audit.jsonl");
        let recorder = AuditRecorder::new(&path);

        recorder.record(&entry("Iran Air")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        let temp = TempDir::new().unwrap();
        let recorder = Arc::new(AuditRecorder::new(temp.path().join("audit.jsonl")));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let recorder = recorder.clone();
                std::thread::spawn(move || {
                    recorder.record(&entry(&format!("query {}", i))).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Every line must parse as a complete entry
        let entries = recorder.read_all().unwrap();
        assert_eq!(entries.len(), 8);
    }

    #[test]
    fn test_read_missing_log_is_empty() {
        let temp = TempDir::new().unwrap();
        let recorder = AuditRecorder::new(temp.path().join("nope.jsonl"));
        assert!(recorder.read_all().unwrap().is_empty());
    }
}
