//! Snapshot identity and persistence
//!
//! A snapshot id is `<compact UTC timestamp>_<12-hex content hash>`. The
//! hash covers the concatenation of all per-source manifest hashes in
//! source_id order, so two snapshots of byte-identical source content get
//! distinguishable but content-traceable identities. The fixed-width
//! timestamp prefix makes lexicographic order equal chronological order,
//! which is what "latest" resolution relies on.

use crate::audit::AuditRecorder;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use screening_core::CanonicalEntityRecord;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info};

const MANIFEST_FILE: &str = "manifest.json";
const RECORDS_FILE: &str = "records.jsonl";
const AUDIT_FILE: &str = "audit.jsonl";

/// Download metadata for one source within a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Originating list identifier
    pub source_id: String,

    /// Where the source data was fetched from
    pub download_url: String,

    /// When the source data was fetched
    pub retrieved_at: DateTime<Utc>,

    /// Hex sha256 over the source's raw bytes
    pub sha256: String,

    /// Number of canonical records the source contributed
    pub record_count: usize,
}

/// One source's contribution to a snapshot, as supplied by ingestion
#[derive(Debug, Clone)]
pub struct SourceBatch {
    /// Manifest entry describing the source data
    pub manifest: ManifestEntry,

    /// Canonical records parsed from that data
    pub records: Vec<CanonicalEntityRecord>,
}

/// Immutable, timestamped collection of canonical entity records
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// `<UTC timestamp>_<content hash prefix>`, assigned at creation
    pub snapshot_id: String,

    /// Per-source download metadata, keyed by source_id
    pub manifest: BTreeMap<String, ManifestEntry>,

    /// All records captured at that instant
    pub records: Vec<CanonicalEntityRecord>,
}

/// Creates and resolves snapshots under a data directory.
///
/// Snapshots, once created, are never mutated or deleted here.
#[derive(Debug, Clone)]
pub struct SnapshotManager {
    data_dir: PathBuf,
}

impl SnapshotManager {
    /// Create a manager rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn snapshots_root(&self) -> PathBuf {
        self.data_dir.join("snapshots")
    }

    /// Directory holding one snapshot's files
    pub fn snapshot_dir(&self, snapshot_id: &str) -> PathBuf {
        self.snapshots_root().join(snapshot_id)
    }

    /// Persist a new snapshot from per-source batches.
    ///
    /// Assigns the snapshot id from the current UTC time and the content
    /// hash of the batches; fails rather than overwrite anything.
    pub fn create(&self, batches: Vec<SourceBatch>) -> Result<Snapshot> {
        self.create_at(batches, Utc::now())
    }

    pub(crate) fn create_at(
        &self,
        batches: Vec<SourceBatch>,
        created_at: DateTime<Utc>,
    ) -> Result<Snapshot> {
        // Key batches by source_id; duplicate sources are an ingestion bug
        let mut by_source: BTreeMap<String, SourceBatch> = BTreeMap::new();
        for batch in batches {
            let source_id = batch.manifest.source_id.clone();
            if by_source.insert(source_id.clone(), batch).is_some() {
                return Err(Error::DuplicateSource(source_id));
            }
        }

        let mut manifest = BTreeMap::new();
        let mut records = Vec::new();
        for (source_id, batch) in by_source {
            manifest.insert(source_id, batch.manifest);
            records.extend(batch.records);
        }

        let snapshot_id = format!(
            "{}_{}",
            created_at.format("%Y%m%dT%H%M%SZ"),
            content_hash(&manifest)
        );

        let dir = self.snapshot_dir(&snapshot_id);
        if dir.exists() {
            return Err(Error::SnapshotExists(snapshot_id));
        }
        fs::create_dir_all(&dir)?;

        fs::write(dir.join(MANIFEST_FILE), serde_json::to_vec_pretty(&manifest)?)?;

        let file = File::create(dir.join(RECORDS_FILE))?;
        let mut writer = BufWriter::new(file);
        for record in &records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()?;

        // Empty audit log, ready for appends
        File::create(dir.join(AUDIT_FILE))?;

        info!(
            "Created snapshot {} with {} sources, {} records",
            snapshot_id,
            manifest.len(),
            records.len()
        );

        Ok(Snapshot {
            snapshot_id,
            manifest,
            records,
        })
    }

    /// Resolve a snapshot: the exact id when given, otherwise the latest.
    pub fn resolve(&self, snapshot_id: Option<&str>) -> Result<Snapshot> {
        match snapshot_id {
            Some(id) => self.load(id),
            None => {
                let latest = self
                    .list()?
                    .pop()
                    .ok_or_else(|| Error::NoSnapshots(self.data_dir.display().to_string()))?;
                self.load(&latest)
            }
        }
    }

    /// All persisted snapshot ids, oldest first
    pub fn list(&self) -> Result<Vec<String>> {
        let root = self.snapshots_root();
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&root)? {
            let entry = entry?;
            if entry.path().join(MANIFEST_FILE).exists() {
                ids.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn load(&self, snapshot_id: &str) -> Result<Snapshot> {
        let dir = self.snapshot_dir(snapshot_id);
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(Error::SnapshotNotFound(snapshot_id.to_string()));
        }

        let manifest: BTreeMap<String, ManifestEntry> =
            serde_json::from_slice(&fs::read(&manifest_path)?)?;

        let mut records = Vec::new();
        let reader = BufReader::new(File::open(dir.join(RECORDS_FILE))?);
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }

        debug!("Loaded snapshot {} with {} records", snapshot_id, records.len());

        Ok(Snapshot {
            snapshot_id: snapshot_id.to_string(),
            manifest,
            records,
        })
    }

    /// Audit recorder appending to the given snapshot's log
    pub fn audit_recorder(&self, snapshot_id: &str) -> AuditRecorder {
        AuditRecorder::new(self.snapshot_dir(snapshot_id).join(AUDIT_FILE))
    }

    /// Touch-check that the snapshot's audit log is writable
    pub fn audit_log_path(&self, snapshot_id: &str) -> PathBuf {
        self.snapshot_dir(snapshot_id).join(AUDIT_FILE)
    }
}

/// 12-hex prefix of sha256 over the per-source hashes, in source_id order
fn content_hash(manifest: &BTreeMap<String, ManifestEntry>) -> String {
    let mut hasher = Sha256::new();
    for entry in manifest.values() {
        hasher.update(entry.sha256.as_bytes());
    }
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn record(source_id: &str, entity_id: &str, name: &str) -> CanonicalEntityRecord {
        CanonicalEntityRecord {
            source_id: source_id.to_string(),
            entity_id: entity_id.to_string(),
            primary_name: name.to_string(),
            alternate_names: vec![],
            programs: vec![],
            raw_fields: Default::default(),
        }
    }

    fn batch(source_id: &str, sha256: &str, records: Vec<CanonicalEntityRecord>) -> SourceBatch {
        SourceBatch {
            manifest: ManifestEntry {
                source_id: source_id.to_string(),
                download_url: format!("https://example.org/{}", source_id),
                retrieved_at: Utc.with_ymd_and_hms(2026, 1, 21, 21, 22, 39).unwrap(),
                sha256: sha256.to_string(),
                record_count: records.len(),
            },
            records,
        }
    }

    #[test]
    fn test_create_and_resolve_roundtrip() {
        let temp = TempDir::new().unwrap();
        let manager = SnapshotManager::new(temp.path());

        let created = manager
            .create(vec![batch(
                "OFAC-SDN",
                "aa11",
                vec![record("OFAC-SDN", "25237", "IRAN AIR")],
            )])
            .unwrap();

        let loaded = manager.resolve(Some(created.snapshot_id.as_str())).unwrap();
        assert_eq!(loaded.snapshot_id, created.snapshot_id);
        assert_eq!(loaded.records, created.records);
        assert_eq!(loaded.manifest["OFAC-SDN"].record_count, 1);
    }

    #[test]
    fn test_snapshot_id_shape() {
        let temp = TempDir::new().unwrap();
        let manager = SnapshotManager::new(temp.path());
        let at = Utc.with_ymd_and_hms(2026, 1, 21, 21, 22, 39).unwrap();

        let snapshot = manager
            .create_at(vec![batch("UN", "bb22", vec![])], at)
            .unwrap();

        let (timestamp, hash) = snapshot.snapshot_id.split_once('_').unwrap();
        assert_eq!(timestamp, "20260121T212239Z");
        assert_eq!(hash.len(), 12);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_identical_content_same_hash_component() {
        let temp = TempDir::new().unwrap();
        let manager = SnapshotManager::new(temp.path());
        let earlier = Utc.with_ymd_and_hms(2026, 1, 21, 10, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 1, 22, 10, 0, 0).unwrap();

        let batches = || vec![batch("EU", "cc33", vec![record("EU", "1", "Iran Air")])];
        let first = manager.create_at(batches(), earlier).unwrap();
        let second = manager.create_at(batches(), later).unwrap();

        let hash_of = |id: &str| id.split_once('_').unwrap().1.to_string();
        assert_ne!(first.snapshot_id, second.snapshot_id);
        assert_eq!(hash_of(&first.snapshot_id), hash_of(&second.snapshot_id));

        // resolve(None) picks the later one
        let latest = manager.resolve(None).unwrap();
        assert_eq!(latest.snapshot_id, second.snapshot_id);
    }

    #[test]
    fn test_resolve_unknown_id_fails() {
        let temp = TempDir::new().unwrap();
        let manager = SnapshotManager::new(temp.path());
        let err = manager.resolve(Some("20990101T000000Z_000000000000")).unwrap_err();
        assert!(matches!(err, Error::SnapshotNotFound(_)));
    }

    #[test]
    fn test_resolve_latest_with_nothing_persisted_fails() {
        let temp = TempDir::new().unwrap();
        let manager = SnapshotManager::new(temp.path());
        let err = manager.resolve(None).unwrap_err();
        assert!(matches!(err, Error::NoSnapshots(_)));
    }

    #[test]
    fn test_duplicate_source_rejected() {
        let temp = TempDir::new().unwrap();
        let manager = SnapshotManager::new(temp.path());
        let err = manager
            .create(vec![
                batch("UK", "dd44", vec![]),
                batch("UK", "ee55", vec![]),
            ])
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSource(_)));
    }

    #[test]
    fn test_records_ordered_by_source() {
        let temp = TempDir::new().unwrap();
        let manager = SnapshotManager::new(temp.path());

        // Batches arrive out of order; persisted record order is by source_id
        let snapshot = manager
            .create(vec![
                batch("UN", "ff66", vec![record("UN", "2", "B Entity")]),
                batch("EU", "0077", vec![record("EU", "1", "A Entity")]),
            ])
            .unwrap();

        assert_eq!(snapshot.records[0].source_id, "EU");
        assert_eq!(snapshot.records[1].source_id, "UN");
    }

    #[test]
    fn test_audit_log_created_empty() {
        let temp = TempDir::new().unwrap();
        let manager = SnapshotManager::new(temp.path());
        let snapshot = manager.create(vec![batch("UN", "1188", vec![])]).unwrap();

        let audit_path = manager.audit_log_path(&snapshot.snapshot_id);
        assert!(audit_path.exists());
        assert_eq!(fs::read(&audit_path).unwrap().len(), 0);
    }
}
