//! Immutable per-snapshot entity index
//!
//! Built once from a snapshot's canonical records, then shared read-only
//! across screening calls. Every primary name and alias is normalized at
//! build time; screening touches every candidate on every call, so the
//! normalization cost is paid exactly once per snapshot.

use crate::normalize::normalize;
use crate::types::{CanonicalEntityRecord, NameKind, NormalizedName};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

/// One scoreable name within the index
#[derive(Debug)]
struct Candidate {
    record: usize,
    kind: NameKind,
    name: String,
    normalized: NormalizedName,
}

/// Immutable index over one snapshot's records.
///
/// No mutation after construction; concurrent reads are safe without
/// locking. Share via `Arc` (see [`IndexCache`]).
#[derive(Debug)]
pub struct EntityIndex {
    snapshot_id: String,
    records: Vec<CanonicalEntityRecord>,
    candidates: Vec<Candidate>,
}

/// Borrowed view of one candidate name and its parent record
#[derive(Debug, Clone, Copy)]
pub struct CandidateRef<'a> {
    /// The record this name belongs to
    pub record: &'a CanonicalEntityRecord,
    /// The candidate name as it appears on the list
    pub name: &'a str,
    /// Primary name or alias
    pub kind: NameKind,
    /// Precomputed normalized form
    pub normalized: &'a NormalizedName,
}

impl EntityIndex {
    /// Build the index, normalizing every primary name and alias once.
    ///
    /// Candidates are emitted primary-first, then aliases in record order;
    /// the engine's tie-breaking depends on that ordering.
    pub fn build(snapshot_id: impl Into<String>, records: Vec<CanonicalEntityRecord>) -> Self {
        let snapshot_id = snapshot_id.into();
        let mut candidates = Vec::new();

        for (record_idx, record) in records.iter().enumerate() {
            candidates.push(Candidate {
                record: record_idx,
                kind: NameKind::Primary,
                name: record.primary_name.clone(),
                normalized: normalize(&record.primary_name),
            });

            for alias in &record.alternate_names {
                candidates.push(Candidate {
                    record: record_idx,
                    kind: NameKind::Alias,
                    name: alias.clone(),
                    normalized: normalize(alias),
                });
            }
        }

        info!(
            "Built entity index for {}: {} records, {} candidate names",
            snapshot_id,
            records.len(),
            candidates.len()
        );

        Self {
            snapshot_id,
            records,
            candidates,
        }
    }

    /// Snapshot this index was built from
    pub fn snapshot_id(&self) -> &str {
        &self.snapshot_id
    }

    /// Number of indexed records
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Number of scoreable candidate names (primaries + aliases)
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Iterate all candidate names. Restartable and finite; each call
    /// yields a fresh pass over the same immutable data.
    pub fn candidates(&self) -> impl Iterator<Item = CandidateRef<'_>> + '_ {
        self.candidates.iter().map(move |c| CandidateRef {
            record: &self.records[c.record],
            name: &c.name,
            kind: c.kind,
            normalized: &c.normalized,
        })
    }
}

/// Shared cache of built indexes, keyed by snapshot id.
///
/// Concurrent screening calls against the same snapshot reuse one index;
/// the builder closure runs at most once per snapshot.
#[derive(Debug, Default)]
pub struct IndexCache {
    indexes: DashMap<String, Arc<EntityIndex>>,
}

impl IndexCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the index for `snapshot_id`, building it from `records` on
    /// first use.
    pub fn get_or_build(
        &self,
        snapshot_id: &str,
        records: impl FnOnce() -> Vec<CanonicalEntityRecord>,
    ) -> Arc<EntityIndex> {
        self.indexes
            .entry(snapshot_id.to_owned())
            .or_insert_with(|| Arc::new(EntityIndex::build(snapshot_id, records())))
            .value()
            .clone()
    }

    /// Number of cached indexes
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// True when nothing is cached yet
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}
