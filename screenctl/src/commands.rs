//! Subcommand orchestration
//!
//! `run_screen` is the full engine pipeline: resolve snapshot → build or
//! reuse the index → screen → append the audit entry. The audit append
//! is durable before the function returns; any earlier failure writes
//! nothing, so a failed call never leaves a partial audit record.

use anyhow::{bail, Context};
use list_adapters::{
    builtin_sources,
    fetch::{build_client, Client},
    fetch_source, FetchOptions, SourceSpec,
};
use screening_core::{IndexCache, ScreenOptions, Scorer, ScreeningEngine, ScreeningResult};
use snapshot_store::{AuditEntry, ManifestEntry, SnapshotManager, SourceBatch};
use std::path::PathBuf;
use tracing::{info, warn};

/// Inputs for the `screen` subcommand
#[derive(Debug, Clone)]
pub struct ScreenArgs {
    /// Data directory holding snapshots
    pub data_dir: PathBuf,
    /// Name to screen
    pub query: String,
    /// Specific snapshot, or None for latest
    pub snapshot_id: Option<String>,
    /// Thresholds and result sizing
    pub options: ScreenOptions,
    /// Configured scorer
    pub scorer: Scorer,
}

/// Screen a query against a snapshot and record the audit entry.
pub fn run_screen(args: &ScreenArgs, cache: &IndexCache) -> anyhow::Result<ScreeningResult> {
    let manager = SnapshotManager::new(&args.data_dir);
    let snapshot = manager.resolve(args.snapshot_id.as_deref())?;

    let snapshot_id = snapshot.snapshot_id;
    let records = snapshot.records;
    let index = cache.get_or_build(&snapshot_id, move || records);

    let engine = ScreeningEngine::new(args.scorer);
    let result = engine.screen(&index, &args.query, &args.options)?;

    manager
        .audit_recorder(&result.snapshot_id)
        .record(&AuditEntry::from_result(&result))
        .context("audit append failed; screening result not recorded")?;

    Ok(result)
}

/// Inputs for the `update` subcommand
#[derive(Debug, Clone)]
pub struct UpdateArgs {
    /// Data directory to create the snapshot under
    pub data_dir: PathBuf,
    /// Download options
    pub fetch: FetchOptions,
    /// Abort on the first failed source instead of skipping it
    pub strict: bool,
}

/// Fetch every builtin source and persist a new snapshot.
///
/// A failed source is logged and left out of the snapshot's manifest;
/// with `strict` the whole update aborts instead.
pub async fn run_update(args: &UpdateArgs) -> anyhow::Result<String> {
    let client = build_client(&args.fetch)?;

    let mut batches = Vec::new();
    for spec in builtin_sources() {
        match ingest_source(&client, spec).await {
            Ok(batch) => batches.push(batch),
            Err(e) if args.strict => {
                return Err(e).with_context(|| format!("source {} failed", spec.source_id));
            }
            Err(e) => {
                warn!("Skipping source {}: {:#}", spec.source_id, e);
            }
        }
    }

    if batches.is_empty() {
        bail!("every source failed; no snapshot created");
    }

    let manager = SnapshotManager::new(&args.data_dir);
    let snapshot = manager.create(batches)?;

    info!(
        "Update complete: snapshot {} covers {} sources, {} records",
        snapshot.snapshot_id,
        snapshot.manifest.len(),
        snapshot.records.len()
    );

    Ok(snapshot.snapshot_id)
}

async fn ingest_source(client: &Client, spec: &SourceSpec) -> anyhow::Result<SourceBatch> {
    let fetched = fetch_source(client, spec).await?;
    let records = spec.format.parse(spec.source_id, &fetched.files)?;

    Ok(SourceBatch {
        manifest: ManifestEntry {
            source_id: spec.source_id.to_string(),
            download_url: spec.download_url.to_string(),
            retrieved_at: fetched.retrieved_at,
            sha256: fetched.sha256,
            record_count: records.len(),
        },
        records,
    })
}
