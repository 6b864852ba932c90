//! HTTP download of raw watchlist files
//!
//! Fetches every file of a source, hashing as it goes; the per-source
//! hash (sha256 over the concatenated file bytes, in registry order) is
//! what snapshot identity is derived from.

use crate::error::{Error, Result};
use crate::source::{RawFile, SourceSpec};
use chrono::{DateTime, Utc};
pub use reqwest::Client;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::debug;

/// Download options for one update run
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Per-request timeout
    pub timeout: Duration,

    /// User-Agent header sent to list publishers
    pub user_agent: String,

    /// Verify TLS certificates; some government hosts ship broken chains
    pub verify_tls: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(90),
            user_agent: "sentinel-screen/0.1".to_string(),
            verify_tls: true,
        }
    }
}

/// Everything fetched for one source, ready for parsing and manifesting
#[derive(Debug)]
pub struct FetchedSource {
    /// The raw files, in registry order
    pub files: Vec<RawFile>,

    /// Hex sha256 over the concatenated file bytes
    pub sha256: String,

    /// When the download completed
    pub retrieved_at: DateTime<Utc>,
}

/// Build the shared HTTP client for an update run.
pub fn build_client(options: &FetchOptions) -> Result<Client> {
    Client::builder()
        .timeout(options.timeout)
        .user_agent(options.user_agent.clone())
        .danger_accept_invalid_certs(!options.verify_tls)
        .build()
        .map_err(|e| Error::Client(e.to_string()))
}

/// Download all files of one source.
pub async fn fetch_source(client: &Client, spec: &SourceSpec) -> Result<FetchedSource> {
    let mut files = Vec::with_capacity(spec.files.len());
    let mut hasher = Sha256::new();

    for file in spec.files {
        let bytes = http_get(client, file.url).await?;
        debug!(
            "Downloaded {} {} ({} bytes)",
            spec.source_id,
            file.name,
            bytes.len()
        );
        hasher.update(&bytes);
        files.push(RawFile::new(file.name, bytes));
    }

    let digest = hasher.finalize();
    let sha256: String = digest.iter().map(|b| format!("{:02x}", b)).collect();

    Ok(FetchedSource {
        files,
        sha256,
        retrieved_at: Utc::now(),
    })
}

async fn http_get(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| Error::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    let bytes = response.bytes().await.map_err(|e| Error::Http {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    Ok(bytes.to_vec())
}
