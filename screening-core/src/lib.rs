//! Sentinel Screening Core
//!
//! Deterministic sanctions/export-control name screening against an
//! immutable snapshot of consolidated watchlists.
//!
//! # Architecture
//!
//! - **Normalizer**: canonicalizes any name string into a comparable form
//! - **Entity Index**: immutable, built once per snapshot, lock-free reads
//! - **Scorer**: weighted token-set + sequence similarity in [0, 100]
//! - **Screening Engine**: score → dedup per entity → rank → classify
//!
//! # Invariants
//!
//! - Same query + same snapshot → same result, always
//! - At most one hit per (source_id, entity_id) pair
//! - Match ordering is fully deterministic (score, source, entity)
//! - Truncation to top_k never changes the decision

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod normalize;
pub mod score;
pub mod types;

// Re-exports
pub use config::Config;
pub use engine::{ScreenOptions, ScreeningEngine};
pub use error::{Error, Result};
pub use index::{EntityIndex, IndexCache};
pub use normalize::normalize;
pub use score::Scorer;
pub use types::{CanonicalEntityRecord, Decision, Hit, NameKind, NormalizedName, ScreeningResult, Thresholds};
