//! Core types for screening
//!
//! All persisted types serialize with serde_json; `NormalizedName` is
//! derived on demand and never persisted.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Uniform representation of one watchlist entry, regardless of the
/// originating file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEntityRecord {
    /// Originating list (e.g. `OFAC-SDN`, `UN`, `EU`)
    pub source_id: String,

    /// Source-assigned identifier; may be empty if the source has none
    pub entity_id: String,

    /// Primary designated name
    pub primary_name: String,

    /// Known aliases, in source order
    #[serde(default)]
    pub alternate_names: Vec<String>,

    /// Program/designation tags, display only
    #[serde(default)]
    pub programs: Vec<String>,

    /// Source-specific metadata preserved for audit and display
    #[serde(default)]
    pub raw_fields: BTreeMap<String, String>,
}

/// Screening decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// No match at or above the review threshold
    Pass,
    /// At least one match in [review_threshold, block_threshold)
    Review,
    /// At least one match at or above the block threshold
    Block,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Pass => write!(f, "PASS"),
            Decision::Review => write!(f, "REVIEW"),
            Decision::Block => write!(f, "BLOCK"),
        }
    }
}

/// Which candidate name of an entity produced the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameKind {
    /// The entity's primary designated name
    Primary,
    /// One of the entity's aliases
    Alias,
}

/// One scored candidate match surfaced in a screening result.
///
/// At most one hit exists per (source_id, entity_id) pair; when several
/// names of the same entity match, only the highest-scoring one is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Originating list
    pub source_id: String,

    /// Source-assigned entity identifier
    pub entity_id: String,

    /// The candidate name (primary or alias) that produced the score
    pub matched_name: String,

    /// Whether the matched name was the primary name or an alias
    pub matched_kind: NameKind,

    /// Similarity score in [0, 100], one decimal place
    pub score: f64,

    /// Program/designation tags of the matched entity
    pub programs: Vec<String>,
}

/// Decision thresholds applied to a screening call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum score for a hit to surface at all
    pub review_threshold: f64,
    /// Minimum score to auto-block
    pub block_threshold: f64,
}

/// The engine's output for one screening invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    /// The query as given by the caller
    pub query: String,

    /// Snapshot the query was screened against
    pub snapshot_id: String,

    /// PASS / REVIEW / BLOCK
    pub decision: Decision,

    /// Surviving hits, score descending, truncated to top_k
    pub matches: Vec<Hit>,

    /// Thresholds in force for this call
    pub thresholds_used: Thresholds,
}

/// A name reduced to comparable form; pure function of the input string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedName {
    /// Unique lowercase word tokens, order-irrelevant
    pub tokens: BTreeSet<String>,

    /// Cleaned, single-spaced string with original word order
    pub sequence: String,
}

impl NormalizedName {
    /// True when nothing scoreable survived normalization
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_serializes_screaming() {
        assert_eq!(serde_json::to_string(&Decision::Pass).unwrap(), "\"PASS\"");
        assert_eq!(serde_json::to_string(&Decision::Review).unwrap(), "\"REVIEW\"");
        assert_eq!(serde_json::to_string(&Decision::Block).unwrap(), "\"BLOCK\"");
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(Decision::Block.to_string(), "BLOCK");
    }

    #[test]
    fn test_record_roundtrip() {
        let record = CanonicalEntityRecord {
            source_id: "OFAC-SDN".to_string(),
            entity_id: "25237".to_string(),
            primary_name: "IRAN AIR".to_string(),
            alternate_names: vec!["IRANAIR".to_string()],
            programs: vec!["IFSR".to_string()],
            raw_fields: BTreeMap::from([("addresses".to_string(), "Tehran, Iran".to_string())]),
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: CanonicalEntityRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
