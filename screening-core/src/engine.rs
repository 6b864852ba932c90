//! Screening engine: score every candidate, dedup per entity, rank, classify
//!
//! One `screen` call is logically synchronous: it normalizes the query
//! once, scores it against every candidate in the index, keeps the best
//! candidate name per (source_id, entity_id), drops sub-threshold hits,
//! classifies over the full surviving set, then sorts and truncates.
//! The decision is computed before truncation, so `top_k` can never
//! change the outcome.

use crate::error::{Error, Result};
use crate::index::{CandidateRef, EntityIndex};
use crate::normalize::normalize;
use crate::score::Scorer;
use crate::types::{Decision, Hit, ScreeningResult, Thresholds};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

/// Per-call screening options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenOptions {
    /// Maximum number of hits returned (decision is unaffected)
    pub top_k: usize,
    /// Minimum score for a hit to surface at all
    pub review_threshold: f64,
    /// Minimum score to auto-block
    pub block_threshold: f64,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            top_k: 10,
            review_threshold: 20.0,
            block_threshold: 90.0,
        }
    }
}

impl ScreenOptions {
    fn validate(&self) -> Result<()> {
        if self.top_k < 1 {
            return Err(Error::Config("top_k must be at least 1".to_string()));
        }

        let in_range = self.review_threshold.is_finite()
            && self.block_threshold.is_finite()
            && self.review_threshold >= 0.0
            && self.block_threshold <= 100.0
            && self.review_threshold <= self.block_threshold;

        if !in_range {
            return Err(Error::Config(format!(
                "thresholds must satisfy 0 <= review ({}) <= block ({}) <= 100",
                self.review_threshold, self.block_threshold
            )));
        }

        Ok(())
    }
}

/// Deterministic screening engine over an immutable [`EntityIndex`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreeningEngine {
    scorer: Scorer,
}

impl ScreeningEngine {
    /// Create an engine with the given scorer
    pub fn new(scorer: Scorer) -> Self {
        Self { scorer }
    }

    /// Screen a query against every candidate in the index.
    ///
    /// Fails with [`Error::Config`] on invalid options before any scoring,
    /// and with [`Error::InvalidQuery`] when the query normalizes to
    /// nothing: a confident-looking PASS for an unscoreable query would
    /// be worse than an error.
    pub fn screen(
        &self,
        index: &EntityIndex,
        query: &str,
        options: &ScreenOptions,
    ) -> Result<ScreeningResult> {
        options.validate()?;

        let normalized_query = normalize(query);
        if normalized_query.is_empty() {
            return Err(Error::InvalidQuery(query.to_string()));
        }

        // Best surviving hit per (source_id, entity_id). Candidates arrive
        // primary-first in record order and are replaced only on strictly
        // greater score, which yields the primary-over-alias and
        // earliest-alias tie-breaks.
        let mut best: HashMap<(&str, &str), Hit> = HashMap::new();

        for candidate in index.candidates() {
            let score = self.scorer.score(&normalized_query, candidate.normalized);
            if score < options.review_threshold {
                continue;
            }

            let key = (
                candidate.record.source_id.as_str(),
                candidate.record.entity_id.as_str(),
            );
            match best.entry(key) {
                Entry::Occupied(mut entry) => {
                    if score > entry.get().score {
                        entry.insert(make_hit(&candidate, score));
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(make_hit(&candidate, score));
                }
            }
        }

        let mut hits: Vec<Hit> = best.into_values().collect();

        // Classify over the full surviving set, before truncation
        let decision = if hits.iter().any(|h| h.score >= options.block_threshold) {
            Decision::Block
        } else if !hits.is_empty() {
            Decision::Review
        } else {
            Decision::Pass
        };

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.source_id.cmp(&b.source_id))
                .then_with(|| a.entity_id.cmp(&b.entity_id))
        });
        hits.truncate(options.top_k);

        debug!(
            "Screened {:?} against {}: {} ({} hits)",
            query,
            index.snapshot_id(),
            decision,
            hits.len()
        );

        Ok(ScreeningResult {
            query: query.to_string(),
            snapshot_id: index.snapshot_id().to_string(),
            decision,
            matches: hits,
            thresholds_used: Thresholds {
                review_threshold: options.review_threshold,
                block_threshold: options.block_threshold,
            },
        })
    }
}

fn make_hit(candidate: &CandidateRef<'_>, score: f64) -> Hit {
    Hit {
        source_id: candidate.record.source_id.clone(),
        entity_id: candidate.record.entity_id.clone(),
        matched_name: candidate.name.to_string(),
        matched_kind: candidate.kind,
        score,
        programs: candidate.record.programs.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CanonicalEntityRecord, NameKind};

    fn record(source_id: &str, entity_id: &str, primary: &str, aliases: &[&str]) -> CanonicalEntityRecord {
        CanonicalEntityRecord {
            source_id: source_id.to_string(),
            entity_id: entity_id.to_string(),
            primary_name: primary.to_string(),
            alternate_names: aliases.iter().map(|a| a.to_string()).collect(),
            programs: vec!["IFSR".to_string()],
            raw_fields: Default::default(),
        }
    }

    fn iran_air_index() -> EntityIndex {
        EntityIndex::build(
            "20260101T000000Z_abcdef123456",
            vec![
                record("OFAC-SDN", "25237", "IRAN AIR", &["IRANAIR", "HOMA"]),
                record("UN", "QDe.001", "Unrelated Shipping Company", &[]),
            ],
        )
    }

    #[test]
    fn test_exact_match_blocks() {
        let engine = ScreeningEngine::default();
        let result = engine
            .screen(&iran_air_index(), "Iran Air", &ScreenOptions::default())
            .unwrap();

        assert_eq!(result.decision, Decision::Block);
        assert_eq!(result.matches.len(), 1);

        let hit = &result.matches[0];
        assert_eq!(hit.source_id, "OFAC-SDN");
        assert_eq!(hit.entity_id, "25237");
        assert_eq!(hit.matched_name, "IRAN AIR");
        assert_eq!(hit.matched_kind, NameKind::Primary);
        assert_eq!(hit.score, 100.0);
    }

    #[test]
    fn test_no_overlap_passes() {
        let engine = ScreeningEngine::default();
        let result = engine
            .screen(
                &iran_air_index(),
                "Zzyxqville Nonexistent Corp",
                &ScreenOptions::default(),
            )
            .unwrap();

        assert_eq!(result.decision, Decision::Pass);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_one_hit_per_entity() {
        // Both the primary and both aliases match; only the best survives
        let index = EntityIndex::build(
            "snap",
            vec![record("OFAC-SDN", "1", "IRAN AIR", &["IRAN AIR CO", "AIR IRAN"])],
        );
        let engine = ScreeningEngine::default();
        let result = engine
            .screen(&index, "Iran Air", &ScreenOptions::default())
            .unwrap();

        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].matched_kind, NameKind::Primary);
    }

    #[test]
    fn test_primary_preferred_on_tied_score() {
        // Alias is identical to the primary; the primary must win the tie
        let index = EntityIndex::build("snap", vec![record("EU", "7", "Iran Air", &["IRAN AIR"])]);
        let engine = ScreeningEngine::default();
        let result = engine
            .screen(&index, "iran air", &ScreenOptions::default())
            .unwrap();

        assert_eq!(result.matches[0].matched_kind, NameKind::Primary);
        assert_eq!(result.matches[0].matched_name, "Iran Air");
    }

    #[test]
    fn test_deterministic_ordering() {
        let index = EntityIndex::build(
            "snap",
            vec![
                record("UN", "2", "Iran Air", &[]),
                record("EU", "9", "Iran Air", &[]),
                record("EU", "1", "Iran Air", &[]),
            ],
        );
        let engine = ScreeningEngine::default();
        let result = engine
            .screen(&index, "Iran Air", &ScreenOptions::default())
            .unwrap();

        let order: Vec<_> = result
            .matches
            .iter()
            .map(|h| (h.source_id.as_str(), h.entity_id.as_str()))
            .collect();
        assert_eq!(order, vec![("EU", "1"), ("EU", "9"), ("UN", "2")]);
    }

    #[test]
    fn test_sub_threshold_hits_excluded() {
        let index = EntityIndex::build("snap", vec![record("OFAC-SDN", "1", "Iran Air Cargo Lines", &[])]);
        let engine = ScreeningEngine::default();
        let options = ScreenOptions {
            review_threshold: 99.0,
            block_threshold: 100.0,
            ..Default::default()
        };
        let result = engine.screen(&index, "Iran Air", &options).unwrap();

        assert!(result.matches.is_empty());
        assert_eq!(result.decision, Decision::Pass);
    }

    #[test]
    fn test_truncation_does_not_change_decision() {
        let records: Vec<_> = (0..50)
            .map(|i| record("EU", &format!("{:03}", i), "Iran Air", &[]))
            .collect();
        let index = EntityIndex::build("snap", records);
        let engine = ScreeningEngine::default();

        let narrow = engine
            .screen(&index, "Iran Air", &ScreenOptions { top_k: 1, ..Default::default() })
            .unwrap();
        let wide = engine
            .screen(&index, "Iran Air", &ScreenOptions { top_k: 1000, ..Default::default() })
            .unwrap();

        assert_eq!(narrow.decision, wide.decision);
        assert_eq!(narrow.matches.len(), 1);
        assert_eq!(wide.matches.len(), 50);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let engine = ScreeningEngine::default();
        let index = iran_air_index();

        for options in [
            ScreenOptions { review_threshold: 50.0, block_threshold: 40.0, ..Default::default() },
            ScreenOptions { review_threshold: -1.0, ..Default::default() },
            ScreenOptions { block_threshold: 101.0, ..Default::default() },
            ScreenOptions { top_k: 0, ..Default::default() },
        ] {
            let err = engine.screen(&index, "Iran Air", &options).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "expected Config error, got {err:?}");
        }
    }

    #[test]
    fn test_empty_query_rejected() {
        let engine = ScreeningEngine::default();
        let err = engine
            .screen(&iran_air_index(), "  ... ", &ScreenOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[test]
    fn test_idempotent_screening() {
        let engine = ScreeningEngine::default();
        let index = iran_air_index();
        let a = engine.screen(&index, "Iran Air", &ScreenOptions::default()).unwrap();
        let b = engine.screen(&index, "Iran Air", &ScreenOptions::default()).unwrap();
        assert_eq!(a, b);
    }
}
