//! Similarity scoring between normalized names
//!
//! The score is a weighted blend of two components, both in [0, 100]:
//!
//! - **Token-set similarity** (default weight 0.8): Dice coefficient over
//!   the token sets, so "Iran Air" vs "Air Iran" scores 100 on this
//!   component regardless of word order.
//! - **Sequence similarity** (default weight 0.2): normalized Levenshtein
//!   over the cleaned strings, rewarding literal spelling closeness and
//!   penalizing unrelated names that coincidentally share common words.
//!
//! Scoring is deterministic and symmetric in content; the result is
//! rounded to one decimal place and clamped to [0, 100].

use crate::error::{Error, Result};
use crate::types::NormalizedName;

/// Default weight of the token-set component
pub const DEFAULT_TOKEN_WEIGHT: f64 = 0.8;

/// Default weight of the sequence component
pub const DEFAULT_SEQUENCE_WEIGHT: f64 = 0.2;

/// Weighted name-similarity scorer
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    token_weight: f64,
    sequence_weight: f64,
}

impl Default for Scorer {
    fn default() -> Self {
        Self {
            token_weight: DEFAULT_TOKEN_WEIGHT,
            sequence_weight: DEFAULT_SEQUENCE_WEIGHT,
        }
    }
}

impl Scorer {
    /// Create a scorer with explicit component weights.
    ///
    /// Weights must be finite, non-negative, and sum to 1.0.
    pub fn new(token_weight: f64, sequence_weight: f64) -> Result<Self> {
        let valid = token_weight.is_finite()
            && sequence_weight.is_finite()
            && token_weight >= 0.0
            && sequence_weight >= 0.0
            && (token_weight + sequence_weight - 1.0).abs() < 1e-9;

        if !valid {
            return Err(Error::Config(format!(
                "scoring weights must be non-negative and sum to 1.0, got {} + {}",
                token_weight, sequence_weight
            )));
        }

        Ok(Self {
            token_weight,
            sequence_weight,
        })
    }

    /// Weight of the token-set component
    pub fn token_weight(&self) -> f64 {
        self.token_weight
    }

    /// Weight of the sequence component
    pub fn sequence_weight(&self) -> f64 {
        self.sequence_weight
    }

    /// Similarity between a query and a candidate name, in [0, 100].
    ///
    /// Never panics; an empty name on either side simply scores 0 against
    /// anything non-identical.
    pub fn score(&self, query: &NormalizedName, candidate: &NormalizedName) -> f64 {
        let token = token_set_similarity(query, candidate);
        let sequence = sequence_similarity(query, candidate);
        let combined = self.token_weight * token + self.sequence_weight * sequence;

        ((combined * 10.0).round() / 10.0).clamp(0.0, 100.0)
    }
}

/// Dice coefficient over the token sets, scaled to [0, 100].
///
/// `2 * |intersection| / (|A| + |B|)` rewards full containment
/// symmetrically; two empty token sets score 0.
fn token_set_similarity(a: &NormalizedName, b: &NormalizedName) -> f64 {
    let total = a.tokens.len() + b.tokens.len();
    if total == 0 {
        return 0.0;
    }

    let intersection = a.tokens.intersection(&b.tokens).count();
    200.0 * intersection as f64 / total as f64
}

/// Normalized Levenshtein similarity over the sequences, scaled to [0, 100].
///
/// Two empty sequences score 0 rather than 100: there is nothing to match.
fn sequence_similarity(a: &NormalizedName, b: &NormalizedName) -> f64 {
    if a.sequence.is_empty() && b.sequence.is_empty() {
        return 0.0;
    }

    strsim::normalized_levenshtein(&a.sequence, &b.sequence) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn test_identical_names_score_100() {
        let n = normalize("Aerospace Industries Organization");
        assert_eq!(Scorer::default().score(&n, &n), 100.0);
    }

    #[test]
    fn test_case_and_punctuation_invariant() {
        let scorer = Scorer::default();
        let a = normalize("IRAN AIR");
        let b = normalize("Iran Air");
        assert_eq!(scorer.score(&a, &b), 100.0);
    }

    #[test]
    fn test_word_reorder_scores_at_least_80() {
        let scorer = Scorer::default();
        let a = normalize("Iran Air");
        let b = normalize("Air Iran");
        let score = scorer.score(&a, &b);
        assert!(score >= 80.0, "reordered tokens scored {}", score);
        assert!(score < 100.0);
    }

    #[test]
    fn test_unrelated_names_score_low() {
        let scorer = Scorer::default();
        let a = normalize("Zzyxqville Nonexistent Corp");
        let b = normalize("Bank Melli Iran");
        assert!(scorer.score(&a, &b) < 20.0);
    }

    #[test]
    fn test_symmetry() {
        let scorer = Scorer::default();
        let a = normalize("Huawei Technologies Co., Ltd");
        let b = normalize("Huawei Device Co.");
        assert_eq!(scorer.score(&a, &b), scorer.score(&b, &a));
    }

    #[test]
    fn test_empty_sides() {
        let scorer = Scorer::default();
        let empty = normalize("");
        let name = normalize("Iran Air");
        assert_eq!(scorer.score(&empty, &empty), 0.0);
        assert_eq!(scorer.score(&empty, &name), 0.0);
        assert_eq!(scorer.score(&name, &empty), 0.0);
    }

    #[test]
    fn test_one_decimal_rounding() {
        let scorer = Scorer::default();
        let a = normalize("Bank Melli");
        let b = normalize("Bank Melli Iran");
        let score = scorer.score(&a, &b);
        assert_eq!((score * 10.0).round() / 10.0, score);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        assert!(Scorer::new(0.5, 0.4).is_err());
        assert!(Scorer::new(-0.2, 1.2).is_err());
        assert!(Scorer::new(f64::NAN, 1.0).is_err());
        assert!(Scorer::new(0.7, 0.3).is_ok());
    }
}
