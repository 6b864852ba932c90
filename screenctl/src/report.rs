//! Human-readable screening report
//!
//! Groups hits by source list and draws a ten-cell score bar per hit,
//! followed by a short explanation of the scoring method so the numbers
//! in an audit review are self-describing.

use screening_core::{Hit, NameKind, Scorer, ScreeningResult, Thresholds};
use std::collections::BTreeMap;

const RULE_WIDTH: usize = 70;

/// Print the full report to stdout.
pub fn print_report(result: &ScreeningResult, scorer: &Scorer) {
    let rule = "=".repeat(RULE_WIDTH);

    println!("\n{}", rule);
    println!("SCREENING RESULT");
    println!("{}", rule);
    println!("  Query:       {}", result.query);
    println!("  Snapshot:    {}", result.snapshot_id);
    println!("  Decision:    {}", result.decision);
    println!("  Matches:     {}", result.matches.len());
    println!("{}", rule);

    if result.matches.is_empty() {
        println!("\n  No matches found.\n");
        return;
    }

    let mut grouped: BTreeMap<&str, Vec<&Hit>> = BTreeMap::new();
    for hit in &result.matches {
        grouped.entry(hit.source_id.as_str()).or_default().push(hit);
    }

    for (source, hits) in grouped {
        println!("\n  {} MATCHES ({})", source, hits.len());
        println!("  {}", "-".repeat(RULE_WIDTH - 4));

        for hit in hits {
            println!(
                "\n  [{}] Score: {:5.1}% {}",
                hit.source_id,
                hit.score,
                score_bar(hit.score)
            );
            let kind = match hit.matched_kind {
                NameKind::Primary => "primary",
                NameKind::Alias => "alias",
            };
            println!("  Name:    {} ({})", hit.matched_name, kind);
            println!("  ID:      {}", hit.entity_id);
            if let Some(program) = hit.programs.first() {
                println!("  Program: {}", truncate(program, 60));
            }
        }
    }

    print_scoring_method(&result.thresholds_used, scorer);
}

fn print_scoring_method(thresholds: &Thresholds, scorer: &Scorer) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{}", rule);
    println!("SCORING METHOD");
    println!("{}", rule);
    println!(
        "  Score = {:.0}% token overlap + {:.0}% character similarity",
        scorer.token_weight() * 100.0,
        scorer.sequence_weight() * 100.0
    );
    println!("  - Tokens: words after lowercasing, removing punctuation");
    println!("  - 100% = exact match | 50%+ = likely match | <30% = weak match");
    println!(
        "  - BLOCK >= {}% | REVIEW >= {}% | PASS < {}%",
        thresholds.block_threshold, thresholds.review_threshold, thresholds.review_threshold
    );
    println!("{}\n", rule);
}

/// Ten-cell bar, one filled cell per 10 points
fn score_bar(score: f64) -> String {
    let filled = ((score / 10.0) as usize).min(10);
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bar_extremes() {
        assert_eq!(score_bar(100.0), "██████████");
        assert_eq!(score_bar(0.0), "░░░░░░░░░░");
        assert_eq!(score_bar(55.0), "█████░░░░░");
    }

    #[test]
    fn test_truncate_preserves_short_text() {
        assert_eq!(truncate("IFSR", 60), "IFSR");
        let long = "x".repeat(80);
        let cut = truncate(&long, 60);
        assert_eq!(cut.chars().count(), 60);
        assert!(cut.ends_with("..."));
    }
}
