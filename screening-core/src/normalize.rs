//! Name canonicalization
//!
//! Normalization is a pure function of the input string: no locale or
//! time-dependent behavior, and it never fails. Watchlist names arrive in
//! wildly different shapes ("IRAN AIR", "Iran  Air Co.", full-width forms),
//! so both sides of every comparison go through the same fold.

use crate::types::NormalizedName;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize a name for comparison.
///
/// - Unicode NFKC fold (full-width forms, compatibility characters)
/// - `&` expands to the word "and", so "Johnson & Johnson" and
///   "Johnson and Johnson" normalize identically
/// - Lowercase; anything that is not a letter or digit becomes a space
/// - Whitespace collapsed; `tokens` deduplicated, `sequence` order-preserving
pub fn normalize(name: &str) -> NormalizedName {
    let folded: String = name.nfkc().collect();
    let expanded = folded.replace('&', " and ");

    let mut cleaned = String::with_capacity(expanded.len());
    for c in expanded.chars() {
        if c.is_alphanumeric() {
            cleaned.extend(c.to_lowercase());
        } else {
            cleaned.push(' ');
        }
    }

    let sequence = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let tokens = sequence.split_whitespace().map(str::to_owned).collect();

    NormalizedName { tokens, sequence }
}
