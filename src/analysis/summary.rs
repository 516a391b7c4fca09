//! Summary length enforcement.

use super::text::{char_len, last_sentence_end, slice_chars};
use crate::config::WordRange;

/// Share of the minimum word count below which an expansion is requested.
pub const EXPANSION_RATIO: f64 = 0.75;

pub fn needs_expansion(word_count: usize, range: WordRange) -> bool {
    (word_count as f64) < f64::from(range.min) * EXPANSION_RATIO
}

/// Trim a summary that overshoots `range.max * trim_threshold` words.
///
/// The text is cut to `range.max` words, then back to the last sentence end
/// if that keeps at least `min_retention` of the cut text; otherwise `...`
/// is appended. Summaries within the limit are returned unchanged.
pub fn trim_summary(summary: &str, range: WordRange, trim_threshold: f64, min_retention: f64) -> String {
    let words: Vec<&str> = summary.split_whitespace().collect();
    if (words.len() as f64) <= f64::from(range.max) * trim_threshold {
        return summary.to_string();
    }

    let cut = words.len().min(range.max as usize);
    let trimmed = words[..cut].join(" ");
    let retained_min = char_len(&trimmed) as f64 * min_retention;

    match last_sentence_end(&trimmed) {
        Some(pos) if pos as f64 > retained_min => slice_chars(&trimmed, 0, pos + 1).to_string(),
        _ => format!("{}...", trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(range: std::ops::Range<usize>) -> String {
        range.map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_needs_expansion_threshold() {
        let range = WordRange::new(100, 150);
        assert!(needs_expansion(74, range));
        assert!(!needs_expansion(75, range));
    }

    #[test]
    fn test_within_limit_is_unchanged() {
        let summary = numbered(0..13);
        assert_eq!(trim_summary(&summary, WordRange::new(5, 10), 1.3, 0.7), summary);
    }

    #[test]
    fn test_low_threshold_cut_stays_within_summary() {
        // 100 words exceed 150 * 0.5 but are already under the maximum.
        let summary = numbered(0..100);
        let trimmed = trim_summary(&summary, WordRange::new(100, 150), 0.5, 0.7);
        assert_eq!(trimmed, format!("{}...", summary));
    }

    #[test]
    fn test_trim_cuts_at_late_sentence_end() {
        let summary = format!("{}. {}", numbered(1..9), numbered(9..21));
        let trimmed = trim_summary(&summary, WordRange::new(5, 10), 1.3, 0.7);
        assert_eq!(trimmed, "w1 w2 w3 w4 w5 w6 w7 w8.");
    }

    #[test]
    fn test_trim_appends_ellipsis_when_sentence_end_too_early() {
        let summary = format!("w1. {}", numbered(2..21));
        let trimmed = trim_summary(&summary, WordRange::new(5, 10), 1.3, 0.7);
        assert_eq!(trimmed, "w1. w2 w3 w4 w5 w6 w7 w8 w9 w10...");
    }
}
