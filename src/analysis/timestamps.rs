//! Key moments sampled from a timestamped transcript.

use super::models::KeyTimestamp;
use super::text::head_chars;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

const DESCRIPTION_CHARS: usize = 80;

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[(\d{1,2}:\d{2}(?::\d{2})?)\]\s*(.+)$").expect("timestamp pattern is valid")
    })
}

/// Sample up to seven evenly spread moments from `[MM:SS] text` lines.
///
/// Positions are the start, each sixth of the way through and the last
/// line. Positions that coincide in short transcripts are reported once.
pub fn extract_timestamps(transcript_text: &str) -> Vec<KeyTimestamp> {
    let entries: Vec<(&str, &str)> = transcript_text
        .lines()
        .filter_map(|line| {
            let caps = line_regex().captures(line.trim())?;
            Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
        })
        .collect();

    if entries.is_empty() {
        debug!("No transcript entries found for timestamp extraction");
        return Vec::new();
    }

    let n = entries.len();
    let positions = [0, n / 6, n / 3, n / 2, 2 * n / 3, 5 * n / 6, n - 1];

    let mut seen = Vec::with_capacity(positions.len());
    let mut timestamps = Vec::with_capacity(positions.len());
    for idx in positions {
        if seen.contains(&idx) {
            continue;
        }
        seen.push(idx);
        let (timestamp, text) = entries[idx];
        timestamps.push(KeyTimestamp {
            timestamp: timestamp.to_string(),
            description: head_chars(text, DESCRIPTION_CHARS).to_string(),
        });
    }

    debug!("Extracted {} timestamps from {} entries", timestamps.len(), n);
    timestamps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(lines: usize) -> String {
        (0..lines)
            .map(|i| format!("[{:02}:{:02}] line {}", i / 60, i % 60, i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_seven_samples_for_long_transcript() {
        let result = extract_timestamps(&transcript(12));
        let descriptions: Vec<&str> = result.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec!["line 0", "line 2", "line 4", "line 6", "line 8", "line 10", "line 11"]
        );
        assert_eq!(result[1].timestamp, "00:02");
    }

    #[test]
    fn test_short_transcript_deduplicates() {
        let result = extract_timestamps(&transcript(3));
        let descriptions: Vec<&str> = result.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, vec!["line 0", "line 1", "line 2"]);
    }

    #[test]
    fn test_description_truncated_and_hours_accepted() {
        let long = "x".repeat(120);
        let text = format!("[1:02:03] {}", long);
        let result = extract_timestamps(&text);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].timestamp, "1:02:03");
        assert_eq!(result[0].description.chars().count(), 80);
    }

    #[test]
    fn test_no_timestamped_lines() {
        assert!(extract_timestamps("plain text\nwithout markers").is_empty());
    }
}
