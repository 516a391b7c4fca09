//! Plain-text rendering and JSON export of analyses.

use crate::analysis::VideoAnalysis;
use crate::error::Result;
use chrono::Local;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

const RULE_WIDTH: usize = 80;

/// Terminal report for one analysis.
pub struct Report<'a>(pub &'a VideoAnalysis);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let analysis = self.0;
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        writeln!(f, "{}", heavy)?;
        writeln!(f, "VIDEO ANALYSIS: {}", analysis.title)?;
        writeln!(f, "{}", heavy)?;
        writeln!(f, "\nDuration: {}", analysis.duration)?;
        writeln!(f, "Transcript source: {}\n", analysis.transcript_source)?;

        writeln!(f, "SUMMARY")?;
        writeln!(f, "{}", light)?;
        writeln!(f, "{}", analysis.summary)?;
        writeln!(
            f,
            "\n[Word count: {} words, target {}]",
            analysis.summary_word_count(),
            analysis.target_word_count
        )?;

        writeln!(f, "\n\nKEY TIMESTAMPS")?;
        writeln!(f, "{}", light)?;
        if analysis.key_timestamps.is_empty() {
            writeln!(f, "  No timestamps extracted")?;
        }
        for ts in &analysis.key_timestamps {
            writeln!(f, "  [{}] {}", ts.timestamp, ts.description)?;
        }

        writeln!(f, "\n\nMAIN THEMES")?;
        writeln!(f, "{}", light)?;
        if analysis.themes.is_empty() {
            writeln!(f, "  No themes identified")?;
        }
        for (i, theme) in analysis.themes.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, theme)?;
        }

        writeln!(f, "\n\nCONTENT BREAKDOWN")?;
        write!(f, "{}", light)?;
        for (heading, text) in analysis.content_breakdown.sections() {
            write!(f, "\n\n{}:\n  {}", heading, text)?;
        }
        writeln!(f)
    }
}

/// Render an analysis as the terminal report.
pub fn format_analysis(analysis: &VideoAnalysis) -> String {
    Report(analysis).to_string()
}

/// Expand `{timestamp}` in a file name pattern with the local time.
pub fn output_filename(pattern: &str) -> String {
    pattern.replace("{timestamp}", &Local::now().format("%Y%m%d_%H%M%S").to_string())
}

/// Write the analysis as pretty JSON into `dir`, returning the file path.
pub fn save_analysis(analysis: &VideoAnalysis, dir: &Path, pattern: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(output_filename(pattern));
    let json = serde_json::to_string_pretty(analysis)?;
    std::fs::write(&path, json)?;
    info!("Saved analysis to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ContentBreakdown, KeyTimestamp};
    use crate::config::WordRange;
    use crate::transcription::TranscriptSource;

    fn sample() -> VideoAnalysis {
        VideoAnalysis {
            video_id: "dQw4w9WgXcQ".to_string(),
            title: "Rust Ownership".to_string(),
            duration: "12 minutes".to_string(),
            transcript_source: TranscriptSource::Captions,
            target_word_count: WordRange::new(200, 300),
            summary: "Ownership keeps memory safe.".to_string(),
            key_timestamps: vec![KeyTimestamp {
                timestamp: "01:30".to_string(),
                description: "Borrowing rules".to_string(),
            }],
            themes: vec!["Ownership".to_string(), "Borrowing".to_string()],
            content_breakdown: ContentBreakdown {
                introduction: "Intro text.".to_string(),
                main_content: "Main text.".to_string(),
                conclusion: "Closing text.".to_string(),
            },
        }
    }

    #[test]
    fn test_format_sections() {
        let text = format_analysis(&sample());
        assert!(text.contains("VIDEO ANALYSIS: Rust Ownership"));
        assert!(text.contains("Duration: 12 minutes"));
        assert!(text.contains("[Word count: 4 words, target 200-300]"));
        assert!(text.contains("  [01:30] Borrowing rules"));
        assert!(text.contains("  2. Borrowing"));
        assert!(text.contains("MAIN CONTENT:\n  Main text."));
        assert!(text.find("INTRODUCTION").unwrap() < text.find("CONCLUSION").unwrap());
    }

    #[test]
    fn test_report_display_matches_format() {
        let analysis = sample();
        let text = format!("{}", Report(&analysis));
        assert_eq!(text, format_analysis(&analysis));
        assert!(text.ends_with("CONCLUSION:\n  Closing text.\n"));
    }

    #[test]
    fn test_format_empty_lists() {
        let mut analysis = sample();
        analysis.key_timestamps.clear();
        analysis.themes.clear();

        let text = format_analysis(&analysis);
        assert!(text.contains("No timestamps extracted"));
        assert!(text.contains("No themes identified"));
    }

    #[test]
    fn test_output_filename() {
        let name = output_filename("analysis_{timestamp}.json");
        assert!(name.starts_with("analysis_"));
        assert!(name.ends_with(".json"));
        assert_eq!(name.len(), "analysis_YYYYmmdd_HHMMSS.json".len());
        assert_eq!(output_filename("fixed.json"), "fixed.json");
    }

    #[test]
    fn test_save_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_analysis(&sample(), &dir.path().join("out"), "report_{timestamp}.json").unwrap();

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["title"], "Rust Ownership");
        assert_eq!(json["themes"][1], "Borrowing");
        assert_eq!(json["content_breakdown"]["introduction"], "Intro text.");
    }
}
