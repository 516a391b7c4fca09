//! Analysis result types.

use crate::config::WordRange;
use crate::transcription::TranscriptSource;
use serde::{Deserialize, Serialize};

/// A notable moment in the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyTimestamp {
    /// `MM:SS` or `HH:MM:SS` as it appears in the transcript.
    pub timestamp: String,
    pub description: String,
}

/// Three-part description of the video's structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBreakdown {
    pub introduction: String,
    pub main_content: String,
    pub conclusion: String,
}

impl ContentBreakdown {
    /// Sections in reading order with their display headings.
    pub fn sections(&self) -> [(&'static str, &str); 3] {
        [
            ("INTRODUCTION", self.introduction.as_str()),
            ("MAIN CONTENT", self.main_content.as_str()),
            ("CONCLUSION", self.conclusion.as_str()),
        ]
    }
}

/// Complete analysis of one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub video_id: String,
    pub title: String,
    /// Display string such as "12 minutes" or "Unknown".
    pub duration: String,
    pub transcript_source: TranscriptSource,
    pub target_word_count: WordRange,
    pub summary: String,
    pub key_timestamps: Vec<KeyTimestamp>,
    pub themes: Vec<String>,
    pub content_breakdown: ContentBreakdown,
}

impl VideoAnalysis {
    pub fn summary_word_count(&self) -> usize {
        self.summary.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_uses_snake_case_keys() {
        let analysis = VideoAnalysis {
            video_id: "abc".to_string(),
            title: "Title".to_string(),
            duration: "3 minutes".to_string(),
            transcript_source: TranscriptSource::Captions,
            target_word_count: WordRange::new(100, 150),
            summary: "Short summary here.".to_string(),
            key_timestamps: vec![KeyTimestamp {
                timestamp: "00:00".to_string(),
                description: "Start".to_string(),
            }],
            themes: vec!["Rust".to_string()],
            content_breakdown: ContentBreakdown {
                introduction: "a".to_string(),
                main_content: "b".to_string(),
                conclusion: "c".to_string(),
            },
        };

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["key_timestamps"][0]["timestamp"], "00:00");
        assert_eq!(json["content_breakdown"]["main_content"], "b");
        assert_eq!(json["transcript_source"], "captions");
        assert_eq!(json["target_word_count"], "100-150");
        assert_eq!(analysis.summary_word_count(), 3);
    }
}
