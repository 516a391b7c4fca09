//! Data models for transcripts.

use serde::{Deserialize, Serialize};

/// Where a transcript came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptSource {
    /// Caption track published with the video (manual or auto-generated).
    Captions,
    /// Speech-to-text over the downloaded audio.
    Whisper,
}

impl std::fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptSource::Captions => write!(f, "captions"),
            TranscriptSource::Whisper => write!(f, "whisper"),
        }
    }
}

/// A single line of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Spoken text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Length in seconds.
    pub duration: f64,
}

impl TranscriptEntry {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// End time in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A complete transcript for one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,
    pub source: TranscriptSource,
    pub entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new(video_id: impl Into<String>, source: TranscriptSource, entries: Vec<TranscriptEntry>) -> Self {
        Self {
            video_id: video_id.into(),
            source,
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Video length in minutes, taken from the end of the last entry.
    pub fn duration_minutes(&self) -> f64 {
        self.entries.last().map(|e| e.end() / 60.0).unwrap_or(0.0)
    }

    /// One `[MM:SS] text` line per entry.
    pub fn format_with_timestamps(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("[{}] {}", format_timestamp(e.start), e.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Format seconds as MM:SS or HH:MM:SS.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
