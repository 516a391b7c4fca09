//! YouTube access: video IDs, metadata and caption tracks.
//!
//! Everything here goes through `yt-dlp`; the traits exist so the
//! orchestrator can be driven by other sources in tests.

mod captions;
mod metadata;

pub use captions::{parse_vtt, YtDlpCaptions};
pub use metadata::YtDlpMetadata;

use crate::error::Result;
use crate::transcription::Transcript;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Hosts that serve YouTube watch pages or short links.
const YOUTUBE_HOSTS: [&str; 2] = ["youtube.com", "youtu.be"];

/// Descriptive metadata for a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: String,
    /// Uploader or channel name.
    pub author: Option<String>,
    pub duration_seconds: Option<u32>,
    pub view_count: Option<u64>,
}

impl VideoMetadata {
    /// Placeholder used when metadata cannot be fetched.
    pub fn unknown(video_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            title: format!("YouTube Video ({})", video_id),
            author: None,
            duration_seconds: None,
            view_count: None,
        }
    }

    /// Whole minutes, when the duration is known and at least a minute.
    pub fn duration_minutes(&self) -> Option<u32> {
        self.duration_seconds.map(|s| s / 60).filter(|m| *m > 0)
    }
}

/// Source of video metadata.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata>;
}

/// Source of caption transcripts.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch the caption track for a video.
    ///
    /// Fails with `MissingCaptions` when the video has no usable track.
    async fn fetch_captions(&self, video_id: &str) -> Result<Transcript>;
}

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            (?:
                (?:https?://)?
                (?:www\.|m\.|music\.)?
                (?:
                    youtube\.com/watch\?(?:\S*?&)?v=
                    | youtu\.be/
                    | youtube\.com/(?:embed|v|shorts|live)/
                )
                ([a-zA-Z0-9_-]{11})
            )
            |
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("video id pattern is valid")
    })
}

/// Extract the 11-character video ID from a YouTube URL or bare ID.
pub fn extract_video_id(input: &str) -> Option<String> {
    let caps = video_id_regex().captures(input.trim())?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Check that the input points at YouTube and names a video.
pub fn is_youtube_url(input: &str) -> bool {
    let input = input.trim();
    if input.is_empty() {
        return false;
    }

    let with_scheme = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    let host_ok = url::Url::parse(&with_scheme)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .is_some_and(|host| {
            YOUTUBE_HOSTS
                .iter()
                .any(|h| host == *h || host.ends_with(&format!(".{}", h)))
        });

    (host_ok || !input.contains('/')) && extract_video_id(input).is_some()
}

/// Canonical watch page URL for a video ID.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
