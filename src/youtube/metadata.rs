//! Video metadata via `yt-dlp --dump-json`.

use super::{watch_url, MetadataSource, VideoMetadata};
use crate::error::{Result, VidbriefError};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Reads title, uploader, duration and view count with yt-dlp.
#[derive(Debug, Default, Clone)]
pub struct YtDlpMetadata;

impl YtDlpMetadata {
    pub fn new() -> Self {
        Self
    }

    fn parse(video_id: &str, json: &serde_json::Value) -> VideoMetadata {
        VideoMetadata {
            video_id: video_id.to_string(),
            title: json["title"].as_str().unwrap_or("Unknown").to_string(),
            author: json["uploader"]
                .as_str()
                .or_else(|| json["channel"].as_str())
                .map(str::to_string),
            duration_seconds: json["duration"].as_f64().map(|d| d as u32),
            view_count: json["view_count"].as_u64(),
        }
    }
}

#[async_trait]
impl MetadataSource for YtDlpMetadata {
    #[instrument(skip(self))]
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata> {
        let output = Command::new("yt-dlp")
            .args(["--dump-json", "--no-download", "--no-warnings", "--no-playlist"])
            .arg(watch_url(video_id))
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VidbriefError::ToolNotFound("yt-dlp".to_string())
                } else {
                    VidbriefError::VideoSource(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            return Err(VidbriefError::VideoSource(format!(
                "Video {} unavailable: {}",
                video_id,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).map_err(|e| {
            VidbriefError::VideoSource(format!("Failed to parse yt-dlp output: {}", e))
        })?;

        let metadata = Self::parse(video_id, &json);
        debug!(title = %metadata.title, "Fetched metadata");
        Ok(metadata)
    }
}
