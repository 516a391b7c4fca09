//! Audio download and processing utilities.

mod downloader;

pub use downloader::{download_audio, split_audio};

use crate::error::Result;
use crate::youtube::watch_url;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Fetches the audio track of a video into a local file.
#[async_trait]
pub trait AudioDownloader: Send + Sync {
    /// Download the audio for `video_id` into `output_dir`, returning its path.
    async fn download(&self, video_id: &str, output_dir: &Path) -> Result<PathBuf>;
}

/// Downloads audio with yt-dlp.
pub struct YtDlpAudio;

#[async_trait]
impl AudioDownloader for YtDlpAudio {
    async fn download(&self, video_id: &str, output_dir: &Path) -> Result<PathBuf> {
        download_audio(&watch_url(video_id), video_id, output_dir).await
    }
}
