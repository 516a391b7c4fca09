//! Transcript acquisition.
//!
//! Captions are tried first. When a video has none, a fallback transcriber
//! (Whisper over the downloaded audio) is tried once.

mod models;
mod whisper;

pub use models::{format_timestamp, Transcript, TranscriptEntry, TranscriptSource};
pub use whisper::{AudioFallback, WhisperTranscriber};

use crate::error::{Result, VidbriefError};
use crate::youtube::CaptionSource;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Trait for speech-to-text services working on local audio files.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file and return entries with timestamps.
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;
}

/// Produces a transcript for a video without using its captions.
#[async_trait]
pub trait FallbackTranscriber: Send + Sync {
    async fn transcribe_video(&self, video_id: &str) -> Result<Transcript>;
}

/// Fetches a transcript from captions, falling back to audio transcription.
pub struct TranscriptFetcher {
    captions: Arc<dyn CaptionSource>,
    fallback: Option<Arc<dyn FallbackTranscriber>>,
}

impl TranscriptFetcher {
    pub fn new(
        captions: Arc<dyn CaptionSource>,
        fallback: Option<Arc<dyn FallbackTranscriber>>,
    ) -> Self {
        Self { captions, fallback }
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Fetch the transcript for `video_id`.
    ///
    /// The fallback runs at most once, and only after captions fail. An
    /// empty caption track counts as a failure.
    #[instrument(skip(self))]
    pub async fn fetch(&self, video_id: &str) -> Result<Transcript> {
        let caption_err = match self.captions.fetch_captions(video_id).await {
            Ok(transcript) if !transcript.is_empty() => {
                info!("Using captions ({} entries)", transcript.entries.len());
                return Ok(transcript);
            }
            Ok(_) => VidbriefError::MissingCaptions(format!("video {} has an empty caption track", video_id)),
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            return Err(caption_err);
        };

        warn!("Captions unavailable ({}), falling back to Whisper", caption_err);
        eprintln!("  No captions available, transcribing audio instead...");

        match fallback.transcribe_video(video_id).await {
            Ok(transcript) if !transcript.is_empty() => {
                info!("Using Whisper transcript ({} entries)", transcript.entries.len());
                Ok(transcript)
            }
            Ok(_) => Err(VidbriefError::BothTranscriptsFailed {
                caption: caption_err.to_string(),
                fallback: "transcription produced no text".to_string(),
            }),
            Err(e) => Err(VidbriefError::BothTranscriptsFailed {
                caption: caption_err.to_string(),
                fallback: e.to_string(),
            }),
        }
    }
}
