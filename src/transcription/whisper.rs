//! OpenAI Whisper transcription over downloaded audio.

use super::{FallbackTranscriber, Transcriber, Transcript, TranscriptEntry, TranscriptSource};
use crate::audio::{split_audio, AudioDownloader};
use crate::error::{Result, VidbriefError};
use crate::openai::create_client;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Upload timeout for a single audio piece.
const UPLOAD_TIMEOUT_SECS: u64 = 300;

/// Whisper transcriber backed by the OpenAI audio API.
pub struct WhisperTranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    chunk_duration_seconds: u32,
}

impl WhisperTranscriber {
    pub fn new(api_key: &str, model: &str, chunk_duration_seconds: u32) -> Result<Self> {
        Ok(Self {
            client: create_client(Some(api_key), None, Duration::from_secs(UPLOAD_TIMEOUT_SECS))?,
            model: model.to_string(),
            chunk_duration_seconds,
        })
    }

    /// Transcribe one audio file that fits in a single upload.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_piece(&self, audio_path: &Path) -> Result<Vec<TranscriptEntry>> {
        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3")
            .to_string();

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(file_name, bytes))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson)
            .build()
            .map_err(|e| VidbriefError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| VidbriefError::Transcription(format!("Whisper API error: {}", e)))?;

        let entries = match response.segments {
            Some(segments) => segments
                .iter()
                .map(|s| {
                    let start = f64::from(s.start);
                    TranscriptEntry::new(s.text.trim(), start, f64::from(s.end) - start)
                })
                .filter(|e| !e.text.is_empty())
                .collect(),
            None => vec![TranscriptEntry::new(
                response.text.trim(),
                0.0,
                f64::from(response.duration),
            )],
        };

        debug!("Whisper returned {} segments", entries.len());
        Ok(entries)
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        let video_id = audio_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        let pieces_dir = tempfile::tempdir()?;
        let pieces = split_audio(audio_path, pieces_dir.path(), self.chunk_duration_seconds).await?;

        let pb = ProgressBar::new(pieces.len() as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("  {spinner:.green} Whisper [{bar:30.cyan/blue}] {pos}/{len}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }

        let mut entries = Vec::new();
        for (idx, (piece, offset)) in pieces.iter().enumerate() {
            let piece_entries = match self.transcribe_piece(piece).await {
                Ok(e) => e,
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(VidbriefError::Transcription(format!(
                        "Piece {} at {:.0}s failed: {}",
                        idx, offset, e
                    )));
                }
            };
            entries.extend(piece_entries.into_iter().map(|mut e| {
                e.start += offset;
                e
            }));
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!("Whisper transcription produced {} entries", entries.len());
        Ok(Transcript::new(video_id, TranscriptSource::Whisper, entries))
    }
}

/// Transcribes a video by downloading its audio and running a [`Transcriber`].
///
/// The downloaded file is removed whether or not transcription succeeds.
pub struct AudioFallback {
    downloader: Arc<dyn AudioDownloader>,
    transcriber: Arc<dyn Transcriber>,
    temp_dir: PathBuf,
}

impl AudioFallback {
    pub fn new(downloader: Arc<dyn AudioDownloader>, transcriber: Arc<dyn Transcriber>, temp_dir: PathBuf) -> Self {
        Self {
            downloader,
            transcriber,
            temp_dir,
        }
    }
}

#[async_trait]
impl FallbackTranscriber for AudioFallback {
    #[instrument(skip(self))]
    async fn transcribe_video(&self, video_id: &str) -> Result<Transcript> {
        eprintln!("  Downloading audio...");
        let audio_path = self.downloader.download(video_id, &self.temp_dir).await?;

        eprintln!("  Transcribing audio with Whisper (this can take a few minutes)...");
        let result = self.transcriber.transcribe(&audio_path).await;

        if let Err(e) = std::fs::remove_file(&audio_path) {
            warn!("Failed to remove temporary audio file: {}", e);
        }

        let mut transcript = result?;
        transcript.video_id = video_id.to_string();
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Writes a placeholder audio file and remembers where.
    struct FakeDownload {
        path: Mutex<Option<PathBuf>>,
    }

    impl FakeDownload {
        fn new() -> Self {
            Self { path: Mutex::new(None) }
        }

        fn written(&self) -> PathBuf {
            self.path.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait]
    impl AudioDownloader for FakeDownload {
        async fn download(&self, video_id: &str, output_dir: &Path) -> Result<PathBuf> {
            let path = output_dir.join(format!("{}.mp3", video_id));
            std::fs::write(&path, b"ID3")?;
            *self.path.lock().unwrap() = Some(path.clone());
            Ok(path)
        }
    }

    struct FixedTranscriber {
        succeed: bool,
    }

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
            assert!(audio_path.exists());
            if self.succeed {
                Ok(Transcript::new(
                    "from-file-stem",
                    TranscriptSource::Whisper,
                    vec![TranscriptEntry::new("spoken words", 0.0, 4.0)],
                ))
            } else {
                Err(VidbriefError::Transcription("upload rejected".to_string()))
            }
        }
    }

    fn fallback(download: Arc<FakeDownload>, succeed: bool, dir: &Path) -> AudioFallback {
        AudioFallback::new(download, Arc::new(FixedTranscriber { succeed }), dir.to_path_buf())
    }

    #[tokio::test]
    async fn test_audio_removed_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let download = Arc::new(FakeDownload::new());

        let transcript = fallback(download.clone(), true, dir.path())
            .transcribe_video("abc123def45")
            .await
            .unwrap();

        assert_eq!(transcript.video_id, "abc123def45");
        assert_eq!(transcript.source, TranscriptSource::Whisper);
        assert!(!download.written().exists());
    }

    #[tokio::test]
    async fn test_audio_removed_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let download = Arc::new(FakeDownload::new());

        let err = fallback(download.clone(), false, dir.path())
            .transcribe_video("abc123def45")
            .await
            .unwrap_err();

        assert!(matches!(err, VidbriefError::Transcription(_)));
        assert!(!download.written().exists());
    }
}
