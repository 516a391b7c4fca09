//! Pipeline orchestrator for vidbrief.
//!
//! Coordinates the process from a YouTube URL to a finished analysis:
//! metadata, transcript (captions or Whisper), then the LLM analysis steps.

use crate::analysis::{Analyzer, VideoAnalysis};
use crate::audio::YtDlpAudio;
use crate::config::{Prompts, Settings};
use crate::error::{Result, VidbriefError};
use crate::llm::{create_llm_client, LlmClient};
use crate::transcription::{AudioFallback, FallbackTranscriber, Transcript, TranscriptFetcher, WhisperTranscriber};
use crate::youtube::{extract_video_id, CaptionSource, MetadataSource, VideoMetadata, YtDlpCaptions, YtDlpMetadata};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main orchestrator for the analysis pipeline.
pub struct Orchestrator {
    metadata: Arc<dyn MetadataSource>,
    transcripts: TranscriptFetcher,
    analyzer: Analyzer,
}

impl Orchestrator {
    /// Create an orchestrator backed by yt-dlp, Whisper and the configured LLM.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.general.prompts_dir.as_deref())?;
        let llm = create_llm_client(&settings.llm)?;

        let temp_dir = settings.temp_dir();
        std::fs::create_dir_all(&temp_dir)?;

        let captions: Arc<dyn CaptionSource> = Arc::new(YtDlpCaptions::new(
            settings.transcription.caption_languages.clone(),
            temp_dir.clone(),
        ));

        let fallback: Option<Arc<dyn FallbackTranscriber>> = if !settings.transcription.whisper_fallback {
            info!("Whisper fallback disabled");
            None
        } else if let Some(key) = settings.whisper_api_key() {
            let whisper = WhisperTranscriber::new(
                &key,
                &settings.transcription.whisper_model,
                settings.transcription.chunk_duration_seconds,
            )?;
            Some(Arc::new(AudioFallback::new(
                Arc::new(YtDlpAudio),
                Arc::new(whisper),
                temp_dir,
            )))
        } else {
            warn!("OPENAI_API_KEY not set, Whisper fallback unavailable");
            eprintln!("  Warning: OPENAI_API_KEY not set, only videos with captions can be analyzed.");
            None
        };

        Ok(Self::with_components(
            Arc::new(YtDlpMetadata::new()),
            captions,
            fallback,
            llm,
            &settings,
        )
        .with_prompts(prompts))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        metadata: Arc<dyn MetadataSource>,
        captions: Arc<dyn CaptionSource>,
        fallback: Option<Arc<dyn FallbackTranscriber>>,
        llm: Arc<dyn LlmClient>,
        settings: &Settings,
    ) -> Self {
        Self {
            metadata,
            transcripts: TranscriptFetcher::new(captions, fallback),
            analyzer: Analyzer::new(llm, settings.analysis.clone()),
        }
    }

    /// Use custom prompt templates for the analysis steps.
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.analyzer = self.analyzer.with_prompts(prompts);
        self
    }

    pub fn has_whisper_fallback(&self) -> bool {
        self.transcripts.has_fallback()
    }

    /// Analyze a video from its URL or bare ID.
    #[instrument(skip(self))]
    pub async fn analyze_video(&self, url: &str) -> Result<VideoAnalysis> {
        let video_id = extract_video_id(url)
            .ok_or_else(|| VidbriefError::InvalidInput(format!("Could not extract a video ID from: {}", url)))?;
        eprintln!("  Video ID: {}", video_id);

        let metadata = match self.metadata.fetch_metadata(&video_id).await {
            Ok(m) => m,
            Err(e) => {
                warn!("Metadata unavailable, continuing without it: {}", e);
                VideoMetadata::unknown(&video_id)
            }
        };
        eprintln!("  Title: {}", metadata.title);

        eprintln!("  Fetching transcript...");
        let transcript = self.transcripts.fetch(&video_id).await?;
        eprintln!(
            "  Transcript obtained from {} ({} entries)",
            transcript.source,
            transcript.entries.len()
        );

        let transcript_text = transcript.format_with_timestamps();
        let minutes = transcript.duration_minutes();
        let target = self.analyzer.target_word_count(minutes);
        eprintln!("  Video duration: {:.1} minutes", minutes);
        eprintln!("  Target summary length: {} words", target);

        eprintln!("  Creating summary...");
        let summary = self.analyzer.generate_summary(&transcript_text, target).await?;

        eprintln!("  Extracting key timestamps...");
        let key_timestamps = self.analyzer.extract_timestamps(&transcript_text);

        eprintln!("  Identifying themes...");
        let themes = self.analyzer.identify_themes(&transcript_text).await?;

        eprintln!("  Creating content breakdown...");
        let content_breakdown = self.analyzer.create_content_breakdown(&transcript_text).await;

        info!(video_id = %video_id, "Analysis complete");

        Ok(VideoAnalysis {
            duration: display_duration(&metadata, &transcript),
            video_id,
            title: metadata.title,
            transcript_source: transcript.source,
            target_word_count: target,
            summary,
            key_timestamps,
            themes,
            content_breakdown,
        })
    }
}

/// Metadata minutes when known, else the transcript-derived length.
fn display_duration(metadata: &VideoMetadata, transcript: &Transcript) -> String {
    if let Some(minutes) = metadata.duration_minutes() {
        return format!("{} minutes", minutes);
    }
    let minutes = transcript.duration_minutes();
    if minutes > 0.0 {
        format!("{:.1} minutes", minutes)
    } else {
        "Unknown".to_string()
    }
}
