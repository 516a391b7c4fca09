//! Error types for vidbrief.

use thiserror::Error;

/// Library-level error type for vidbrief operations.
#[derive(Error, Debug)]
pub enum VidbriefError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Video source error: {0}")]
    VideoSource(String),

    #[error("No captions available: {0}")]
    MissingCaptions(String),

    #[error("Audio download failed: {0}")]
    AudioDownload(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Both caption and Whisper transcription failed.\nCaption error: {caption}\nWhisper error: {fallback}")]
    BothTranscriptsFailed { caption: String, fallback: String },

    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for vidbrief operations.
pub type Result<T> = std::result::Result<T, VidbriefError>;
