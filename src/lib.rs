//! vidbrief - YouTube video analysis
//!
//! Turns a YouTube video into a structured brief: a summary sized to the
//! video's length, key timestamps, main themes and a content breakdown.
//!
//! # Overview
//!
//! Transcripts come from the video's captions when it has them. Otherwise
//! the audio is downloaded and transcribed with OpenAI Whisper. The analysis
//! itself is done by an LLM: a local Ollama model, Groq, or OpenAI.
//!
//! # Architecture
//!
//! - `config` - Configuration and prompt templates
//! - `youtube` - Video IDs, metadata and caption tracks via yt-dlp
//! - `audio` - Audio download and splitting
//! - `transcription` - Caption-first transcript acquisition with Whisper fallback
//! - `llm` - LLM provider clients
//! - `analysis` - Summary, timestamps, themes and content breakdown
//! - `orchestrator` - Pipeline coordination
//! - `report` - Text report and JSON export
//!
//! # Example
//!
//! ```rust,no_run
//! use vidbrief::config::Settings;
//! use vidbrief::orchestrator::Orchestrator;
//! use vidbrief::report::format_analysis;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let analysis = orchestrator
//!         .analyze_video("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
//!         .await?;
//!     println!("{}", format_analysis(&analysis));
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod report;
pub mod transcription;
pub mod youtube;

pub use error::{Result, VidbriefError};
