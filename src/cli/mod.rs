//! CLI module for vidbrief.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::config::{LlmProvider, Settings};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// vidbrief - YouTube video summaries from captions or Whisper transcripts
///
/// Run with a URL to analyze one video, or without arguments for an
/// interactive session.
#[derive(Parser, Debug)]
#[command(name = "vidbrief")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// YouTube URL or video ID to analyze
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Configuration file in use: `--config` or the default location.
    pub fn config_path(&self) -> PathBuf {
        match &self.config {
            Some(path) => Settings::expand_path(path),
            None => Settings::default_config_path(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a single video
    Analyze {
        /// YouTube URL or video ID
        url: String,

        #[command(flatten)]
        options: AnalyzeOptions,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Per-run overrides of the configuration.
#[derive(Args, Debug, Default, Clone)]
pub struct AnalyzeOptions {
    /// LLM provider (ollama, groq, openai)
    #[arg(short, long)]
    pub provider: Option<LlmProvider>,

    /// Model name for the selected provider
    #[arg(short, long)]
    pub model: Option<String>,

    /// Only use captions, never transcribe audio
    #[arg(long)]
    pub no_whisper: bool,

    /// Don't write the JSON report
    #[arg(long)]
    pub no_save: bool,

    /// Directory for the JSON report
    #[arg(short, long)]
    pub output_dir: Option<String>,
}

impl AnalyzeOptions {
    /// Apply the overrides to `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(provider) = self.provider {
            settings.llm.provider = provider;
        }
        if let Some(model) = &self.model {
            settings.llm.set_model(model);
        }
        if self.no_whisper {
            settings.transcription.whisper_fallback = false;
        }
        if self.no_save {
            settings.output.save_json = false;
        }
        if let Some(dir) = &self.output_dir {
            settings.output.output_dir = dir.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Open configuration file in editor
    Edit,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
