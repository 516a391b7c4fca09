//! Configuration module for vidbrief.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{BreakdownPrompts, Prompts, ProsePrompts, SummaryPrompts, ThemePrompts};
pub use settings::{
    AnalysisSettings, GeneralSettings, LlmProvider, LlmSettings, OutputSettings, Settings,
    TranscriptionSettings, WordCountRule, WordRange,
};
