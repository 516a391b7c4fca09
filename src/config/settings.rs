//! Configuration settings for vidbrief.

use crate::error::{Result, VidbriefError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub analysis: AnalysisSettings,
    pub transcription: TranscriptionSettings,
    pub output: OutputSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for downloaded audio and subtitle files.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Directory with prompt overrides (summary.toml, themes.toml, ...).
    pub prompts_dir: Option<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/vidbrief".to_string(),
            log_level: "warn".to_string(),
            prompts_dir: None,
        }
    }
}

/// LLM backend used to analyze transcripts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Local Ollama server.
    #[default]
    Ollama,
    /// Groq's hosted OpenAI-compatible API.
    Groq,
    /// OpenAI chat completions.
    OpenAI,
}

impl LlmProvider {
    /// Environment variable consulted when no API key is configured.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            LlmProvider::Groq => Some("GROQ_API_KEY"),
            LlmProvider::OpenAI => Some("OPENAI_API_KEY"),
            LlmProvider::Ollama => None,
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "groq" => Ok(LlmProvider::Groq),
            "openai" => Ok(LlmProvider::OpenAI),
            _ => Err(format!("Unsupported LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::Ollama => write!(f, "ollama"),
            LlmProvider::Groq => write!(f, "groq"),
            LlmProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// LLM provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Which backend to call (ollama, groq, openai).
    pub provider: LlmProvider,
    /// API key for hosted providers. Falls back to GROQ_API_KEY / OPENAI_API_KEY.
    pub api_key: Option<String>,
    pub groq_model: String,
    pub openai_model: String,
    pub ollama_model: String,
    /// Ollama generate endpoint.
    pub ollama_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// HTTP timeout for a single completion request.
    pub timeout_seconds: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Ollama,
            api_key: None,
            groq_model: "llama-3.1-70b".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            ollama_model: "llama3.1:8b".to_string(),
            ollama_url: "http://localhost:11434/api/generate".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            timeout_seconds: 60,
        }
    }
}

impl LlmSettings {
    /// Model name for the configured provider.
    pub fn model(&self) -> &str {
        match self.provider {
            LlmProvider::Ollama => &self.ollama_model,
            LlmProvider::Groq => &self.groq_model,
            LlmProvider::OpenAI => &self.openai_model,
        }
    }

    /// Override the model for the configured provider.
    pub fn set_model(&mut self, model: &str) {
        let slot = match self.provider {
            LlmProvider::Ollama => &mut self.ollama_model,
            LlmProvider::Groq => &mut self.groq_model,
            LlmProvider::OpenAI => &mut self.openai_model,
        };
        *slot = model.to_string();
    }

    /// Resolve the API key from settings or the provider's environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Some(key.clone());
        }
        self.provider
            .api_key_env()
            .and_then(|var| std::env::var(var).ok())
            .filter(|k| !k.is_empty())
    }
}

/// A summary length target such as "100-150" words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WordRange {
    pub min: u32,
    pub max: u32,
}

impl WordRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

impl std::str::FromStr for WordRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (min, max) = s
            .split_once('-')
            .ok_or_else(|| format!("Word range must look like \"200-300\", got: {}", s))?;
        let min: u32 = min
            .trim()
            .parse()
            .map_err(|_| format!("Invalid word range minimum in: {}", s))?;
        let max: u32 = max
            .trim()
            .parse()
            .map_err(|_| format!("Invalid word range maximum in: {}", s))?;
        if min > max {
            return Err(format!("Word range minimum exceeds maximum: {}", s));
        }
        Ok(Self { min, max })
    }
}

impl TryFrom<String> for WordRange {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WordRange> for String {
    fn from(range: WordRange) -> Self {
        range.to_string()
    }
}

impl std::fmt::Display for WordRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// One row of the duration-to-length table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordCountRule {
    /// Videos up to this many minutes use `words`.
    pub max_minutes: f64,
    pub words: WordRange,
}

impl WordCountRule {
    pub fn new(max_minutes: f64, words: WordRange) -> Self {
        Self { max_minutes, words }
    }
}

/// Transcript analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Transcript characters sent to the summary and theme prompts.
    pub max_transcript_length: usize,
    /// Summary length when dynamic selection is off or no rule matches.
    pub summary_word_count: WordRange,
    /// Pick the summary length from `word_count_rules` by video duration.
    pub dynamic_word_count: bool,
    /// How many themes to ask for, as shown to the model.
    pub num_themes: String,
    /// Summaries longer than `max * trim_threshold` words get trimmed.
    pub trim_threshold: f64,
    /// Share of trimmed text a sentence-boundary cut must keep.
    pub min_retention: f64,
    /// Duration thresholds in minutes, checked smallest first.
    pub word_count_rules: Vec<WordCountRule>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_transcript_length: 15000,
            summary_word_count: WordRange::new(300, 400),
            dynamic_word_count: true,
            word_count_rules: vec![
                WordCountRule::new(5.0, WordRange::new(100, 150)),
                WordCountRule::new(10.0, WordRange::new(200, 300)),
                WordCountRule::new(20.0, WordRange::new(300, 400)),
                WordCountRule::new(40.0, WordRange::new(400, 500)),
                WordCountRule::new(999.0, WordRange::new(500, 600)),
            ],
            num_themes: "3-5".to_string(),
            trim_threshold: 1.3,
            min_retention: 0.7,
        }
    }
}

/// Transcript acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Transcribe the audio with Whisper when a video has no captions.
    pub whisper_fallback: bool,
    /// Whisper model used by the OpenAI audio API.
    pub whisper_model: String,
    /// Audio is split into pieces of this length before upload.
    pub chunk_duration_seconds: u32,
    /// Caption languages in order of preference (yt-dlp syntax, regex allowed).
    pub caption_languages: Vec<String>,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            whisper_fallback: true,
            whisper_model: "whisper-1".to_string(),
            chunk_duration_seconds: 600,
            caption_languages: vec!["en".to_string(), "en-US".to_string(), "en.*".to_string()],
        }
    }
}

/// Result export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Write each analysis to a JSON file.
    pub save_json: bool,
    pub output_dir: String,
    /// File name; `{timestamp}` is replaced with the local time.
    pub filename_pattern: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            save_json: true,
            output_dir: ".".to_string(),
            filename_pattern: "analysis_{timestamp}.json".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VidbriefError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vidbrief")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.output.output_dir)
    }

    /// OpenAI key for Whisper: the LLM key when the provider is OpenAI,
    /// otherwise `OPENAI_API_KEY`.
    pub fn whisper_api_key(&self) -> Option<String> {
        if self.llm.provider == LlmProvider::OpenAI {
            if let Some(key) = self.llm.resolve_api_key() {
                return Some(key);
            }
        }
        std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())
    }

    /// Whether the Whisper fallback is enabled and has a key to run with.
    pub fn whisper_usable(&self) -> bool {
        self.transcription.whisper_fallback && self.whisper_api_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_range_parse() {
        let range: WordRange = "100-150".parse().unwrap();
        assert_eq!(range, WordRange::new(100, 150));
        assert_eq!(range.to_string(), "100-150");

        assert!("150".parse::<WordRange>().is_err());
        assert!("abc-def".parse::<WordRange>().is_err());
        assert!("300-200".parse::<WordRange>().is_err());
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Groq".parse::<LlmProvider>().unwrap(), LlmProvider::Groq);
        assert_eq!("ollama".parse::<LlmProvider>().unwrap(), LlmProvider::Ollama);
        assert!("google".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
            [llm]
            provider = "groq"
            temperature = 0.3

            [analysis]
            summary_word_count = "250-350"

            [[analysis.word_count_rules]]
            max_minutes = 15.0
            words = "150-200"
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.llm.provider, LlmProvider::Groq);
        assert_eq!(settings.llm.model(), "llama-3.1-70b");
        assert_eq!(settings.analysis.summary_word_count, WordRange::new(250, 350));
        assert_eq!(settings.analysis.word_count_rules.len(), 1);
        assert_eq!(settings.analysis.max_transcript_length, 15000);
        assert!(settings.transcription.whisper_fallback);
    }

    #[test]
    fn test_invalid_word_range_rejected() {
        let toml_str = r#"
            [analysis]
            summary_word_count = "many"
        "#;
        assert!(toml::from_str::<Settings>(toml_str).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.llm.provider = LlmProvider::OpenAI;
        settings.llm.set_model("gpt-4.1");
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.llm.provider, LlmProvider::OpenAI);
        assert_eq!(loaded.llm.model(), "gpt-4.1");
        assert_eq!(loaded.analysis.word_count_rules.len(), 5);
    }

    #[test]
    fn test_configured_api_key_wins() {
        let mut llm = LlmSettings::default();
        llm.provider = LlmProvider::Groq;
        llm.api_key = Some("gsk-test".to_string());
        assert_eq!(llm.resolve_api_key().as_deref(), Some("gsk-test"));

        llm.provider = LlmProvider::Ollama;
        llm.api_key = None;
        assert_eq!(llm.resolve_api_key(), None);
    }

    #[test]
    fn test_whisper_uses_configured_openai_key() {
        let mut settings = Settings::default();
        settings.llm.provider = LlmProvider::OpenAI;
        settings.llm.api_key = Some("sk-from-config".to_string());
        assert_eq!(settings.whisper_api_key().as_deref(), Some("sk-from-config"));
        assert!(settings.whisper_usable());

        settings.transcription.whisper_fallback = false;
        assert!(!settings.whisper_usable());
    }
}
