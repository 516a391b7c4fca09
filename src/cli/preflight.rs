//! Pre-flight checks before an analysis.
//!
//! Validates that required tools and configuration are available
//! before starting work that would otherwise fail midway.

use crate::config::{LlmProvider, Settings};
use crate::error::{Result, VidbriefError};
use std::process::Command;

/// External tools the configured pipeline needs.
///
/// ffmpeg and ffprobe only matter when the Whisper fallback will actually run.
pub fn required_tools(settings: &Settings) -> Vec<&'static str> {
    let mut tools = vec!["yt-dlp"];
    if settings.whisper_usable() {
        tools.extend(["ffmpeg", "ffprobe"]);
    }
    tools
}

/// Run pre-flight checks for an analysis with `settings`.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(settings: &Settings) -> Result<()> {
    for tool in required_tools(settings) {
        check_tool(tool)?;
    }
    check_api_key(settings)
}

/// Hosted providers need a key from the config file or the environment.
fn check_api_key(settings: &Settings) -> Result<()> {
    if settings.llm.provider == LlmProvider::Ollama || settings.llm.resolve_api_key().is_some() {
        return Ok(());
    }
    let var = settings.llm.provider.api_key_env().unwrap_or("API_KEY");
    Err(VidbriefError::Config(format!(
        "{} not set. Set it with: export {}='...' or llm.api_key in the config file",
        var, var
    )))
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(VidbriefError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VidbriefError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(VidbriefError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
