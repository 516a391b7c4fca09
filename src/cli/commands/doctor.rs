//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{LlmProvider, Settings};
use console::style;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    /// Downgrade an error to a warning for optional components.
    fn optional(mut self) -> Self {
        if self.status == CheckStatus::Error {
            self.status = CheckStatus::Warning;
        }
        self
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("vidbrief Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    // ffmpeg and ffprobe only matter for the Whisper fallback.
    let whisper = settings.transcription.whisper_fallback;
    let needs_ffmpeg = settings.whisper_usable();
    let ffmpeg = check_tool("ffmpeg", "ffmpeg -version", install_hint_ffmpeg());
    let ffprobe = check_tool("ffprobe", "ffprobe -version", install_hint_ffmpeg());
    let tools = vec![
        check_tool("yt-dlp", "yt-dlp --version", install_hint_ytdlp()),
        if needs_ffmpeg { ffmpeg } else { ffmpeg.optional() },
        if needs_ffmpeg { ffprobe } else { ffprobe.optional() },
    ];
    print_section("External Tools", &tools);
    checks.extend(tools);

    let mut llm = vec![check_llm_key(settings)];
    if settings.llm.provider == LlmProvider::Ollama {
        llm.push(check_ollama(settings).await);
    }
    llm.push(check_whisper_key(whisper, settings.whisper_api_key()));
    print_section(&format!("LLM ({}, {})", settings.llm.provider, settings.llm.model()), &llm);
    checks.extend(llm);

    let config = vec![check_config_file(config_path), check_output_dir(settings)];
    print_section("Configuration", &config);
    checks.extend(config);

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using vidbrief.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! vidbrief is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, version_cmd: &str, hint: &str) -> CheckResult {
    let mut parts = version_cmd.split_whitespace();
    let cmd = parts.next().unwrap_or(name);

    match Command::new(cmd).args(parts).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            let version_display = if version.chars().count() > 50 {
                format!("{}...", version.chars().take(50).collect::<String>())
            } else {
                version
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Check the API key of the configured LLM provider.
fn check_llm_key(settings: &Settings) -> CheckResult {
    let Some(var) = settings.llm.provider.api_key_env() else {
        return CheckResult::ok("API key", "not needed for a local model");
    };

    match settings.llm.resolve_api_key() {
        Some(key) => CheckResult::ok(var, &format!("configured ({})", mask_key(&key))),
        None => CheckResult::error(
            var,
            "not set",
            &format!("Set with: export {}='...' (or llm.api_key in the config file)", var),
        ),
    }
}

/// Whisper runs through the OpenAI audio API.
fn check_whisper_key(whisper_enabled: bool, key: Option<String>) -> CheckResult {
    let name = "Whisper (OPENAI_API_KEY)";
    if !whisper_enabled {
        return CheckResult::ok(name, "fallback disabled");
    }
    match key {
        Some(key) => CheckResult::ok(name, &format!("configured ({})", mask_key(&key))),
        None => CheckResult::warning(
            name,
            "not set, videos without captions can't be analyzed",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Base URL of the Ollama server from its generate endpoint.
fn ollama_base(url: &str) -> &str {
    url.split("/api/").next().unwrap_or(url).trim_end_matches('/')
}

async fn check_ollama(settings: &Settings) -> CheckResult {
    let base = ollama_base(&settings.llm.ollama_url);
    let spinner = Output::spinner(&format!("Contacting Ollama at {}...", base));

    let client = match reqwest::Client::builder().timeout(Duration::from_secs(5)).build() {
        Ok(c) => c,
        Err(e) => {
            spinner.finish_and_clear();
            return CheckResult::error("Ollama", &format!("error: {}", e), "Check your TLS setup");
        }
    };
    let result = client.get(format!("{}/api/tags", base)).send().await;
    spinner.finish_and_clear();

    match result {
        Ok(response) if response.status().is_success() => {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let wanted = settings.llm.ollama_model.as_str();
            let installed = body["models"]
                .as_array()
                .is_some_and(|models| models.iter().any(|m| m["name"].as_str() == Some(wanted)));

            if installed {
                CheckResult::ok("Ollama", &format!("running, {} available", wanted))
            } else {
                CheckResult::warning(
                    "Ollama",
                    &format!("running, but {} not found", wanted),
                    &format!("Pull it with: ollama pull {}", wanted),
                )
            }
        }
        Ok(response) => CheckResult::error(
            "Ollama",
            &format!("responded with {}", response.status()),
            "Check llm.ollama_url in the config file",
        ),
        Err(_) => CheckResult::error(
            "Ollama",
            &format!("not reachable at {}", base),
            "Start it with: ollama serve",
        ),
    }
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: vidbrief config init",
        )
    }
}

fn check_output_dir(settings: &Settings) -> CheckResult {
    let dir = settings.output_dir();
    if !settings.output.save_json {
        CheckResult::ok("Output directory", "JSON reports disabled")
    } else if dir.is_dir() {
        CheckResult::ok("Output directory", &format!("{}", dir.display()))
    } else {
        CheckResult::warning(
            "Output directory",
            &format!("{} (will be created)", dir.display()),
            "Directory will be created on first save",
        )
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
        assert_eq!(result.optional().status, CheckStatus::Warning);
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("sk-abcdefghijklmnop1234"), "sk-abcd...1234");
        assert_eq!(mask_key("short"), "****");
    }

    #[test]
    fn test_ollama_base() {
        assert_eq!(ollama_base("http://localhost:11434/api/generate"), "http://localhost:11434");
        assert_eq!(ollama_base("http://gpu-box:11434/"), "http://gpu-box:11434");
    }

    #[test]
    fn test_missing_tool_is_error() {
        let result = check_tool("vidbrief-no-such-tool", "vidbrief-no-such-tool --version", "install it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.message, "not found");
    }

    #[test]
    fn test_whisper_key_check() {
        let configured = check_whisper_key(true, Some("sk-abcdefghijklmnop1234".to_string()));
        assert_eq!(configured.status, CheckStatus::Ok);
        assert_eq!(configured.message, "configured (sk-abcd...1234)");

        assert_eq!(check_whisper_key(true, None).status, CheckStatus::Warning);
        assert_eq!(check_whisper_key(false, None).status, CheckStatus::Ok);
    }

    #[test]
    fn test_local_provider_needs_no_key() {
        assert_eq!(check_llm_key(&Settings::default()).status, CheckStatus::Ok);
    }
}
