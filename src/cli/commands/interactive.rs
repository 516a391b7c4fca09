//! Interactive session: analyze videos until the user quits.

use super::analyze::analyze_and_report;
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::youtube::is_youtube_url;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

const EXAMPLE_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

const LIKELY_CAUSES: [&str; 5] = [
    "Video doesn't have captions and Whisper is unavailable",
    "Video is private, age-restricted, or unavailable",
    "Invalid URL format",
    "Network connection issues",
    "Ollama service not running (if using Ollama)",
];

fn is_quit(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q")
}

/// "Analyze another video?" treats an empty answer as yes.
fn wants_another(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "yes" | "y" | "")
}

/// "Try another URL?" treats an empty answer as no.
fn wants_retry(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "yes" | "y")
}

/// Print `msg` and read one trimmed line. `None` at end of input.
fn prompt(input: &mut impl BufRead, msg: &str) -> io::Result<Option<String>> {
    print!("{} ", style(msg).bold());
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Run the interactive loop.
pub async fn run_interactive(settings: Settings) -> Result<()> {
    Output::banner();

    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vidbrief doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    Output::info("Initializing...");
    let orchestrator = Orchestrator::new(settings.clone())?;
    if !orchestrator.has_whisper_fallback() {
        Output::warning("Whisper fallback is off: only videos with captions can be analyzed.");
    }
    Output::success("Ready!\n");

    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        let Some(url) = prompt(&mut input, "Enter YouTube URL (or 'quit' to exit):")? else {
            break;
        };

        if is_quit(&url) {
            break;
        }

        if !is_youtube_url(&url) {
            Output::error("Invalid URL. Please provide a valid YouTube URL.");
            println!("   Example: {}\n", EXAMPLE_URL);
            continue;
        }

        println!();
        match analyze_and_report(&orchestrator, &url, &settings).await {
            Ok(_) => {
                println!("\n{}", "-".repeat(80));
                let answer = prompt(&mut input, "\nAnalyze another video? (yes/no):")?;
                if !answer.as_deref().is_some_and(wants_another) {
                    break;
                }
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
                println!("\nPossible reasons:");
                for cause in LIKELY_CAUSES {
                    Output::list_item(cause);
                }
                println!();

                let answer = prompt(&mut input, "Try another URL? (yes/no):")?;
                if !answer.as_deref().is_some_and(wants_retry) {
                    break;
                }
            }
        }
        println!();
    }

    Output::info("Thanks for using vidbrief!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_words() {
        assert!(is_quit("quit"));
        assert!(is_quit("EXIT"));
        assert!(is_quit("q"));
        assert!(!is_quit("https://youtu.be/dQw4w9WgXcQ"));
    }

    #[test]
    fn test_continue_answers() {
        assert!(wants_another(""));
        assert!(wants_another("Y"));
        assert!(wants_another("yes"));
        assert!(!wants_another("no"));

        assert!(!wants_retry(""));
        assert!(wants_retry("y"));
        assert!(!wants_retry("n"));
    }

    #[test]
    fn test_prompt_reads_lines() {
        let mut input = io::Cursor::new("  first  \nsecond\n");
        assert_eq!(prompt(&mut input, ">").unwrap().as_deref(), Some("first"));
        assert_eq!(prompt(&mut input, ">").unwrap().as_deref(), Some("second"));
        assert_eq!(prompt(&mut input, ">").unwrap(), None);
    }
}
