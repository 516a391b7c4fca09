//! vidbrief CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vidbrief::cli::{commands, AnalyzeOptions, Cli, Commands};
use vidbrief::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config_path();
    let settings = Settings::load_from(Some(&config_path))?;

    // Initialize logging: -v flags win over the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("vidbrief={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match (&cli.command, &cli.url) {
        (Some(Commands::Analyze { url, options }), _) => {
            commands::run_analyze(url, options, settings).await?;
        }

        (Some(Commands::Doctor), _) => {
            commands::run_doctor(&settings, &config_path).await?;
        }

        (Some(Commands::Config { action }), _) => {
            commands::run_config(action, settings, &config_path)?;
        }

        (None, Some(url)) => {
            commands::run_analyze(url, &AnalyzeOptions::default(), settings).await?;
        }

        (None, None) => {
            commands::run_interactive(settings).await?;
        }
    }

    Ok(())
}
