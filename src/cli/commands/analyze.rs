//! Single-video analysis command.

use crate::analysis::VideoAnalysis;
use crate::cli::preflight;
use crate::cli::{AnalyzeOptions, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::report::{format_analysis, save_analysis};
use anyhow::Result;

/// Run the analyze command.
pub async fn run_analyze(url: &str, options: &AnalyzeOptions, mut settings: Settings) -> Result<()> {
    options.apply(&mut settings);

    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vidbrief doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings.clone())?;
    analyze_and_report(&orchestrator, url, &settings).await?;
    Ok(())
}

/// Analyze one video, print the report and save it if configured.
pub(crate) async fn analyze_and_report(
    orchestrator: &Orchestrator,
    url: &str,
    settings: &Settings,
) -> Result<VideoAnalysis> {
    Output::info(&format!("Analyzing: {}", url));
    let analysis = orchestrator.analyze_video(url).await?;
    Output::success("Analysis complete!");

    println!("\n{}", format_analysis(&analysis));

    if settings.output.save_json {
        let path = save_analysis(&analysis, &settings.output_dir(), &settings.output.filename_pattern)?;
        Output::success(&format!("Analysis saved to {}", path.display()));
    }

    Ok(analysis)
}
