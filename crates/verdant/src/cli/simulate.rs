//! `simulate` command - blocking engine run

use anyhow::Result;
use std::path::PathBuf;
use verdant_runner::{SimulationError, SimulationRequest};

use super::config::AppConfig;
use super::error::{HelpfulError, ReportedFailure};

#[derive(Debug)]
pub struct SimulateArgs {
    pub model: PathBuf,
    pub weather: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub engine: Option<PathBuf>,
    pub json: bool,
}

pub fn run(args: SimulateArgs, config: &AppConfig) -> Result<()> {
    let executable = args
        .engine
        .clone()
        .unwrap_or_else(|| config.engine.executable.clone());

    let mut request = SimulationRequest::new(&executable, &args.model, &args.output_dir)
        .with_extra_args(config.engine.extra_args.iter().cloned());
    if let Some(weather) = &args.weather {
        if !weather.exists() {
            return Err(HelpfulError::file_not_found(weather).into());
        }
        request = request.with_weather(weather);
    }

    let outcome = request.run().map_err(|err| -> anyhow::Error {
        match err {
            SimulationError::Spawn { executable, source } => {
                HelpfulError::engine_not_found(&executable, &source.to_string()).into()
            }
            SimulationError::MissingModel(path) => HelpfulError::file_not_found(&path).into(),
            other => other.into(),
        }
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!(
            "Simulation {} (exit code {})",
            if outcome.success { "succeeded" } else { "FAILED" },
            outcome
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        if let Some(summary) = &outcome.err_summary {
            println!(
                "  {} warnings, {} severe, {} fatal{}",
                summary.warnings,
                summary.severe,
                summary.fatal,
                if summary.completed_successfully { "" } else { " (did not complete)" }
            );
        }
        if let Some(sql) = &outcome.artifacts.sql {
            println!("  SQL results: {}", sql.display());
        }
        for report in &outcome.artifacts.json_reports {
            println!("  Report:      {}", report.display());
        }
        if !outcome.success && !outcome.stderr_tail.is_empty() {
            println!();
            println!("{}", outcome.stderr_tail);
        }
    }

    if !outcome.success {
        return Err(ReportedFailure("Simulation failed".to_string()).into());
    }
    Ok(())
}
