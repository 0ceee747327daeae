//! `apply` command - run one measure against a model file

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;
use verdant_model::builtin_registry;
use verdant_protocol::MeasureStatus;
use verdant_runner::{execute, write_result_json, RunContext};
use verdant_schema::ArgumentMap;

use super::config::AppConfig;
use super::error::{HelpfulError, ReportedFailure};
use super::measure::{create_measure, load_model};
use super::output::print_measure_result;

#[derive(Debug)]
pub struct ApplyArgs {
    pub measure: String,
    pub model: PathBuf,
    /// `name=value` assignments
    pub args: Vec<String>,
    pub output: Option<PathBuf>,
    pub report_dir: Option<PathBuf>,
    pub json: bool,
}

pub fn run(args: ApplyArgs, config: &AppConfig) -> Result<()> {
    let registry = builtin_registry()?;
    let measure = create_measure(&registry, &args.measure)?;
    let mut model = load_model(&args.model)?;

    let schema = measure.arguments(&model)?;
    let values = ArgumentMap::from_assignments(&schema, &args.args)
        .map_err(|e| HelpfulError::invalid_argument(&args.measure, &e.to_string()))?;

    let context = RunContext::new().with_log_messages(config.runner.log_messages);
    let result = execute(measure.as_ref(), &mut model, &values, &context);

    let report_dir = args
        .report_dir
        .clone()
        .unwrap_or_else(|| config.runner.report_dir.clone());
    let report_path = write_result_json(&result, &report_dir)?;

    let saved = match &args.output {
        Some(output) if result.status != MeasureStatus::Fail => {
            model
                .save(output)
                .with_context(|| format!("Failed to save model to {}", output.display()))?;
            info!("Saved model to {}", output.display());
            Some(output.clone())
        }
        _ => None,
    };

    if args.json {
        let payload = serde_json::json!({
            "result": result,
            "report": report_path.to_string_lossy(),
            "saved_model": saved.as_ref().map(|p| p.to_string_lossy().into_owned()),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_measure_result(&result);
        println!();
        println!("Report: {}", report_path.display());
        match &saved {
            Some(path) => println!("Model:  {}", path.display()),
            None if args.output.is_none() => println!("Model:  not saved (pass --output to save)"),
            None => println!("Model:  not saved (measure failed)"),
        }
    }

    if result.status == MeasureStatus::Fail {
        return Err(ReportedFailure(format!("Measure '{}' failed", result.measure_name)).into());
    }
    Ok(())
}
