//! `workflow` command - run a workflow file against a model file

use anyhow::{Context, Result};
use comfy_table::Color;
use std::path::PathBuf;
use tracing::info;
use verdant_model::builtin_registry;
use verdant_runner::{run_workflow, write_workflow_json, RunContext, StepState, Workflow};

use super::config::AppConfig;
use super::error::{HelpfulError, ReportedFailure};
use super::measure::load_model;
use super::output::{format_duration_ms, print_table_colored, status_color};

#[derive(Debug)]
pub struct WorkflowArgs {
    pub workflow: PathBuf,
    pub model: PathBuf,
    pub output: Option<PathBuf>,
    pub report_dir: Option<PathBuf>,
    pub json: bool,
}

pub fn run(args: WorkflowArgs, config: &AppConfig) -> Result<()> {
    if !args.workflow.exists() {
        return Err(HelpfulError::file_not_found(&args.workflow).into());
    }
    let workflow = Workflow::load(&args.workflow)?;
    let registry = builtin_registry()?;
    let mut model = load_model(&args.model)?;

    let mut context = RunContext::new().with_log_messages(config.runner.log_messages);
    let result = run_workflow(&workflow, &registry, &mut model, &mut context).map_err(|e| {
        HelpfulError::new(e.to_string())
            .with_context(format!("Workflow: {}", args.workflow.display()))
            .with_suggestion("TRY: List measures: verdant list")
    })?;

    let report_dir = args
        .report_dir
        .clone()
        .unwrap_or_else(|| config.runner.report_dir.clone());
    let report_path = write_workflow_json(&result, &report_dir)?;

    // A halted workflow stopped on purpose; only a failed step blocks the save.
    let failed = result.is_failed();
    let saved = match &args.output {
        Some(output) if !failed => {
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
            "workflow": result,
            "report": report_path.to_string_lossy(),
            "saved_model": saved.as_ref().map(|p| p.to_string_lossy().into_owned()),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        let rows = result
            .steps
            .iter()
            .map(|step| {
                let (status, color, duration, detail) = match (&step.state, &step.result) {
                    (StepState::Completed, Some(r)) => (
                        r.status.as_str().to_string(),
                        Some(status_color(r.status)),
                        format_duration_ms(r.duration_ms()),
                        r.errors()
                            .next()
                            .or(r.final_condition.as_deref())
                            .unwrap_or_default()
                            .to_string(),
                    ),
                    _ => ("skipped".to_string(), Some(Color::Grey), String::new(), String::new()),
                };
                vec![
                    ((step.index + 1).to_string(), None),
                    (step.label.clone(), None),
                    (status, color),
                    (duration, None),
                    (detail, None),
                ]
            })
            .collect();
        print_table_colored(&["#", "STEP", "STATUS", "TIME", "DETAIL"], rows);
        println!();
        println!("Completed status: {}", result.completed_status);
        println!("Report: {}", report_path.display());
        if let Some(path) = &saved {
            println!("Model:  {}", path.display());
        }
    }

    if failed {
        return Err(ReportedFailure(format!(
            "Workflow finished with status '{}'",
            result.completed_status
        ))
        .into());
    }
    Ok(())
}
