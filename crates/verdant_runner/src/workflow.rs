//! Workflow - ordered measure steps over one model
//!
//! Steps run in order against the same model:
//! - `Fail` stops the workflow; remaining steps are `Skipped`
//! - `NotApplicable` continues like `Success`
//! - a step that requests a halt ends the workflow after itself
//!
//! Each step sees the results of the steps before it through the
//! [`RunContext`] history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use verdant_protocol::{MeasureResult, MeasureStatus, WorkflowId};
use verdant_schema::ArgumentMap;

use crate::execute::execute;
use crate::measure::MeasureError;
use crate::registry::{MeasureRegistry, RegistryError};
use crate::runner::{RunContext, Runner};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Failed to read workflow {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid workflow JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Workflow step {index}: {source}")]
    UnknownMeasure {
        index: usize,
        #[source]
        source: RegistryError,
    },

    #[error("Workflow has no steps")]
    Empty,
}

// ============================================================================
// Definition
// ============================================================================

/// One step of a workflow file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Registry key of the measure
    pub measure: String,

    /// Optional label, used when later steps look up past values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Argument values as plain JSON scalars
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl WorkflowStep {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.measure)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub steps: Vec<WorkflowStep>,
}

impl Workflow {
    pub fn from_json_str(json: &str) -> Result<Self, WorkflowError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, WorkflowError> {
        let content = std::fs::read_to_string(path).map_err(|source| WorkflowError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStepResult {
    pub index: usize,
    pub label: String,
    pub measure: String,
    pub state: StepState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<MeasureResult>,
}

impl WorkflowStepResult {
    pub fn status(&self) -> Option<MeasureStatus> {
        self.result.as_ref().map(|r| r.status)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub workflow_id: WorkflowId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// "Success", "Fail", or the label a step passed to `halt_workflow`
    pub completed_status: String,
    pub halted: bool,
    pub steps: Vec<WorkflowStepResult>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl WorkflowResult {
    pub fn is_success(&self) -> bool {
        !self.halted && self.completed_status == "Success"
    }

    pub fn is_failed(&self) -> bool {
        !self.halted && self.completed_status == "Fail"
    }

    pub fn skipped_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.state == StepState::Skipped)
            .count()
    }
}

// ============================================================================
// Execution
// ============================================================================

/// Run every step of `workflow` against `model`.
///
/// Unknown measure keys are rejected before any step runs. Argument values
/// that cannot be converted fail their step.
pub fn run_workflow<M>(
    workflow: &Workflow,
    registry: &MeasureRegistry<M>,
    model: &mut M,
    context: &mut RunContext,
) -> Result<WorkflowResult, WorkflowError> {
    if workflow.steps.is_empty() {
        return Err(WorkflowError::Empty);
    }

    let measures = workflow
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            registry
                .create(&step.measure)
                .map_err(|source| WorkflowError::UnknownMeasure { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let workflow_id = WorkflowId::new();
    let started_at = Utc::now();
    let span = tracing::info_span!("workflow.run", workflow_id = %workflow_id.short());
    let _guard = span.enter();

    let mut steps = Vec::with_capacity(workflow.steps.len());
    let mut completed_status = "Success".to_string();
    let mut halted = false;
    let mut stopped = false;

    for (index, (step, measure)) in workflow.steps.iter().zip(measures).enumerate() {
        if stopped {
            steps.push(WorkflowStepResult {
                index,
                label: step.label().to_string(),
                measure: step.measure.clone(),
                state: StepState::Skipped,
                result: None,
            });
            continue;
        }

        info!(index, step = step.label(), "Running workflow step");

        let converted: Result<ArgumentMap, MeasureError> = measure
            .arguments(model)
            .map_err(Into::into)
            .and_then(|schema| {
                ArgumentMap::from_json(&schema, &step.arguments).map_err(Into::into)
            });

        let result = match converted {
            Ok(values) => execute(measure.as_ref(), model, &values, context),
            Err(err) => Runner::new(measure.name(), context).finish(Err(err)),
        };

        if !result.status.continues_pipeline() {
            warn!(index, step = step.label(), "Workflow step failed, skipping remaining steps");
            completed_status = "Fail".to_string();
            stopped = true;
        } else if let Some(halt) = &result.halt {
            info!(index, step = step.label(), status = %halt, "Workflow halted");
            completed_status = halt.clone();
            halted = true;
            stopped = true;
        }

        context.record(step.name.clone(), result.clone());
        steps.push(WorkflowStepResult {
            index,
            label: step.label().to_string(),
            measure: step.measure.clone(),
            state: StepState::Completed,
            result: Some(result),
        });
    }

    Ok(WorkflowResult {
        workflow_id,
        name: workflow.name.clone(),
        completed_status,
        halted,
        steps,
        started_at,
        completed_at: Utc::now(),
    })
}
