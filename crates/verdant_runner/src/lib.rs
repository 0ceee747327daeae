//! Measure execution.
//!
//! A measure is run against a caller-owned model through [`execute`]:
//!
//! ```text
//! arguments(model) -> validate(values) -> run(model, runner, args) -> finish
//! ```
//!
//! Validation failures stop before `run` is called, so the model is only
//! touched once every argument is known to be good. The [`Runner`] collects
//! messages, conditions and step values while the measure runs and is
//! consumed by `finish`, which fixes the terminal status exactly once.
//!
//! Around that core:
//! - [`registry`]: stable keys to measure constructors
//! - [`workflow`]: ordered steps over one model, with skip-on-fail and halt
//! - [`simulation`]: blocking invocation of the external engine
//! - [`report`]: JSON result files

pub mod execute;
pub mod measure;
pub mod registry;
pub mod report;
pub mod runner;
pub mod simulation;
pub mod workflow;

pub use execute::execute;
pub use measure::{Measure, MeasureError};
pub use registry::{MeasureRegistry, RegistryError};
pub use report::{write_result_json, write_workflow_json, ReportError};
pub use runner::{CompletedStep, RunContext, Runner};
pub use simulation::{
    summarize_err_file, ErrFileSummary, SimulationArtifacts, SimulationError, SimulationOutcome,
    SimulationRequest,
};
pub use workflow::{
    run_workflow, StepState, Workflow, WorkflowError, WorkflowResult, WorkflowStep,
    WorkflowStepResult,
};
