//! The contract every measure implements.

use thiserror::Error;
use verdant_schema::{ArgumentError, ArgumentSchema, Arguments, SchemaError};

use crate::runner::Runner;

/// Errors a measure may return from [`Measure::run`]. Any of them fails the run.
#[derive(Debug, Error)]
pub enum MeasureError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A domain precondition the measure treats as fatal
    #[error("{0}")]
    Domain(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MeasureError {
    pub fn domain(message: impl Into<String>) -> Self {
        MeasureError::Domain(message.into())
    }
}

/// A self-contained model transformation with typed arguments.
///
/// `M` is the model type the measure mutates. Measures are built through a
/// [`MeasureRegistry`](crate::MeasureRegistry) and run through
/// [`execute`](crate::execute).
pub trait Measure<M> {
    /// Stable name (e.g., "reduce_lighting_loads_by_percentage")
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str {
        ""
    }

    /// Declare the arguments. May inspect (but not mutate) the model.
    fn arguments(&self, model: &M) -> Result<ArgumentSchema, SchemaError>;

    /// Apply the measure.
    ///
    /// Called only after argument validation has passed. Return `Ok(false)`
    /// after registering an error for a hard failure; call
    /// [`Runner::mark_not_applicable`] and return `Ok(true)` when there is
    /// nothing to do.
    fn run(
        &self,
        model: &mut M,
        runner: &mut Runner<'_>,
        arguments: &Arguments<'_>,
    ) -> Result<bool, MeasureError>;
}
