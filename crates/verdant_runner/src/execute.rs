//! Single measure invocation.

use tracing::info;
use verdant_protocol::MeasureResult;
use verdant_schema::{ArgumentMap, Arguments};

use crate::measure::Measure;
use crate::runner::{RunContext, Runner};

/// Run one measure against `model` with the supplied values.
///
/// The model is only handed to `run` after the schema builds and the values
/// validate. There is no retry and no rollback.
pub fn execute<M>(
    measure: &dyn Measure<M>,
    model: &mut M,
    values: &ArgumentMap,
    context: &RunContext,
) -> MeasureResult {
    let mut runner = Runner::new(measure.name(), context);
    let span = tracing::info_span!(
        "measure.run",
        measure = %measure.name(),
        run_id = %runner.run_id().short()
    );
    let _guard = span.enter();

    let schema = match measure.arguments(model) {
        Ok(schema) => schema,
        Err(err) => return runner.finish(Err(err.into())),
    };

    if !runner.validate_arguments(&schema, values) {
        let result = runner.finish(Ok(false));
        info!(status = %result.status, "Argument validation failed, model untouched");
        return result;
    }

    let arguments = Arguments::new(&schema, values);
    let outcome = measure.run(model, &mut runner, &arguments);
    let result = runner.finish(outcome);

    info!(
        status = %result.status,
        errors = result.errors().count(),
        warnings = result.warnings().count(),
        duration_ms = result.duration_ms(),
        "Measure finished"
    );
    result
}
