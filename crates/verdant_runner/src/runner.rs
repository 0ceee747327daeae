//! The result channel a measure reports through while it runs.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{error, info, warn};
use verdant_protocol::defaults::RETURNED_FALSE_MESSAGE;
use verdant_protocol::{
    clean_value_name, MeasureResult, MeasureStatus, Message, MessageLevel, RunId, StepValue,
    StepValueKind,
};
use verdant_schema::{ArgumentMap, ArgumentSchema, IssueSeverity, ValidationReport};

use crate::measure::MeasureError;

// ============================================================================
// Run context
// ============================================================================

/// A finished step as seen by later steps of the same workflow.
#[derive(Debug, Clone)]
pub struct CompletedStep {
    /// Optional workflow step label
    pub step_name: Option<String>,
    pub result: MeasureResult,
}

impl CompletedStep {
    /// Step label when set, otherwise the measure name.
    pub fn label(&self) -> &str {
        self.step_name
            .as_deref()
            .unwrap_or(self.result.measure_name.as_str())
    }
}

/// Explicit per-invocation environment: flags plus workflow history.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Mirror runner messages into `tracing`
    pub log_messages: bool,
    history: Vec<CompletedStep>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            log_messages: true,
            history: Vec::new(),
        }
    }
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_messages(mut self, log_messages: bool) -> Self {
        self.log_messages = log_messages;
        self
    }

    pub fn history(&self) -> &[CompletedStep] {
        &self.history
    }

    pub fn record(&mut self, step_name: Option<String>, result: MeasureResult) {
        self.history.push(CompletedStep { step_name, result });
    }

    fn successful_steps(&self) -> impl Iterator<Item = &CompletedStep> {
        self.history
            .iter()
            .filter(|s| s.result.status == MeasureStatus::Success)
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Accumulates the outcome of one measure invocation.
///
/// Consumed by [`finish`](Runner::finish); a finished run cannot be written to.
#[derive(Debug)]
pub struct Runner<'ctx> {
    run_id: RunId,
    measure_name: String,
    messages: Vec<Message>,
    initial_condition: Option<String>,
    final_condition: Option<String>,
    values: Vec<StepValue>,
    not_applicable: bool,
    halt: Option<String>,
    started_at: DateTime<Utc>,
    context: &'ctx RunContext,
}

impl<'ctx> Runner<'ctx> {
    pub fn new(measure_name: impl Into<String>, context: &'ctx RunContext) -> Self {
        Self {
            run_id: RunId::new(),
            measure_name: measure_name.into(),
            messages: Vec::new(),
            initial_condition: None,
            final_condition: None,
            values: Vec::new(),
            not_applicable: false,
            halt: None,
            started_at: Utc::now(),
            context,
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn measure_name(&self) -> &str {
        &self.measure_name
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn values(&self) -> &[StepValue] {
        &self.values
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.level == MessageLevel::Error)
    }

    pub fn is_not_applicable(&self) -> bool {
        self.not_applicable
    }

    fn push(&mut self, level: MessageLevel, text: String) {
        if self.context.log_messages {
            let measure = self.measure_name.as_str();
            match level {
                MessageLevel::Info => info!(measure, "{}", text),
                MessageLevel::Warning => warn!(measure, "{}", text),
                MessageLevel::Error => error!(measure, "{}", text),
            }
        }
        self.messages.push(Message::new(level, text));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(MessageLevel::Info, message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(MessageLevel::Warning, message.into());
    }

    /// Register an error. Any error makes the run fail.
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(MessageLevel::Error, message.into());
    }

    pub fn set_initial_condition(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.context.log_messages {
            info!(measure = self.measure_name.as_str(), "Initial condition: {}", message);
        }
        self.initial_condition = Some(message);
    }

    pub fn set_final_condition(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.context.log_messages {
            info!(measure = self.measure_name.as_str(), "Final condition: {}", message);
        }
        self.final_condition = Some(message);
    }

    /// Record that the measure has nothing to do for this model.
    pub fn mark_not_applicable(&mut self, message: impl Into<String>) {
        self.not_applicable = true;
        self.info(message);
    }

    // ------------------------------------------------------------------------
    // Step values
    // ------------------------------------------------------------------------

    /// Register a named output value. The name is normalized.
    pub fn register_value(&mut self, name: &str, value: impl Into<StepValueKind>) {
        self.register_step_value(StepValue::new(name, value.into()));
    }

    pub fn register_value_with_units(
        &mut self,
        name: &str,
        value: impl Into<StepValueKind>,
        units: impl Into<String>,
    ) {
        self.register_step_value(StepValue::new(name, value.into()).with_units(units));
    }

    /// Register a value under a normalized name, keeping `display_name` as the label.
    pub fn register_value_with_display_name(
        &mut self,
        display_name: &str,
        value: impl Into<StepValueKind>,
    ) {
        self.register_step_value(
            StepValue::new(display_name, value.into()).with_display_name(display_name),
        );
    }

    /// Register a fully built step value. A value with the same name is replaced.
    pub fn register_step_value(&mut self, value: StepValue) {
        if let Some(existing) = self.values.iter_mut().find(|v| v.name == value.name) {
            *existing = value;
        } else {
            self.values.push(value);
        }
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Validate `values` and report every issue through this runner.
    ///
    /// On success every resolved argument value is registered as a step value.
    pub fn validate_arguments(&mut self, schema: &ArgumentSchema, values: &ArgumentMap) -> bool {
        let report: ValidationReport = schema.validate(values);

        for issue in &report.issues {
            match issue.severity() {
                IssueSeverity::Error => self.error(issue.to_string()),
                IssueSeverity::Warning => self.warning(issue.to_string()),
            }
        }

        if !report.is_valid() {
            return false;
        }

        for (name, value) in schema.resolved(values) {
            self.register_value(name, StepValueKind::from(&value));
        }
        true
    }

    // ------------------------------------------------------------------------
    // Workflow interaction
    // ------------------------------------------------------------------------

    /// Ask the surrounding workflow to stop after this step.
    pub fn halt_workflow(&mut self, completed_status: impl Into<String>) {
        let status = completed_status.into();
        if self.context.log_messages {
            info!(measure = self.measure_name.as_str(), status = %status, "Workflow halt requested");
        }
        self.halt = Some(status);
    }

    /// Step values of the first earlier successful step that matches `measure`
    /// by step label or measure name (case-insensitive).
    pub fn past_step_values_for_measure(&self, measure: &str) -> BTreeMap<String, StepValueKind> {
        self.context
            .successful_steps()
            .find(|step| {
                step.step_name
                    .as_deref()
                    .is_some_and(|n| n.eq_ignore_ascii_case(measure))
                    || step.result.measure_name.eq_ignore_ascii_case(measure)
            })
            .map(|step| {
                step.result
                    .values
                    .iter()
                    .map(|v| (v.name.clone(), v.value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every earlier successful step's value named `value_name`, keyed by step label.
    pub fn past_step_values_for_name(&self, value_name: &str) -> BTreeMap<String, StepValueKind> {
        let wanted = clean_value_name(value_name);
        let mut found = BTreeMap::new();
        for step in self.context.successful_steps() {
            for value in &step.result.values {
                if value.name.eq_ignore_ascii_case(&wanted) {
                    found.insert(step.label().to_string(), value.value.clone());
                }
            }
        }
        found
    }

    // ------------------------------------------------------------------------
    // Finish
    // ------------------------------------------------------------------------

    /// Resolve the terminal status from the measure's outcome.
    ///
    /// Errors, a returned `false`, or a returned error give `Fail`. Otherwise a
    /// not-applicable mark gives `NotApplicable`, else `Success`.
    pub fn finish(mut self, outcome: Result<bool, MeasureError>) -> MeasureResult {
        let returned_ok = match outcome {
            Ok(ok) => ok,
            Err(err) => {
                self.error(err.to_string());
                false
            }
        };

        if !returned_ok && !self.has_errors() {
            self.error(RETURNED_FALSE_MESSAGE);
        }

        let status = if self.has_errors() {
            MeasureStatus::Fail
        } else if self.not_applicable {
            MeasureStatus::NotApplicable
        } else {
            MeasureStatus::Success
        };

        MeasureResult {
            run_id: self.run_id,
            measure_name: self.measure_name,
            status,
            messages: self.messages,
            initial_condition: self.initial_condition,
            final_condition: self.final_condition,
            values: self.values,
            halt: self.halt,
            started_at: self.started_at,
            completed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_schema::Argument;

    fn quiet() -> RunContext {
        RunContext::new().with_log_messages(false)
    }

    #[test]
    fn test_success_when_nothing_registered() {
        let ctx = quiet();
        let result = Runner::new("noop", &ctx).finish(Ok(true));
        assert_eq!(result.status, MeasureStatus::Success);
        assert!(result.messages.is_empty());
        assert!(result.completed_at >= result.started_at);
    }

    #[test]
    fn test_registered_error_fails_even_if_true_returned() {
        let ctx = quiet();
        let mut runner = Runner::new("m", &ctx);
        runner.error("broken");
        let result = runner.finish(Ok(true));
        assert_eq!(result.status, MeasureStatus::Fail);
        assert_eq!(result.errors().collect::<Vec<_>>(), vec!["broken"]);
    }

    #[test]
    fn test_false_without_error_is_synthesized() {
        let ctx = quiet();
        let result = Runner::new("m", &ctx).finish(Ok(false));
        assert_eq!(result.status, MeasureStatus::Fail);
        assert_eq!(result.errors().collect::<Vec<_>>(), vec![RETURNED_FALSE_MESSAGE]);
    }

    #[test]
    fn test_returned_error_is_recorded() {
        let ctx = quiet();
        let result = Runner::new("m", &ctx).finish(Err(MeasureError::domain("no zones")));
        assert_eq!(result.status, MeasureStatus::Fail);
        assert_eq!(result.errors().count(), 1);
    }

    #[test]
    fn test_not_applicable_has_no_errors() {
        let ctx = quiet();
        let mut runner = Runner::new("m", &ctx);
        runner.warning("odd but fine");
        runner.mark_not_applicable("No matching objects found");
        let result = runner.finish(Ok(true));
        assert_eq!(result.status, MeasureStatus::NotApplicable);
        assert!(!result.has_errors());
        assert_eq!(result.infos().collect::<Vec<_>>(), vec!["No matching objects found"]);
    }

    #[test]
    fn test_error_beats_not_applicable() {
        let ctx = quiet();
        let mut runner = Runner::new("m", &ctx);
        runner.mark_not_applicable("nothing to do");
        runner.error("but also broken");
        assert_eq!(runner.finish(Ok(true)).status, MeasureStatus::Fail);
    }

    #[test]
    fn test_conditions_last_write_wins() {
        let ctx = quiet();
        let mut runner = Runner::new("m", &ctx);
        runner.set_initial_condition("first");
        runner.set_initial_condition("second");
        runner.set_final_condition("done");
        let result = runner.finish(Ok(true));
        assert_eq!(result.initial_condition.as_deref(), Some("second"));
        assert_eq!(result.final_condition.as_deref(), Some("done"));
    }

    #[test]
    fn test_register_value_normalizes_and_replaces() {
        let ctx = quiet();
        let mut runner = Runner::new("m", &ctx);
        runner.register_value("Total Floor Area", 10.0);
        runner.register_value_with_units("total_floor_area", 12.0, "m2");
        runner.register_value_with_display_name("Zone Count", 3i64);
        let result = runner.finish(Ok(true));

        assert_eq!(result.values.len(), 2);
        assert_eq!(result.values[0].units.as_deref(), Some("m2"));
        assert_eq!(result.value("total_floor_area"), Some(&StepValueKind::Double(12.0)));
        assert_eq!(result.values[1].display_name.as_deref(), Some("Zone Count"));
    }

    #[test]
    fn test_validate_arguments_failure_reports_errors() {
        let ctx = quiet();
        let schema = ArgumentSchema::new().with(Argument::double("pct")).unwrap();
        let mut runner = Runner::new("m", &ctx);
        assert!(!runner.validate_arguments(&schema, &ArgumentMap::new()));
        assert!(runner.has_errors());
        assert!(runner.values().is_empty());
    }

    #[test]
    fn test_validate_arguments_registers_resolved_values() {
        let ctx = quiet();
        let schema = ArgumentSchema::new()
            .with(Argument::double("pct").with_default(30.0))
            .unwrap();
        let values = ArgumentMap::new().with("extra", "x");
        let mut runner = Runner::new("m", &ctx);
        assert!(runner.validate_arguments(&schema, &values));

        let result = runner.finish(Ok(true));
        assert_eq!(result.status, MeasureStatus::Success);
        assert_eq!(result.warnings().count(), 1);
        assert_eq!(result.value("pct"), Some(&StepValueKind::Double(30.0)));
    }

    #[test]
    fn test_halt_is_carried_on_result() {
        let ctx = quiet();
        let mut runner = Runner::new("m", &ctx);
        runner.halt_workflow("Invalid");
        assert_eq!(runner.finish(Ok(true)).halt.as_deref(), Some("Invalid"));
    }

    fn finished(name: &str, status_ok: bool, value: f64) -> MeasureResult {
        let ctx = quiet();
        let mut runner = Runner::new(name, &ctx);
        runner.register_value("Floor Area", value);
        runner.finish(Ok(status_ok))
    }

    #[test]
    fn test_past_step_values_only_from_successful_steps() {
        let mut ctx = quiet();
        ctx.record(None, finished("ReduceLighting", true, 1.0));
        ctx.record(Some("second".to_string()), finished("report", false, 2.0));
        ctx.record(Some("third".to_string()), finished("report", true, 3.0));

        let runner = Runner::new("m", &ctx);

        let by_measure = runner.past_step_values_for_measure("reducelighting");
        assert_eq!(by_measure.get("floor_area"), Some(&StepValueKind::Double(1.0)));
        assert!(runner.past_step_values_for_measure("SECOND").is_empty());

        let by_name = runner.past_step_values_for_name("Floor Area");
        assert_eq!(by_name.len(), 2);
        assert_eq!(by_name.get("third"), Some(&StepValueKind::Double(3.0)));
        assert_eq!(by_name.get("ReduceLighting"), Some(&StepValueKind::Double(1.0)));
    }
}
