use verdant_runner::{Measure, MeasureError, Runner};
use verdant_schema::{ArgumentSchema, Arguments, SchemaError};

use crate::model::BuildingModel;

pub(crate) const KEY: &str = "report_model_summary";

/// Register floor area, lighting and envelope totals as step values.
///
/// Never mutates the model. Not applicable when the model is empty.
pub struct ReportModelSummary;

impl Measure<BuildingModel> for ReportModelSummary {
    fn name(&self) -> &str {
        KEY
    }

    fn description(&self) -> &str {
        "Report floor area, lighting power and envelope totals"
    }

    fn arguments(&self, _model: &BuildingModel) -> Result<ArgumentSchema, SchemaError> {
        Ok(ArgumentSchema::new())
    }

    fn run(
        &self,
        model: &mut BuildingModel,
        runner: &mut Runner<'_>,
        _arguments: &Arguments<'_>,
    ) -> Result<bool, MeasureError> {
        if model.is_empty() {
            runner.mark_not_applicable("The model is empty");
            return Ok(true);
        }

        let floor_area = model.total_floor_area();
        let wall_area: f64 = model.exterior_walls().map(|s| s.gross_area_m2).sum();
        let window_area: f64 = model.exterior_walls().map(|s| s.window_area_m2).sum();
        let roof_area: f64 = model.roofs(false).map(|s| s.gross_area_m2).sum();

        runner.register_value("space_count", model.spaces.len());
        runner.register_value_with_units("total_floor_area", floor_area, "m2");
        runner.register_value_with_units("lighting_power", model.lighting_power_w(), "W");
        runner.register_value_with_units("exterior_wall_area", wall_area, "m2");
        runner.register_value_with_units("window_area", window_area, "m2");
        runner.register_value_with_units("roof_area", roof_area, "m2");
        if wall_area > 0.0 {
            runner.register_value("window_to_wall_ratio", window_area / wall_area);
        } else {
            runner.warning("No exterior wall area, window to wall ratio not reported");
        }

        runner.set_final_condition(format!(
            "'{}': {} spaces, {:.1} m2 floor area",
            model.name,
            model.spaces.len(),
            floor_area
        ));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measures::fixtures::office;
    use verdant_protocol::{MeasureStatus, StepValueKind};
    use verdant_runner::{execute, RunContext};
    use verdant_schema::ArgumentMap;

    #[test]
    fn test_summary_values() {
        let mut model = office();
        let result = execute(&ReportModelSummary, &mut model, &ArgumentMap::new(), &RunContext::new());

        assert_eq!(result.status, MeasureStatus::Success);
        assert_eq!(model, office());
        assert_eq!(result.value("total_floor_area"), Some(&StepValueKind::Double(100.0)));
        assert_eq!(result.value("lighting_power"), Some(&StepValueKind::Double(1000.0)));
        assert_eq!(result.value("window_to_wall_ratio"), Some(&StepValueKind::Double(0.125)));
    }

    #[test]
    fn test_empty_model_not_applicable() {
        let mut model = BuildingModel::default();
        let result = execute(&ReportModelSummary, &mut model, &ArgumentMap::new(), &RunContext::new());
        assert_eq!(result.status, MeasureStatus::NotApplicable);
    }
}
