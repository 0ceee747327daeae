use verdant_runner::{Measure, MeasureError, Runner};
use verdant_schema::{Argument, ArgumentSchema, Arguments, SchemaError};

use crate::model::BuildingModel;

pub(crate) const KEY: &str = "increase_roof_insulation";

/// Add thermal resistance to every roof construction.
///
/// Policy:
/// - not applicable with "No roofs found" when no roof matches
/// - error (run fails, model untouched) when a matching roof has a
///   non-positive or non-finite R-value
/// - warning when `r_value_increase` is 0
pub struct IncreaseRoofInsulation;

impl Measure<BuildingModel> for IncreaseRoofInsulation {
    fn name(&self) -> &str {
        KEY
    }

    fn description(&self) -> &str {
        "Increase the R-value of roof constructions"
    }

    fn arguments(&self, _model: &BuildingModel) -> Result<ArgumentSchema, SchemaError> {
        ArgumentSchema::new()
            .with(
                Argument::double("r_value_increase")
                    .with_display_name("R-value Increase")
                    .with_units("m2-K/W")
                    .with_domain(0.0, 50.0),
            )?
            .with(
                Argument::boolean("apply_to_ground_roofs")
                    .with_display_name("Include Ground-Contact Roofs")
                    .with_default(false),
            )
    }

    fn run(
        &self,
        model: &mut BuildingModel,
        runner: &mut Runner<'_>,
        arguments: &Arguments<'_>,
    ) -> Result<bool, MeasureError> {
        let increase: f64 = arguments.get("r_value_increase")?;
        let include_ground: bool = arguments.get("apply_to_ground_roofs")?;

        let roof_count = model.roofs(include_ground).count();
        if roof_count == 0 {
            runner.mark_not_applicable("No roofs found");
            return Ok(true);
        }

        for roof in model.roofs(include_ground) {
            if !roof.has_valid_r_value() {
                runner.error(format!(
                    "Roof '{}' has an unusable R-value ({})",
                    roof.name, roof.r_value
                ));
            }
        }
        if runner.has_errors() {
            return Ok(false);
        }

        let initial_avg = model.roofs(include_ground).map(|r| r.r_value).sum::<f64>() / roof_count as f64;
        runner.set_initial_condition(format!(
            "{} roofs with an average R-value of {:.2}",
            roof_count, initial_avg
        ));

        if increase == 0.0 {
            runner.warning("An R-value increase of 0 leaves roofs unchanged");
        }

        for roof in model.roofs_mut(include_ground) {
            roof.r_value += increase;
        }

        let final_avg = initial_avg + increase;
        runner.register_value("roofs_modified", roof_count);
        runner.register_value_with_units("roof_r_value_average", final_avg, "m2-K/W");
        runner.set_final_condition(format!(
            "{} roofs now average R-{:.2}",
            roof_count, final_avg
        ));
        Ok(true)
    }
}
