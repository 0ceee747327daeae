use verdant_runner::{Measure, MeasureError, Runner};
use verdant_schema::{Argument, ArgumentSchema, Arguments, SchemaError};

use crate::model::BuildingModel;

pub(crate) const KEY: &str = "reduce_lighting_loads_by_percentage";

/// Reduce the lighting power density of every space by `pct` percent.
///
/// Policy:
/// - not applicable when no space has lighting power
/// - warning when `pct` is 0 (nothing changes, run still succeeds)
/// - no hard failures beyond argument validation
pub struct ReduceLightingLoadsByPercentage;

impl Measure<BuildingModel> for ReduceLightingLoadsByPercentage {
    fn name(&self) -> &str {
        KEY
    }

    fn description(&self) -> &str {
        "Reduce lighting power density in every space by a percentage"
    }

    fn arguments(&self, _model: &BuildingModel) -> Result<ArgumentSchema, SchemaError> {
        ArgumentSchema::new().with(
            Argument::double("pct")
                .with_display_name("Lighting Power Reduction")
                .with_description("Percentage reduction applied to every space's lighting power density")
                .with_units("%")
                .with_domain(0.0, 100.0)
                .with_default(30.0),
        )
    }

    fn run(
        &self,
        model: &mut BuildingModel,
        runner: &mut Runner<'_>,
        arguments: &Arguments<'_>,
    ) -> Result<bool, MeasureError> {
        let pct: f64 = arguments.get("pct")?;

        let lit = model
            .spaces
            .iter()
            .filter(|s| s.lighting_power_w() > 0.0)
            .count();
        let initial_w = model.lighting_power_w();
        if lit == 0 {
            runner.mark_not_applicable("The model has no spaces with lighting, nothing to reduce");
            return Ok(true);
        }

        runner.set_initial_condition(format!(
            "The building has {} lit spaces with {:.0} W of lighting",
            lit, initial_w
        ));

        if pct == 0.0 {
            runner.warning("A 0% reduction leaves lighting power unchanged");
        }

        let factor = 1.0 - pct / 100.0;
        for space in model.spaces.iter_mut() {
            space.lighting_power_density *= factor;
        }

        let final_w = model.lighting_power_w();
        runner.register_value_with_units("lighting_power_initial", initial_w, "W");
        runner.register_value_with_units("lighting_power_final", final_w, "W");
        runner.set_final_condition(format!(
            "Lighting power reduced by {}% to {:.0} W",
            pct, final_w
        ));
        Ok(true)
    }
}
