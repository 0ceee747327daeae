use verdant_runner::{Measure, MeasureError, Runner};
use verdant_schema::{Argument, ArgumentSchema, Arguments, SchemaError};

use crate::model::{BuildingModel, Facade};

pub(crate) const KEY: &str = "set_window_to_wall_ratio_by_facade";

const ALL_FACADES: &str = "All";

/// Set the window area of exterior walls to `wwr` times their gross area.
///
/// Policy:
/// - not applicable when no exterior wall faces the chosen facade
/// - warning per wall with zero gross area (skipped)
/// - no hard failures beyond argument validation
pub struct SetWindowToWallRatioByFacade;

impl Measure<BuildingModel> for SetWindowToWallRatioByFacade {
    fn name(&self) -> &str {
        KEY
    }

    fn description(&self) -> &str {
        "Set the window to wall ratio of exterior walls on one facade"
    }

    fn arguments(&self, _model: &BuildingModel) -> Result<ArgumentSchema, SchemaError> {
        let choices = Facade::ALL
            .iter()
            .map(|f| f.as_str())
            .chain(std::iter::once(ALL_FACADES));

        ArgumentSchema::new()
            .with(
                Argument::double("wwr")
                    .with_display_name("Window to Wall Ratio")
                    .with_units("fraction")
                    .with_domain(0.0, 0.95)
                    .with_default(0.4),
            )?
            .with(
                Argument::choice("facade", choices)
                    .with_display_name("Cardinal Direction")
                    .with_default(Facade::South.as_str()),
            )
    }

    fn run(
        &self,
        model: &mut BuildingModel,
        runner: &mut Runner<'_>,
        arguments: &Arguments<'_>,
    ) -> Result<bool, MeasureError> {
        let wwr: f64 = arguments.get("wwr")?;
        let facade_choice: String = arguments.get("facade")?;
        let facade = if facade_choice == ALL_FACADES {
            None
        } else {
            Some(
                facade_choice
                    .parse::<Facade>()
                    .map_err(|e| MeasureError::domain(e.to_string()))?,
            )
        };
        let faces = |f: Facade| facade.map_or(true, |wanted| wanted == f);

        let walls: Vec<usize> = model
            .surfaces
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_exterior_wall() && faces(s.facade()))
            .map(|(i, _)| i)
            .collect();

        if walls.is_empty() {
            runner.mark_not_applicable(format!(
                "The model has no exterior walls facing {}",
                facade_choice
            ));
            return Ok(true);
        }

        let gross: f64 = walls.iter().map(|&i| model.surfaces[i].gross_area_m2).sum();
        let initial_window: f64 = walls.iter().map(|&i| model.surfaces[i].window_area_m2).sum();
        runner.set_initial_condition(format!(
            "{} {} walls with a window to wall ratio of {:.2}",
            walls.len(),
            facade_choice,
            if gross > 0.0 { initial_window / gross } else { 0.0 }
        ));

        let mut changed = 0usize;
        for &i in &walls {
            let wall = &mut model.surfaces[i];
            if wall.gross_area_m2 <= 0.0 {
                let name = wall.name.clone();
                runner.warning(format!("Wall '{}' has no gross area, skipped", name));
                continue;
            }
            wall.window_area_m2 = wall.gross_area_m2 * wwr;
            changed += 1;
        }

        let final_window: f64 = walls.iter().map(|&i| model.surfaces[i].window_area_m2).sum();
        runner.register_value("walls_modified", changed);
        runner.register_value_with_units("window_area", final_window, "m2");
        runner.set_final_condition(format!(
            "{} {} walls now have a window to wall ratio of {:.2}",
            changed, facade_choice, wwr
        ));
        Ok(true)
    }
}
