//! Built-in measures
//!
//! Each measure documents its error / warning / not-applicable policy on its
//! type.
//!
//! - `reduce_lighting_loads_by_percentage`
//! - `increase_roof_insulation`
//! - `set_window_to_wall_ratio_by_facade`
//! - `report_model_summary` (read-only)

mod lighting;
mod roof_insulation;
mod summary;
mod window_to_wall;

pub use lighting::ReduceLightingLoadsByPercentage;
pub use roof_insulation::IncreaseRoofInsulation;
pub use summary::ReportModelSummary;
pub use window_to_wall::SetWindowToWallRatioByFacade;

use verdant_runner::{MeasureRegistry, RegistryError};

use crate::model::BuildingModel;

/// Registry with every built-in measure under its stable key.
pub fn builtin_registry() -> Result<MeasureRegistry<BuildingModel>, RegistryError> {
    let mut registry = MeasureRegistry::new();
    registry.register(lighting::KEY, || Box::new(ReduceLightingLoadsByPercentage))?;
    registry.register(roof_insulation::KEY, || Box::new(IncreaseRoofInsulation))?;
    registry.register(window_to_wall::KEY, || Box::new(SetWindowToWallRatioByFacade))?;
    registry.register(summary::KEY, || Box::new(ReportModelSummary))?;
    Ok(registry)
}
