//! Reference building model and built-in measures.
//!
//! [`BuildingModel`] stands in for a full energy model: spaces with lighting
//! loads and envelope surfaces with constructions. The measures in
//! [`measures`] mutate it through the harness in `verdant_runner`.

pub mod measures;
pub mod model;

pub use measures::builtin_registry;
pub use model::{BoundaryCondition, BuildingModel, Facade, ModelError, Space, Surface, SurfaceType};
