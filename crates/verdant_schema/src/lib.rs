//! Measure Argument Schemas
//!
//! # Lifecycle: Declare, Validate, Extract
//!
//! 1. **Declare**: a measure builds an [`ArgumentSchema`] from [`Argument`]s.
//!    Bad declarations (duplicate names, defaults outside their own choice
//!    set or domain) fail here, before anything runs.
//! 2. **Validate**: the values supplied for one invocation ([`ArgumentMap`])
//!    are checked against the schema. A required argument with no default
//!    that was not supplied is a failure, as is a value of the wrong type.
//! 3. **Extract**: typed getters return the supplied value or fall back to the
//!    declared default.
//!
//! Validation is a pure read layer. It never touches the model a measure
//! would mutate, so a failed validation leaves everything as it was.
//!
//! # Modules
//!
//! - [`schema`]: argument declarations and the ordered schema
//! - [`values`]: the per-invocation value map and its text/JSON inputs
//! - [`validation`]: completeness and type checks
//! - [`extract`]: typed getters with default fallback

pub mod extract;
pub mod schema;
pub mod validation;
pub mod values;

pub use extract::{ArgumentError, Arguments, FromArgumentValue};
pub use schema::{Argument, ArgumentSchema, Domain, SchemaError};
pub use validation::{validate, IssueSeverity, ValidationIssue, ValidationReport};
pub use values::ArgumentMap;

/// Canonical argument types (shared across crates).
pub use verdant_protocol::{ArgumentType, ArgumentValue};
