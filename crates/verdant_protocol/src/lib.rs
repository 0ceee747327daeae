//! Measure Protocol: shared types
//!
//! The vocabulary every Verdant crate speaks when a measure runs:
//!
//! - [`ArgumentType`] / [`ArgumentValue`]: what a measure accepts
//! - [`MeasureStatus`]: `Running -> Success | Fail | NotApplicable`
//! - [`Message`] / [`StepValue`]: what a measure reports back
//! - [`MeasureResult`]: the finalized record of one invocation
//!
//! Nothing here holds state across invocations.

pub mod defaults;
pub mod types;

pub use types::{
    clean_value_name, ArgumentType, ArgumentValue, MeasureResult, MeasureStatus, Message,
    MessageLevel, StepValue, StepValueKind, UnknownArgumentType,
};
pub use verdant_ids::{RunId, WorkflowId};
