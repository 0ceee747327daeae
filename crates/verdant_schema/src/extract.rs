//! Typed extraction with default fallback.

use std::path::PathBuf;
use thiserror::Error;

use crate::schema::ArgumentSchema;
use crate::values::ArgumentMap;
use crate::{ArgumentType, ArgumentValue};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgumentError {
    #[error("Unknown argument: '{0}'")]
    Unknown(String),

    #[error("Argument '{0}' was not supplied and has no default")]
    Missing(String),

    #[error("Argument '{name}' holds a {got} value, cannot read it as {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("Cannot parse '{raw}' as {arg_type} for argument '{name}'")]
    Unparseable {
        name: String,
        arg_type: ArgumentType,
        raw: String,
    },

    #[error("Malformed assignment '{0}', expected name=value")]
    MalformedAssignment(String),
}

/// Conversion from a stored [`ArgumentValue`] into a Rust type.
pub trait FromArgumentValue: Sized {
    /// Label used in mismatch errors.
    const EXPECTED: &'static str;

    fn from_argument_value(value: &ArgumentValue) -> Option<Self>;
}

impl FromArgumentValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_argument_value(value: &ArgumentValue) -> Option<Self> {
        match value {
            ArgumentValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromArgumentValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_argument_value(value: &ArgumentValue) -> Option<Self> {
        match value {
            ArgumentValue::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromArgumentValue for i32 {
    const EXPECTED: &'static str = "32-bit integer";

    fn from_argument_value(value: &ArgumentValue) -> Option<Self> {
        match value {
            ArgumentValue::Integer(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl FromArgumentValue for f64 {
    const EXPECTED: &'static str = "double";

    fn from_argument_value(value: &ArgumentValue) -> Option<Self> {
        value.as_f64()
    }
}

impl FromArgumentValue for String {
    const EXPECTED: &'static str = "string";

    fn from_argument_value(value: &ArgumentValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromArgumentValue for PathBuf {
    const EXPECTED: &'static str = "path";

    fn from_argument_value(value: &ArgumentValue) -> Option<Self> {
        match value {
            ArgumentValue::Path(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl ArgumentSchema {
    /// Supplied value, or the declared default when absent.
    fn effective<'v>(
        &'v self,
        values: &'v ArgumentMap,
        name: &str,
    ) -> Result<Option<&'v ArgumentValue>, ArgumentError> {
        let arg = self
            .get(name)
            .ok_or_else(|| ArgumentError::Unknown(name.to_string()))?;
        Ok(values.get(name).or(arg.default_value.as_ref()))
    }

    /// Typed value for `name`, falling back to the declared default.
    pub fn get_value<T: FromArgumentValue>(
        &self,
        values: &ArgumentMap,
        name: &str,
    ) -> Result<T, ArgumentError> {
        self.get_optional(values, name)?
            .ok_or_else(|| ArgumentError::Missing(name.to_string()))
    }

    /// As [`get_value`](Self::get_value), but absent with no default is `None`.
    pub fn get_optional<T: FromArgumentValue>(
        &self,
        values: &ArgumentMap,
        name: &str,
    ) -> Result<Option<T>, ArgumentError> {
        match self.effective(values, name)? {
            None => Ok(None),
            Some(value) => T::from_argument_value(value)
                .map(Some)
                .ok_or_else(|| ArgumentError::TypeMismatch {
                    name: name.to_string(),
                    expected: T::EXPECTED,
                    got: value.kind(),
                }),
        }
    }

    /// Effective value of every argument, in declaration order.
    ///
    /// Optional arguments with neither a value nor a default are omitted.
    pub fn resolved(&self, values: &ArgumentMap) -> Vec<(&str, ArgumentValue)> {
        self.list()
            .iter()
            .filter_map(|arg| {
                values
                    .get(&arg.name)
                    .or(arg.default_value.as_ref())
                    .map(|v| (arg.name.as_str(), v.clone()))
            })
            .collect()
    }
}

/// The arguments handed to a running measure: its schema plus this run's values.
#[derive(Debug, Clone, Copy)]
pub struct Arguments<'a> {
    pub schema: &'a ArgumentSchema,
    pub values: &'a ArgumentMap,
}

impl<'a> Arguments<'a> {
    pub fn new(schema: &'a ArgumentSchema, values: &'a ArgumentMap) -> Self {
        Self { schema, values }
    }

    pub fn get<T: FromArgumentValue>(&self, name: &str) -> Result<T, ArgumentError> {
        self.schema.get_value(self.values, name)
    }

    pub fn get_optional<T: FromArgumentValue>(
        &self,
        name: &str,
    ) -> Result<Option<T>, ArgumentError> {
        self.schema.get_optional(self.values, name)
    }

    /// Whether the caller supplied `name` explicitly (defaults do not count).
    pub fn is_supplied(&self, name: &str) -> bool {
        self.values.contains(name)
    }
}
