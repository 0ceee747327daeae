//! Completeness and type checks for one invocation's values.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::ArgumentSchema;
use crate::values::ArgumentMap;
use crate::ArgumentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// One problem found while validating an [`ArgumentMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// Required argument with no default was not supplied
    Missing { name: String },

    TypeMismatch {
        name: String,
        expected: ArgumentType,
        got: String,
    },

    NotAChoice {
        name: String,
        value: String,
        choices: Vec<String>,
    },

    /// NaN or infinite double
    NotFinite { name: String },

    OutOfDomain {
        name: String,
        value: f64,
        low: f64,
        high: f64,
    },

    /// Supplied value with no matching declared argument
    Unrecognized { name: String },
}

impl ValidationIssue {
    pub fn severity(&self) -> IssueSeverity {
        match self {
            ValidationIssue::Unrecognized { .. } => IssueSeverity::Warning,
            _ => IssueSeverity::Error,
        }
    }

    /// Name of the argument the issue is about.
    pub fn argument(&self) -> &str {
        match self {
            ValidationIssue::Missing { name }
            | ValidationIssue::TypeMismatch { name, .. }
            | ValidationIssue::NotAChoice { name, .. }
            | ValidationIssue::NotFinite { name }
            | ValidationIssue::OutOfDomain { name, .. }
            | ValidationIssue::Unrecognized { name } => name,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::Missing { name } => {
                write!(f, "Required argument '{}' was not supplied and has no default", name)
            }
            ValidationIssue::TypeMismatch { name, expected, got } => {
                write!(f, "Argument '{}' expects {} but got {}", name, expected, got)
            }
            ValidationIssue::NotAChoice { name, value, choices } => write!(
                f,
                "Argument '{}' value '{}' is not one of [{}]",
                name,
                value,
                choices.join(", ")
            ),
            ValidationIssue::NotFinite { name } => {
                write!(f, "Argument '{}' must be a finite number", name)
            }
            ValidationIssue::OutOfDomain { name, value, low, high } => write!(
                f,
                "Argument '{}' value {} is outside [{}, {}]",
                name, value, low, high
            ),
            ValidationIssue::Unrecognized { name } => {
                write!(f, "Ignoring unrecognized argument '{}'", name)
            }
        }
    }
}

/// Outcome of validating one [`ArgumentMap`] against a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// True when no error-severity issue was found. Warnings do not fail.
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity() == IssueSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity() == IssueSeverity::Warning)
    }
}

impl ArgumentSchema {
    /// Check `values` against every declared argument. Never mutates.
    pub fn validate(&self, values: &ArgumentMap) -> ValidationReport {
        let mut issues = Vec::new();

        for arg in self.list() {
            match values.get(&arg.name) {
                Some(value) => {
                    if let Some(issue) = arg.check_value(value) {
                        issues.push(issue);
                    }
                }
                None => {
                    if arg.required && !arg.has_default() {
                        issues.push(ValidationIssue::Missing {
                            name: arg.name.clone(),
                        });
                    }
                }
            }
        }

        for (name, _) in values.iter() {
            if self.get(name).is_none() {
                issues.push(ValidationIssue::Unrecognized {
                    name: name.to_string(),
                });
            }
        }

        ValidationReport { issues }
    }
}

/// Free-function form of [`ArgumentSchema::validate`].
pub fn validate(schema: &ArgumentSchema, values: &ArgumentMap) -> ValidationReport {
    schema.validate(values)
}
