//! Argument declarations.
//!
//! An [`Argument`] is immutable once it has been declared into an
//! [`ArgumentSchema`]. Every check that can be made without user input is
//! made at declaration time.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::extract::ArgumentError;
use crate::validation::ValidationIssue;
use crate::{ArgumentType, ArgumentValue};

/// Errors raised while building a schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Argument name must not be empty")]
    EmptyName,

    #[error("Duplicate argument: '{0}'")]
    DuplicateArgument(String),

    #[error("Choice argument '{0}' declares no choices")]
    EmptyChoices(String),

    #[error("Choice argument '{name}' has {choices} choices but {display_names} display names")]
    DisplayNameMismatch {
        name: String,
        choices: usize,
        display_names: usize,
    },

    #[error("Argument '{name}' has an invalid domain: {reason}")]
    InvalidDomain { name: String, reason: String },

    #[error("Argument '{name}' has an invalid default: {reason}")]
    InvalidDefault { name: String, reason: String },
}

/// Closed numeric interval `[low, high]` for integer and double arguments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub low: f64,
    pub high: f64,
}

impl Domain {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// A single declared argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    /// Key used in argument maps (unique within a schema)
    pub name: String,

    /// Human-readable label
    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub arg_type: ArgumentType,

    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ArgumentValue>,

    /// Allowed values for choice arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,

    /// Labels for `choices`, index-aligned (empty = use the choices)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choice_display_names: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,

    /// Path arguments: whether the measure reads (true) or writes the file
    #[serde(default)]
    pub is_read: bool,

    /// Path arguments: expected file extension, without the dot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl Argument {
    /// Create a required argument of the given type.
    pub fn new(name: impl Into<String>, arg_type: ArgumentType) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            description: None,
            arg_type,
            required: true,
            default_value: None,
            choices: Vec::new(),
            choice_display_names: Vec::new(),
            domain: None,
            units: None,
            is_read: false,
            extension: None,
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentType::Boolean)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentType::Integer)
    }

    pub fn double(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentType::Double)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ArgumentType::String)
    }

    pub fn choice<I, S>(name: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut arg = Self::new(name, ArgumentType::Choice);
        arg.choices = choices.into_iter().map(Into::into).collect();
        arg
    }

    pub fn path(name: impl Into<String>, is_read: bool) -> Self {
        let mut arg = Self::new(name, ArgumentType::Path);
        arg.is_read = is_read;
        arg
    }

    /// Mark the argument as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, value: impl Into<ArgumentValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_domain(mut self, low: f64, high: f64) -> Self {
        self.domain = Some(Domain { low, high });
        self
    }

    pub fn with_choice_display_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choice_display_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into().trim_start_matches('.').to_string());
        self
    }

    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }

    /// Resolve a raw choice input (value or display name) to its choice value.
    pub fn resolve_choice(&self, raw: &str) -> Option<&str> {
        if let Some(choice) = self.choices.iter().find(|c| c.as_str() == raw) {
            return Some(choice);
        }
        self.choice_display_names
            .iter()
            .position(|d| d == raw)
            .and_then(|idx| self.choices.get(idx))
            .map(|c| c.as_str())
    }

    /// Convert a raw string to a value of the declared type.
    ///
    /// Booleans accept exactly `true` / `false`. Choices accept a choice value
    /// or its display name and normalize to the choice value.
    pub fn parse_value(&self, raw: &str) -> Result<ArgumentValue, ArgumentError> {
        let unparseable = || ArgumentError::Unparseable {
            name: self.name.clone(),
            arg_type: self.arg_type,
            raw: raw.to_string(),
        };

        match self.arg_type {
            ArgumentType::Boolean => match raw {
                "true" => Ok(ArgumentValue::Boolean(true)),
                "false" => Ok(ArgumentValue::Boolean(false)),
                _ => Err(unparseable()),
            },
            ArgumentType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(ArgumentValue::Integer)
                .map_err(|_| unparseable()),
            ArgumentType::Double => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(ArgumentValue::Double)
                .ok_or_else(unparseable),
            ArgumentType::String => Ok(ArgumentValue::String(raw.to_string())),
            ArgumentType::Choice => self
                .resolve_choice(raw)
                .map(|c| ArgumentValue::String(c.to_string()))
                .ok_or_else(unparseable),
            ArgumentType::Path => {
                if raw.trim().is_empty() {
                    Err(unparseable())
                } else {
                    Ok(ArgumentValue::Path(PathBuf::from(raw)))
                }
            }
        }
    }

    /// Check a concrete value against the declaration (type, choices, domain).
    pub(crate) fn check_value(&self, value: &ArgumentValue) -> Option<ValidationIssue> {
        if !value.fits(self.arg_type) {
            return Some(ValidationIssue::TypeMismatch {
                name: self.name.clone(),
                expected: self.arg_type,
                got: value.kind().to_string(),
            });
        }

        if let ArgumentValue::Double(v) = value {
            if !v.is_finite() {
                return Some(ValidationIssue::NotFinite {
                    name: self.name.clone(),
                });
            }
        }

        if self.arg_type == ArgumentType::Choice {
            let selected = value.as_str().unwrap_or_default();
            if !self.choices.iter().any(|c| c == selected) {
                return Some(ValidationIssue::NotAChoice {
                    name: self.name.clone(),
                    value: selected.to_string(),
                    choices: self.choices.clone(),
                });
            }
        }

        if let (Some(domain), Some(numeric)) = (self.domain, value.as_f64()) {
            if !domain.contains(numeric) {
                return Some(ValidationIssue::OutOfDomain {
                    name: self.name.clone(),
                    value: numeric,
                    low: domain.low,
                    high: domain.high,
                });
            }
        }

        None
    }

    fn check_declaration(&self) -> Result<(), SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyName);
        }

        if self.arg_type == ArgumentType::Choice {
            if self.choices.is_empty() {
                return Err(SchemaError::EmptyChoices(self.name.clone()));
            }
            if !self.choice_display_names.is_empty()
                && self.choice_display_names.len() != self.choices.len()
            {
                return Err(SchemaError::DisplayNameMismatch {
                    name: self.name.clone(),
                    choices: self.choices.len(),
                    display_names: self.choice_display_names.len(),
                });
            }
        }

        if let Some(domain) = self.domain {
            if !self.arg_type.is_numeric() {
                return Err(SchemaError::InvalidDomain {
                    name: self.name.clone(),
                    reason: format!("{} arguments do not take a numeric domain", self.arg_type),
                });
            }
            if domain.low.is_nan() || domain.high.is_nan() || domain.low > domain.high {
                return Err(SchemaError::InvalidDomain {
                    name: self.name.clone(),
                    reason: format!("[{}, {}] is empty", domain.low, domain.high),
                });
            }
        }

        if let Some(default) = &self.default_value {
            if let Some(issue) = self.check_value(default) {
                return Err(SchemaError::InvalidDefault {
                    name: self.name.clone(),
                    reason: issue.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// The ordered set of arguments a measure accepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentSchema {
    arguments: Vec<Argument>,
}

impl ArgumentSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one argument.
    pub fn declare(&mut self, argument: Argument) -> Result<(), SchemaError> {
        argument.check_declaration()?;
        if self.get(&argument.name).is_some() {
            return Err(SchemaError::DuplicateArgument(argument.name));
        }
        self.arguments.push(argument);
        Ok(())
    }

    /// Builder form of [`declare`](Self::declare).
    pub fn with(mut self, argument: Argument) -> Result<Self, SchemaError> {
        self.declare(argument)?;
        Ok(self)
    }

    /// Declared arguments in declaration order.
    pub fn list(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn get(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name == name)
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arguments.iter().map(|a| a.name.as_str())
    }

    /// Parse a raw string for the named argument.
    pub fn parse_value(&self, name: &str, raw: &str) -> Result<ArgumentValue, ArgumentError> {
        self.get(name)
            .ok_or_else(|| ArgumentError::Unknown(name.to_string()))?
            .parse_value(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_preserves_order() {
        let schema = ArgumentSchema::new()
            .with(Argument::double("b"))
            .unwrap()
            .with(Argument::boolean("a"))
            .unwrap();
        let names: Vec<&str> = schema.names().collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut schema = ArgumentSchema::new();
        schema.declare(Argument::double("pct")).unwrap();
        let err = schema.declare(Argument::integer("pct")).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateArgument("pct".to_string()));
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = ArgumentSchema::new().with(Argument::string("  ")).unwrap_err();
        assert_eq!(err, SchemaError::EmptyName);
    }

    #[test]
    fn test_choice_requires_choices() {
        let err = ArgumentSchema::new()
            .with(Argument::choice("facade", Vec::<String>::new()))
            .unwrap_err();
        assert!(matches!(err, SchemaError::EmptyChoices(_)));
    }

    #[test]
    fn test_display_names_must_align() {
        let err = ArgumentSchema::new()
            .with(Argument::choice("facade", ["N", "S"]).with_choice_display_names(["North"]))
            .unwrap_err();
        assert!(matches!(err, SchemaError::DisplayNameMismatch { choices: 2, display_names: 1, .. }));
    }

    #[test]
    fn test_default_must_match_type() {
        let err = ArgumentSchema::new()
            .with(Argument::integer("count").with_default(1.5))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefault { .. }));
    }

    #[test]
    fn test_default_must_be_a_choice() {
        let err = ArgumentSchema::new()
            .with(Argument::choice("facade", ["North", "South"]).with_default("Up"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefault { .. }));
    }

    #[test]
    fn test_default_must_be_in_domain() {
        let err = ArgumentSchema::new()
            .with(Argument::double("pct").with_domain(0.0, 100.0).with_default(120.0))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefault { .. }));
    }

    #[test]
    fn test_domain_only_for_numbers() {
        let err = ArgumentSchema::new()
            .with(Argument::string("label").with_domain(0.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDomain { .. }));

        let err = ArgumentSchema::new()
            .with(Argument::double("x").with_domain(2.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDomain { .. }));
    }

    #[test]
    fn test_integer_default_for_double() {
        let schema = ArgumentSchema::new()
            .with(Argument::double("pct").with_default(30i64))
            .unwrap();
        assert!(schema.get("pct").unwrap().has_default());
    }

    #[test]
    fn test_parse_boolean_is_strict() {
        let arg = Argument::boolean("flag");
        assert_eq!(arg.parse_value("true").unwrap(), ArgumentValue::Boolean(true));
        assert_eq!(arg.parse_value("false").unwrap(), ArgumentValue::Boolean(false));
        assert!(arg.parse_value("yes").is_err());
        assert!(arg.parse_value("True").is_err());
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(
            Argument::integer("n").parse_value(" 42 ").unwrap(),
            ArgumentValue::Integer(42)
        );
        assert!(Argument::integer("n").parse_value("4.2").is_err());
        assert_eq!(
            Argument::double("x").parse_value("4.5").unwrap(),
            ArgumentValue::Double(4.5)
        );
        assert!(Argument::double("x").parse_value("NaN").is_err());
    }

    #[test]
    fn test_parse_choice_accepts_display_name() {
        let arg = Argument::choice("facade", ["N", "S"]).with_choice_display_names(["North", "South"]);
        assert_eq!(arg.parse_value("S").unwrap(), ArgumentValue::String("S".to_string()));
        assert_eq!(arg.parse_value("North").unwrap(), ArgumentValue::String("N".to_string()));
        assert!(arg.parse_value("East").is_err());
    }

    #[test]
    fn test_parse_path_rejects_empty() {
        let arg = Argument::path("weather", true).with_extension(".epw");
        assert_eq!(arg.extension.as_deref(), Some("epw"));
        assert!(arg.parse_value("").is_err());
        assert_eq!(
            arg.parse_value("a/b.epw").unwrap(),
            ArgumentValue::Path(PathBuf::from("a/b.epw"))
        );
    }

    #[test]
    fn test_schema_parse_unknown_name() {
        let schema = ArgumentSchema::new();
        assert_eq!(
            schema.parse_value("nope", "1").unwrap_err(),
            ArgumentError::Unknown("nope".to_string())
        );
    }
}
