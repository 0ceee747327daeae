//! Core measure protocol types.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;
use verdant_ids::RunId;

// ============================================================================
// Arguments
// ============================================================================

/// Declared type of a measure argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentType {
    Boolean,
    Integer,
    Double,
    String,
    /// String restricted to an enumerated set of choices
    Choice,
    Path,
}

impl ArgumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgumentType::Boolean => "boolean",
            ArgumentType::Integer => "integer",
            ArgumentType::Double => "double",
            ArgumentType::String => "string",
            ArgumentType::Choice => "choice",
            ArgumentType::Path => "path",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ArgumentType::Integer | ArgumentType::Double)
    }
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an argument type name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown argument type: '{0}'")]
pub struct UnknownArgumentType(pub String);

impl FromStr for ArgumentType {
    type Err = UnknownArgumentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Ok(ArgumentType::Boolean),
            "integer" | "int" => Ok(ArgumentType::Integer),
            "double" | "float" => Ok(ArgumentType::Double),
            "string" => Ok(ArgumentType::String),
            "choice" => Ok(ArgumentType::Choice),
            "path" => Ok(ArgumentType::Path),
            other => Err(UnknownArgumentType(other.to_string())),
        }
    }
}

/// A concrete value supplied for (or defaulted into) one argument.
///
/// Choice arguments carry their selected value as `String`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ArgumentValue {
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Path(PathBuf),
}

impl ArgumentValue {
    /// Name of the value's own kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ArgumentValue::Boolean(_) => "boolean",
            ArgumentValue::Integer(_) => "integer",
            ArgumentValue::Double(_) => "double",
            ArgumentValue::String(_) => "string",
            ArgumentValue::Path(_) => "path",
        }
    }

    /// Whether this value can stand in for an argument of `arg_type`.
    ///
    /// Integers are accepted where doubles are declared; strings are accepted
    /// for choices (membership is checked separately).
    pub fn fits(&self, arg_type: ArgumentType) -> bool {
        matches!(
            (self, arg_type),
            (ArgumentValue::Boolean(_), ArgumentType::Boolean)
                | (ArgumentValue::Integer(_), ArgumentType::Integer)
                | (ArgumentValue::Integer(_), ArgumentType::Double)
                | (ArgumentValue::Double(_), ArgumentType::Double)
                | (ArgumentValue::String(_), ArgumentType::String)
                | (ArgumentValue::String(_), ArgumentType::Choice)
                | (ArgumentValue::Path(_), ArgumentType::Path)
        )
    }

    /// Numeric view used for domain checks.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgumentValue::Integer(v) => Some(*v as f64),
            ArgumentValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgumentValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ArgumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentValue::Boolean(v) => write!(f, "{}", v),
            ArgumentValue::Integer(v) => write!(f, "{}", v),
            ArgumentValue::Double(v) => write!(f, "{}", v),
            ArgumentValue::String(v) => write!(f, "{}", v),
            ArgumentValue::Path(v) => write!(f, "{}", v.display()),
        }
    }
}

impl From<bool> for ArgumentValue {
    fn from(value: bool) -> Self {
        ArgumentValue::Boolean(value)
    }
}

impl From<i64> for ArgumentValue {
    fn from(value: i64) -> Self {
        ArgumentValue::Integer(value)
    }
}

impl From<i32> for ArgumentValue {
    fn from(value: i32) -> Self {
        ArgumentValue::Integer(i64::from(value))
    }
}

impl From<f64> for ArgumentValue {
    fn from(value: f64) -> Self {
        ArgumentValue::Double(value)
    }
}

impl From<&str> for ArgumentValue {
    fn from(value: &str) -> Self {
        ArgumentValue::String(value.to_string())
    }
}

impl From<String> for ArgumentValue {
    fn from(value: String) -> Self {
        ArgumentValue::String(value)
    }
}

impl From<PathBuf> for ArgumentValue {
    fn from(value: PathBuf) -> Self {
        ArgumentValue::Path(value)
    }
}

// ============================================================================
// Status
// ============================================================================

/// Lifecycle status of a single measure invocation.
///
/// `Running` is the only non-terminal state. A finished invocation is exactly
/// one of the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureStatus {
    Running,
    Success,
    Fail,
    NotApplicable,
}

impl MeasureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureStatus::Running => "running",
            MeasureStatus::Success => "success",
            MeasureStatus::Fail => "fail",
            MeasureStatus::NotApplicable => "not_applicable",
        }
    }

    /// NotApplicable is not a failure: a pipeline continues past it.
    pub fn continues_pipeline(&self) -> bool {
        matches!(self, MeasureStatus::Success | MeasureStatus::NotApplicable)
    }
}

impl fmt::Display for MeasureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

impl MessageLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageLevel::Info => "info",
            MessageLevel::Warning => "warning",
            MessageLevel::Error => "error",
        }
    }
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified message registered during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

// ============================================================================
// Step values
// ============================================================================

/// Payload of a registered step value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepValueKind {
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
}

impl StepValueKind {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StepValueKind::Integer(v) => Some(*v as f64),
            StepValueKind::Double(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for StepValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepValueKind::Boolean(v) => write!(f, "{}", v),
            StepValueKind::Integer(v) => write!(f, "{}", v),
            StepValueKind::Double(v) => write!(f, "{}", v),
            StepValueKind::String(v) => write!(f, "{}", v),
        }
    }
}

impl From<&ArgumentValue> for StepValueKind {
    fn from(value: &ArgumentValue) -> Self {
        match value {
            ArgumentValue::Boolean(v) => StepValueKind::Boolean(*v),
            ArgumentValue::Integer(v) => StepValueKind::Integer(*v),
            ArgumentValue::Double(v) => StepValueKind::Double(*v),
            ArgumentValue::String(v) => StepValueKind::String(v.clone()),
            ArgumentValue::Path(v) => StepValueKind::String(v.display().to_string()),
        }
    }
}

impl From<bool> for StepValueKind {
    fn from(value: bool) -> Self {
        StepValueKind::Boolean(value)
    }
}

impl From<i64> for StepValueKind {
    fn from(value: i64) -> Self {
        StepValueKind::Integer(value)
    }
}

impl From<i32> for StepValueKind {
    fn from(value: i32) -> Self {
        StepValueKind::Integer(i64::from(value))
    }
}

impl From<usize> for StepValueKind {
    fn from(value: usize) -> Self {
        StepValueKind::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for StepValueKind {
    fn from(value: f64) -> Self {
        StepValueKind::Double(value)
    }
}

impl From<&str> for StepValueKind {
    fn from(value: &str) -> Self {
        StepValueKind::String(value.to_string())
    }
}

impl From<String> for StepValueKind {
    fn from(value: String) -> Self {
        StepValueKind::String(value)
    }
}

/// A named output value registered by a measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepValue {
    /// Normalized name (see [`clean_value_name`])
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub value: StepValueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl StepValue {
    /// Create a step value; the name is normalized.
    pub fn new(name: &str, value: StepValueKind) -> Self {
        Self {
            name: clean_value_name(name),
            display_name: None,
            value,
            units: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }
}

fn value_name_patterns() -> &'static [(Regex, &'static str); 6] {
    static PATTERNS: OnceLock<[(Regex, &'static str); 6]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (Regex::new(r"[^0-9a-zA-Z]").unwrap(), "_"),
            (Regex::new(r"^_+").unwrap(), ""),
            (Regex::new(r"_+$").unwrap(), ""),
            (Regex::new(r"^([0-9])").unwrap(), "_${1}"),
            (Regex::new(r"([a-z0-9])([A-Z])").unwrap(), "${1}_${2}"),
            (Regex::new(r"_+").unwrap(), "_"),
        ]
    })
}

/// Normalize a step value name to a stable snake_case identifier.
///
/// `"Total Floor Area"` -> `"total_floor_area"`,
/// `"2ndFloor"` -> `"_2nd_floor"`.
pub fn clean_value_name(name: &str) -> String {
    let mut result = name.to_string();
    for (pattern, replacement) in value_name_patterns().iter() {
        result = pattern.replace_all(&result, *replacement).into_owned();
    }
    result.to_lowercase()
}

// ============================================================================
// Result
// ============================================================================

/// The finalized record of one measure invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureResult {
    pub run_id: RunId,
    pub measure_name: String,
    pub status: MeasureStatus,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_condition: Option<String>,
    #[serde(default)]
    pub values: Vec<StepValue>,
    /// Completed-status label when the measure asked its workflow to halt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halt: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl MeasureResult {
    fn messages_at(&self, level: MessageLevel) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(move |m| m.level == level)
            .map(|m| m.text.as_str())
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.messages_at(MessageLevel::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.messages_at(MessageLevel::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &str> {
        self.messages_at(MessageLevel::Info)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Look up a registered step value by (normalized) name.
    pub fn value(&self, name: &str) -> Option<&StepValueKind> {
        let name = clean_value_name(name);
        self.values.iter().find(|v| v.name == name).map(|v| &v.value)
    }

    pub fn duration_ms(&self) -> i64 {
        (self.completed_at - self.started_at).num_milliseconds()
    }
}
