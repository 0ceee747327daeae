//! Per-invocation argument values.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::extract::ArgumentError;
use crate::schema::ArgumentSchema;
use crate::{ArgumentType, ArgumentValue};

/// Values supplied for one run, keyed by argument name.
///
/// Names that the schema does not declare are kept as strings so that
/// validation can report them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentMap {
    values: BTreeMap<String, ArgumentValue>,
}

impl ArgumentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ArgumentValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgumentValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ArgumentValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgumentValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a map from `name=value` strings, parsing each against the schema.
    pub fn from_assignments<I, S>(schema: &ArgumentSchema, assignments: I) -> Result<Self, ArgumentError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let (name, raw) = assignment
                .split_once('=')
                .map(|(n, r)| (n.trim(), r))
                .filter(|(n, _)| !n.is_empty())
                .ok_or_else(|| ArgumentError::MalformedAssignment(assignment.to_string()))?;

            let value = match schema.get(name) {
                Some(arg) => arg.parse_value(raw)?,
                None => ArgumentValue::String(raw.to_string()),
            };
            map.insert(name, value);
        }
        Ok(map)
    }

    /// Build a map from a JSON object of plain scalars.
    ///
    /// Strings go through the declared argument's parser. Numbers become
    /// integers or doubles according to the declared type. Values of the
    /// wrong shape are kept as-is so validation reports them.
    pub fn from_json(
        schema: &ArgumentSchema,
        object: &serde_json::Map<String, JsonValue>,
    ) -> Result<Self, ArgumentError> {
        let mut map = Self::new();
        for (name, json) in object {
            let declared = schema.get(name);
            let value = match (json, declared) {
                (JsonValue::String(raw), Some(arg)) => arg.parse_value(raw)?,
                (JsonValue::String(raw), None) => ArgumentValue::String(raw.clone()),
                (JsonValue::Bool(v), _) => ArgumentValue::Boolean(*v),
                (JsonValue::Number(n), Some(arg))
                    if matches!(arg.arg_type, ArgumentType::String | ArgumentType::Choice) =>
                {
                    arg.parse_value(&n.to_string())?
                }
                (JsonValue::Number(n), Some(arg)) if arg.arg_type == ArgumentType::Double => {
                    ArgumentValue::Double(n.as_f64().unwrap_or(f64::NAN))
                }
                (JsonValue::Number(n), _) => match n.as_i64() {
                    Some(v) => ArgumentValue::Integer(v),
                    None => ArgumentValue::Double(n.as_f64().unwrap_or(f64::NAN)),
                },
                (other, Some(arg)) => {
                    return Err(ArgumentError::Unparseable {
                        name: name.clone(),
                        arg_type: arg.arg_type,
                        raw: other.to_string(),
                    })
                }
                (other, None) => ArgumentValue::String(other.to_string()),
            };
            map.insert(name.clone(), value);
        }
        Ok(map)
    }
}

impl FromIterator<(String, ArgumentValue)> for ArgumentMap {
    fn from_iter<T: IntoIterator<Item = (String, ArgumentValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
