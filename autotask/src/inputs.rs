//! Typed access to the resolved inputs a host engine passes to a node.
//!
//! Inputs are a JSON object. A `null` value reads the same as a missing
//! key. Numeric inputs also accept numeric strings, since chain files and
//! template engines often hand everything over as text.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::errors::InputError;

/// Name of the input carrying the previous node's result.
pub const PREVIOUS_RESULT: &str = "previous_result";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeInputs(Map<String, Value>);

impl NodeInputs {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn from_value(value: Value) -> Result<Self, InputError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(InputError::WrongType {
                name: "inputs".to_string(),
                expected: "object",
                actual: type_name(&other).to_string(),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn previous_result(&self) -> Option<&Value> {
        self.get(PREVIOUS_RESULT)
    }

    pub fn require(&self, name: &str) -> Result<&Value, InputError> {
        self.get(name)
            .ok_or_else(|| InputError::Missing(name.to_string()))
    }

    pub fn require_i64(&self, name: &str) -> Result<i64, InputError> {
        as_i64(name, self.require(name)?)
    }

    /// A screen coordinate.
    pub fn require_i32(&self, name: &str) -> Result<i32, InputError> {
        let n = self.require_i64(name)?;
        i32::try_from(n).map_err(|_| InputError::WrongType {
            name: name.to_string(),
            expected: "32-bit integer",
            actual: n.to_string(),
        })
    }

    pub fn i64_or(&self, name: &str, default: i64) -> Result<i64, InputError> {
        self.get(name).map_or(Ok(default), |v| as_i64(name, v))
    }

    pub fn f64_or(&self, name: &str, default: f64) -> Result<f64, InputError> {
        self.get(name).map_or(Ok(default), |v| as_f64(name, v))
    }

    /// A non-negative number of seconds.
    pub fn seconds_or(&self, name: &str, default: f64) -> Result<Duration, InputError> {
        let secs = self.f64_or(name, default)?;
        Duration::try_from_secs_f64(secs).map_err(|_| InputError::WrongType {
            name: name.to_string(),
            expected: "non-negative seconds",
            actual: secs.to_string(),
        })
    }

    /// A count that must be at least zero and fit in `u32`.
    pub fn count_or(&self, name: &str, default: u32) -> Result<u32, InputError> {
        let n = self.i64_or(name, i64::from(default))?;
        u32::try_from(n).map_err(|_| InputError::WrongType {
            name: name.to_string(),
            expected: "non-negative count",
            actual: n.to_string(),
        })
    }

    pub fn require_str(&self, name: &str) -> Result<&str, InputError> {
        as_str(name, self.require(name)?)
    }

    pub fn str_or<'a>(&'a self, name: &str, default: &'a str) -> Result<&'a str, InputError> {
        self.get(name).map_or(Ok(default), |v| as_str(name, v))
    }
}

impl From<Map<String, Value>> for NodeInputs {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn as_i64(name: &str, value: &Value) -> Result<i64, InputError> {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| wrong_type(name, "integer", value))
}

fn as_f64(name: &str, value: &Value) -> Result<f64, InputError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| wrong_type(name, "number", value))
}

fn as_str<'a>(name: &str, value: &'a Value) -> Result<&'a str, InputError> {
    value
        .as_str()
        .ok_or_else(|| wrong_type(name, "string", value))
}

fn wrong_type(name: &str, expected: &'static str, value: &Value) -> InputError {
    InputError::WrongType {
        name: name.to_string(),
        expected,
        actual: value.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
