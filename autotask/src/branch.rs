//! Truthiness and two-way branch selection.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::errors::ConditionError;

/// Output key holding the evaluated condition.
pub const CONDITION_RESULT: &str = "condition_result";

/// One of the two downstream edges of a conditional node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    TrueBranch,
    FalseBranch,
}

impl Branch {
    pub fn as_str(self) -> &'static str {
        match self {
            Branch::TrueBranch => "true_branch",
            Branch::FalseBranch => "false_branch",
        }
    }

    /// `None` (evaluation failed) selects the false branch.
    pub fn from_condition(condition: Option<bool>) -> Self {
        if condition == Some(true) {
            Branch::TrueBranch
        } else {
            Branch::FalseBranch
        }
    }

    /// Read the branch out of a condition node's outputs.
    pub fn from_outputs(outputs: &serde_json::Map<String, Value>) -> Self {
        Self::from_condition(outputs.get(CONDITION_RESULT).and_then(Value::as_bool))
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Empty-like values are false; everything else is true.
///
/// Absent and `null` are false, as are `false`, numeric zero, the empty
/// string, and empty arrays and objects.
pub fn is_truthy(value: Option<&Value>) -> Result<bool, ConditionError> {
    let truthy = match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i != 0
            } else if let Some(u) = n.as_u64() {
                u != 0
            } else {
                // serde_json only stores finite floats, so this arm is
                // reached only if `arbitrary_precision` is enabled.
                match n.as_f64() {
                    Some(f) if f.is_finite() => f != 0.0,
                    _ => return Err(ConditionError::UnrepresentableNumber(n.to_string())),
                }
            }
        }
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    };
    Ok(truthy)
}
