//! The uniform result every automation node hands to the next one.
//!
//! A result is either a success carrying a kind-specific payload, or a
//! failure whose payload is the payload type's `Default` (the absent
//! sentinel: `None`, `false`). The constructors are the only way to build
//! one, so payload presence always follows `success`.

use std::time::Duration;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::guard::SKIP_MESSAGE;

/// JSON object a node returns to the host engine.
pub type NodeOutput = Map<String, Value>;

/// Kind-specific fields attached to an [`ActionResult`].
///
/// `Default` must produce the "not applicable" form of every field.
pub trait ActionPayload: Serialize + Default {}

impl<T: Serialize + Default> ActionPayload for T {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult<P: ActionPayload> {
    pub success: bool,
    pub error_message: String,
    #[serde(serialize_with = "as_seconds")]
    pub execution_time: Duration,
    #[serde(flatten)]
    pub payload: P,
}

impl<P: ActionPayload> ActionResult<P> {
    pub fn succeeded(execution_time: Duration, payload: P) -> Self {
        Self {
            success: true,
            error_message: String::new(),
            execution_time,
            payload,
        }
    }

    pub fn failed(execution_time: Duration, error_message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: error_message.into(),
            execution_time,
            payload: P::default(),
        }
    }

    /// Result of a node short-circuited by the failure-chain guard.
    pub fn skipped() -> Self {
        Self::failed(Duration::ZERO, SKIP_MESSAGE)
    }

    /// Serialize into the object handed back to the host engine.
    pub fn into_output(self) -> NodeOutput {
        match serde_json::to_value(&self) {
            Ok(Value::Object(map)) => map,
            // Payloads are plain structs; keep the status fields if one ever isn't.
            _ => {
                let mut map = Map::new();
                map.insert("success".into(), Value::Bool(self.success));
                map.insert("error_message".into(), Value::String(self.error_message));
                map.insert(
                    "execution_time".into(),
                    Value::from(self.execution_time.as_secs_f64()),
                );
                map
            }
        }
    }
}

fn as_seconds<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Screen coordinates in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClickPayload {
    pub click_position: Option<Point>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageClickPayload {
    pub image_found: bool,
    pub click_position: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextInfo {
    pub content: String,
    /// Length in characters, not bytes.
    pub length: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextPayload {
    pub text_info: Option<TextInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyInfo {
    pub key: String,
    pub modifiers: Vec<String>,
    pub presses: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeyPayload {
    pub key_info: Option<KeyInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessInfo {
    pub application_path: String,
    /// RFC 3339 timestamp taken when the launch began.
    pub start_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaunchPayload {
    pub process_info: Option<ProcessInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_clears_payload() {
        let result: ActionResult<ImageClickPayload> =
            ActionResult::failed(Duration::from_millis(1500), "boom");
        let output = result.into_output();

        assert_eq!(output["success"], false);
        assert_eq!(output["error_message"], "boom");
        assert_eq!(output["execution_time"], 1.5);
        assert_eq!(output["image_found"], false);
        assert_eq!(output["click_position"], Value::Null);
    }

    #[test]
    fn test_success_flattens_payload() {
        let result = ActionResult::succeeded(
            Duration::from_millis(250),
            ClickPayload {
                click_position: Some(Point::new(10, 20)),
            },
        );
        let output = result.into_output();

        assert_eq!(output["success"], true);
        assert_eq!(output["error_message"], "");
        assert_eq!(output["click_position"], json!({ "x": 10, "y": 20 }));
    }

    #[test]
    fn test_skipped_is_instant_failure() {
        let result: ActionResult<KeyPayload> = ActionResult::skipped();

        assert!(!result.success);
        assert_eq!(result.error_message, SKIP_MESSAGE);
        assert_eq!(result.execution_time, Duration::ZERO);
        assert_eq!(result.payload, KeyPayload::default());
    }
}
