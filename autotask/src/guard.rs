//! Failure-chain guard.
//!
//! Every RPA node checks the result of the step before it. Only an explicit
//! `"success": false` stops the chain; a missing result, or one without a
//! boolean `success`, counts as success.

use serde_json::Value;

pub const SKIP_MESSAGE: &str = "previous step failed, current node skipped";

/// Returns true when the previous step reported an explicit failure.
pub fn should_skip(previous_result: Option<&Value>) -> bool {
    previous_result
        .and_then(|result| result.get("success"))
        .and_then(Value::as_bool)
        == Some(false)
}
