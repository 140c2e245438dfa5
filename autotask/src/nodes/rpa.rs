//! Shared plumbing of the RPA node family.

use std::future::Future;

use once_cell::sync::Lazy;
use tokio::time::Instant;
use tracing::instrument;

use super::NodeContext;
use crate::contract::{DescriptorSet, InputDescriptor, OutputDescriptor, ValueType};
use crate::errors::ActionError;
use crate::guard::should_skip;
use crate::inputs::{NodeInputs, PREVIOUS_RESULT};
use crate::result::{ActionPayload, ActionResult, NodeOutput};

pub const RPA_CATEGORY: &str = "RPA";

/// Descriptors every RPA node inherits.
pub static RPA_BASE: Lazy<DescriptorSet> = Lazy::new(|| {
    DescriptorSet::new()
        .input(
            PREVIOUS_RESULT,
            InputDescriptor::new(
                "Previous Result",
                "Result of the previous node, used to stop the chain after a failure",
                ValueType::Dict,
            ),
        )
        .output(
            "result",
            OutputDescriptor::new("Result", "Result of this node", ValueType::Dict),
        )
});

/// Guard, time and contain one action.
///
/// Skips without calling `body` when the previous step failed. Any error
/// from `body` becomes a failure result whose message starts with
/// `"{action} failed: "`.
#[instrument(skip_all, fields(node_id = %ctx.node_id, action = %action))]
pub(super) async fn run_action<P, F, Fut>(
    action: &str,
    inputs: &NodeInputs,
    ctx: &NodeContext,
    body: F,
) -> NodeOutput
where
    P: ActionPayload,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<P, ActionError>>,
{
    if should_skip(inputs.previous_result()) {
        ctx.log().debug(&format!("{action} skipped, previous step failed"));
        return ActionResult::<P>::skipped().into_output();
    }

    let started = Instant::now();
    let result = match body().await {
        Ok(payload) => ActionResult::succeeded(started.elapsed(), payload),
        Err(e) => {
            let message = format!("{action} failed: {e}");
            ctx.log().error(&message);
            ActionResult::<P>::failed(started.elapsed(), message)
        }
    };
    result.into_output()
}
