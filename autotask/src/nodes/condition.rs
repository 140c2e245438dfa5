use once_cell::sync::Lazy;
use serde_json::Value;

use super::{ConditionalNode, Node, NodeContext};
use crate::branch::{is_truthy, Branch, CONDITION_RESULT};
use crate::contract::{DescriptorSet, InputDescriptor, NodeContract, OutputDescriptor, ValueType};
use crate::inputs::NodeInputs;
use crate::result::NodeOutput;

static CONTRACT: Lazy<NodeContract> = Lazy::new(|| {
    NodeContract::compose(
        "Condition",
        "Check whether the input value is truthy and follow the matching branch",
        "Control Flow",
        &[],
        DescriptorSet::new()
            .input(
                "value",
                InputDescriptor::new(
                    "Value",
                    "Value to test; non-empty, non-zero and not false takes the true branch",
                    ValueType::Any,
                )
                .required(),
            )
            .output(
                Branch::TrueBranch.as_str(),
                OutputDescriptor::new("True", "Taken when the value is truthy", ValueType::Any),
            )
            .output(
                Branch::FalseBranch.as_str(),
                OutputDescriptor::new("False", "Taken otherwise", ValueType::Any),
            ),
    )
});

/// Two-way branch on the truthiness of `value`.
///
/// Outputs `{"condition_result": bool}`, or `null` when the value could not
/// be evaluated. A `null` result takes the false branch.
#[derive(Debug, Default)]
pub struct ConditionNode;

impl ConditionNode {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Node for ConditionNode {
    fn kind(&self) -> &'static str {
        "condition"
    }

    fn contract(&self) -> &'static NodeContract {
        &CONTRACT
    }

    async fn execute(&self, inputs: &NodeInputs, ctx: &NodeContext) -> NodeOutput {
        let value = inputs.get("value");
        ctx.log()
            .debug(&format!("condition input: {}", value.unwrap_or(&Value::Null)));

        let result = match is_truthy(value) {
            Ok(result) => {
                ctx.log().debug(&format!("condition result: {result}"));
                Value::Bool(result)
            }
            Err(e) => {
                ctx.log().error(&format!("condition evaluation failed: {e}"));
                Value::Null
            }
        };

        let mut outputs = NodeOutput::new();
        outputs.insert(CONDITION_RESULT.to_string(), result);
        outputs
    }

    fn as_conditional(&self) -> Option<&dyn ConditionalNode> {
        Some(self)
    }
}

impl ConditionalNode for ConditionNode {
    fn active_branch(&self, outputs: &NodeOutput) -> Branch {
        Branch::from_outputs(outputs)
    }
}
