use std::sync::Arc;

use once_cell::sync::Lazy;

use super::rpa::{run_action, RPA_BASE, RPA_CATEGORY};
use super::{Node, NodeContext};
use crate::contract::{DescriptorSet, InputDescriptor, NodeContract, ValueType};
use crate::errors::ActionError;
use crate::inputs::NodeInputs;
use crate::platforms::AutomationBackend;
use crate::result::{ClickPayload, NodeOutput, Point};

static CONTRACT: Lazy<NodeContract> = Lazy::new(|| {
    NodeContract::compose(
        "Mouse Click",
        "Click at a screen position",
        RPA_CATEGORY,
        &[&RPA_BASE],
        DescriptorSet::new()
            .input(
                "x",
                InputDescriptor::new("X", "Horizontal screen coordinate", ValueType::Int)
                    .required(),
            )
            .input(
                "y",
                InputDescriptor::new("Y", "Vertical screen coordinate", ValueType::Int)
                    .required(),
            )
            .input(
                "clicks",
                InputDescriptor::new("Clicks", "Number of clicks", ValueType::Int)
                    .default_value(1),
            )
            .input(
                "interval",
                InputDescriptor::new("Interval", "Seconds between clicks", ValueType::Float)
                    .default_value(0.25),
            ),
    )
});

pub struct MouseClickNode {
    backend: Arc<dyn AutomationBackend>,
}

impl MouseClickNode {
    pub fn new(backend: Arc<dyn AutomationBackend>) -> Self {
        Self { backend }
    }

    async fn click(&self, inputs: &NodeInputs) -> Result<ClickPayload, ActionError> {
        let at = Point::new(inputs.require_i32("x")?, inputs.require_i32("y")?);
        let clicks = inputs.count_or("clicks", 1)?;
        let interval = inputs.seconds_or("interval", 0.25)?;

        self.backend.click(at, clicks, interval).await?;

        Ok(ClickPayload {
            click_position: Some(at),
        })
    }
}

#[async_trait::async_trait]
impl Node for MouseClickNode {
    fn kind(&self) -> &'static str {
        "mouse_click"
    }

    fn contract(&self) -> &'static NodeContract {
        &CONTRACT
    }

    async fn execute(&self, inputs: &NodeInputs, ctx: &NodeContext) -> NodeOutput {
        let inputs = CONTRACT.with_defaults(inputs);
        run_action("mouse click", &inputs, ctx, || self.click(&inputs)).await
    }
}
