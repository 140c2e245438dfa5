use std::sync::Arc;

use once_cell::sync::Lazy;

use super::rpa::{run_action, RPA_BASE, RPA_CATEGORY};
use super::{Node, NodeContext};
use crate::contract::{DescriptorSet, InputDescriptor, NodeContract, ValueType};
use crate::errors::{ActionError, InputError};
use crate::inputs::NodeInputs;
use crate::platforms::AutomationBackend;
use crate::result::{KeyInfo, KeyPayload, NodeOutput};

static CONTRACT: Lazy<NodeContract> = Lazy::new(|| {
    NodeContract::compose(
        "Key Press",
        "Press a key, optionally with modifiers",
        RPA_CATEGORY,
        &[&RPA_BASE],
        DescriptorSet::new()
            .input(
                "key",
                InputDescriptor::new(
                    "Key",
                    "Key to press (e.g. enter, tab, a, 1)",
                    ValueType::String,
                )
                .required(),
            )
            .input(
                "modifiers",
                InputDescriptor::new(
                    "Modifiers",
                    "Comma-separated modifier keys (e.g. ctrl,alt,shift)",
                    ValueType::String,
                )
                .default_value(""),
            )
            .input(
                "presses",
                InputDescriptor::new("Presses", "Number of presses", ValueType::Int)
                    .default_value(1),
            )
            .input(
                "interval",
                InputDescriptor::new("Interval", "Seconds between presses", ValueType::Float)
                    .default_value(0.25),
            ),
    )
});

/// Split a comma-separated modifier list into trimmed, lowercase names.
pub fn parse_modifiers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
        .collect()
}

pub struct KeyPressNode {
    backend: Arc<dyn AutomationBackend>,
}

impl KeyPressNode {
    pub fn new(backend: Arc<dyn AutomationBackend>) -> Self {
        Self { backend }
    }

    async fn press(&self, inputs: &NodeInputs, ctx: &NodeContext) -> Result<KeyPayload, ActionError> {
        let key = inputs.require_str("key")?.trim().to_lowercase();
        if key.is_empty() {
            return Err(InputError::Missing("key".to_string()).into());
        }
        let modifiers = parse_modifiers(inputs.str_or("modifiers", "")?);
        let presses = inputs.count_or("presses", 1)?;
        let interval = inputs.seconds_or("interval", 0.25)?;
        ctx.log().debug(&format!(
            "pressing key={key}, modifiers={modifiers:?}, presses={presses}"
        ));

        if modifiers.is_empty() {
            self.backend.press(&key, presses, interval).await?;
        } else {
            let mut chord = modifiers.clone();
            chord.push(key.clone());
            for i in 0..presses {
                if i > 0 {
                    tokio::time::sleep(interval).await;
                }
                self.backend.hotkey(&chord).await?;
            }
        }

        Ok(KeyPayload {
            key_info: Some(KeyInfo {
                key,
                modifiers,
                presses,
            }),
        })
    }
}

#[async_trait::async_trait]
impl Node for KeyPressNode {
    fn kind(&self) -> &'static str {
        "key_press"
    }

    fn contract(&self) -> &'static NodeContract {
        &CONTRACT
    }

    async fn execute(&self, inputs: &NodeInputs, ctx: &NodeContext) -> NodeOutput {
        let inputs = CONTRACT.with_defaults(inputs);
        run_action("key press", &inputs, ctx, || self.press(&inputs, ctx)).await
    }
}
