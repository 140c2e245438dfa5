use std::sync::Arc;

use once_cell::sync::Lazy;

use super::rpa::{run_action, RPA_BASE, RPA_CATEGORY};
use super::{Node, NodeContext};
use crate::clipboard::ClipboardLease;
use crate::contract::{DescriptorSet, InputDescriptor, NodeContract, ValueType};
use crate::errors::{ActionError, AutomationError};
use crate::inputs::NodeInputs;
use crate::platforms::{AutomationBackend, Clipboard};
use crate::result::{NodeOutput, TextInfo, TextPayload};

static CONTRACT: Lazy<NodeContract> = Lazy::new(|| {
    NodeContract::compose(
        "Type Text",
        "Paste text at the current cursor position",
        RPA_CATEGORY,
        &[&RPA_BASE],
        DescriptorSet::new().input(
            "text",
            InputDescriptor::new("Text", "Text to enter", ValueType::String)
                .multiline()
                .required(),
        ),
    )
});

/// Key chord that pastes on the current platform.
pub fn paste_shortcut() -> [&'static str; 2] {
    if cfg!(target_os = "macos") {
        ["command", "v"]
    } else {
        ["ctrl", "v"]
    }
}

/// Enters text by pasting it, leaving the clipboard as it was.
pub struct TypeTextNode {
    backend: Arc<dyn AutomationBackend>,
    clipboard: Arc<dyn Clipboard>,
}

impl TypeTextNode {
    pub fn new(backend: Arc<dyn AutomationBackend>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self { backend, clipboard }
    }

    async fn type_text(&self, inputs: &NodeInputs, ctx: &NodeContext) -> Result<TextPayload, ActionError> {
        let text = inputs.require_str("text")?;
        ctx.log().debug(&format!("entering text: {text}"));

        let lease = ClipboardLease::acquire(self.clipboard.as_ref())?;
        let pasted = self.paste(text).await;
        // Restore before reporting a paste failure.
        let restored = lease.release();
        pasted?;
        restored?;

        Ok(TextPayload {
            text_info: Some(TextInfo {
                content: text.to_string(),
                length: text.chars().count(),
            }),
        })
    }

    async fn paste(&self, text: &str) -> Result<(), AutomationError> {
        self.clipboard.write_text(text)?;
        let keys = paste_shortcut().map(String::from);
        self.backend.hotkey(&keys).await
    }
}

#[async_trait::async_trait]
impl Node for TypeTextNode {
    fn kind(&self) -> &'static str {
        "type_text"
    }

    fn contract(&self) -> &'static NodeContract {
        &CONTRACT
    }

    async fn execute(&self, inputs: &NodeInputs, ctx: &NodeContext) -> NodeOutput {
        run_action("text input", inputs, ctx, || self.type_text(inputs, ctx)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::{DryRunBackend, MemoryClipboard};
    use serde_json::json;

    #[tokio::test]
    async fn test_pastes_and_restores_clipboard() {
        let clipboard = Arc::new(MemoryClipboard::with_text("OLD"));
        let backend = Arc::new(DryRunBackend::new());
        let node = TypeTextNode::new(backend.clone(), clipboard.clone());
        let inputs = NodeInputs::from_value(json!({ "text": "héllo\nworld" })).unwrap();

        let output = node.execute(&inputs, &NodeContext::new("type")).await;

        assert_eq!(output["success"], true);
        assert_eq!(
            output["text_info"],
            json!({ "content": "héllo\nworld", "length": 11 })
        );
        assert_eq!(clipboard.read_text().unwrap(), "OLD");
        assert_eq!(backend.calls(), 1);
    }

    #[test]
    fn test_paste_shortcut_for_platform() {
        let [modifier, key] = paste_shortcut();
        assert_eq!(key, "v");
        if cfg!(target_os = "macos") {
            assert_eq!(modifier, "command");
        } else {
            assert_eq!(modifier, "ctrl");
        }
    }
}
