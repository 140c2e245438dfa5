//! Built-in nodes and the contract every node implements.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::branch::Branch;
use crate::contract::NodeContract;
use crate::inputs::NodeInputs;
use crate::logger::{TracingLogger, WorkflowLogger};
use crate::platforms::{AutomationBackend, Clipboard};
use crate::result::NodeOutput;

mod condition;
mod image_click;
mod key_press;
mod mouse_click;
mod open_application;
mod rpa;
mod type_text;

pub use condition::ConditionNode;
pub use image_click::{ImageClickNode, IMAGE_EXTENSIONS};
pub use key_press::{parse_modifiers, KeyPressNode};
pub use mouse_click::MouseClickNode;
pub use open_application::OpenApplicationNode;
pub use rpa::RPA_BASE;
pub use type_text::{paste_shortcut, TypeTextNode};

/// What a host engine provides alongside the inputs of one invocation.
#[derive(Clone)]
pub struct NodeContext {
    pub node_id: String,
    pub logger: Arc<dyn WorkflowLogger>,
    /// Checked by long-running nodes between attempts.
    pub cancel: CancellationToken,
}

impl NodeContext {
    pub fn new(node_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        Self {
            logger: Arc::new(TracingLogger::new(node_id.clone())),
            node_id,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn WorkflowLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn log(&self) -> &dyn WorkflowLogger {
        self.logger.as_ref()
    }
}

/// A pluggable workflow step.
#[async_trait::async_trait]
pub trait Node: Send + Sync {
    /// Registry key, e.g. `"mouse_click"`
    fn kind(&self) -> &'static str;

    /// The node type's composed contract. Built once and shared.
    fn contract(&self) -> &'static NodeContract;

    /// Run one invocation. Failures are reported in the output, never
    /// returned.
    async fn execute(&self, inputs: &NodeInputs, ctx: &NodeContext) -> NodeOutput;

    fn as_conditional(&self) -> Option<&dyn ConditionalNode> {
        None
    }
}

/// A node whose outputs select one of two downstream edges.
pub trait ConditionalNode: Node {
    fn active_branch(&self, outputs: &NodeOutput) -> Branch;
}

/// Node types by kind.
#[derive(Default, Clone)]
pub struct NodeRegistry {
    nodes: BTreeMap<&'static str, Arc<dyn Node>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in node, sharing one set of primitives.
    pub fn builtin(backend: Arc<dyn AutomationBackend>, clipboard: Arc<dyn Clipboard>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MouseClickNode::new(backend.clone())));
        registry.register(Arc::new(ImageClickNode::new(backend.clone())));
        registry.register(Arc::new(OpenApplicationNode::new(backend.clone())));
        registry.register(Arc::new(TypeTextNode::new(backend.clone(), clipboard)));
        registry.register(Arc::new(KeyPressNode::new(backend)));
        registry.register(Arc::new(ConditionNode::new()));
        registry
    }

    /// Add a node, replacing any node of the same kind.
    pub fn register(&mut self, node: Arc<dyn Node>) {
        self.nodes.insert(node.kind(), node);
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn Node>> {
        self.nodes.get(kind).cloned()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.nodes.keys().copied()
    }

    pub fn contracts(&self) -> impl Iterator<Item = (&'static str, &'static NodeContract)> + '_ {
        self.nodes.iter().map(|(kind, node)| (*kind, node.contract()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::{DryRunBackend, MemoryClipboard};

    fn registry() -> NodeRegistry {
        NodeRegistry::builtin(
            Arc::new(DryRunBackend::new()),
            Arc::new(MemoryClipboard::default()),
        )
    }

    #[test]
    fn test_builtin_kinds() {
        let kinds: Vec<_> = registry().kinds().collect();
        assert_eq!(
            kinds,
            vec![
                "condition",
                "image_click",
                "key_press",
                "mouse_click",
                "open_application",
                "type_text",
            ]
        );
    }

    #[test]
    fn test_rpa_nodes_inherit_base_descriptors() {
        let registry = registry();
        for (kind, contract) in registry.contracts() {
            let rpa = kind != "condition";
            assert_eq!(contract.inputs.contains_key("previous_result"), rpa, "{kind}");
            assert_eq!(contract.outputs.contains_key("result"), rpa, "{kind}");
        }
    }

    #[test]
    fn test_only_condition_is_conditional() {
        let registry = registry();
        for kind in registry.kinds() {
            let node = registry.get(kind).unwrap();
            assert_eq!(node.as_conditional().is_some(), kind == "condition");
        }
    }

    #[test]
    fn test_contract_is_shared() {
        let registry = registry();
        let a = registry.get("mouse_click").unwrap();
        let b = MouseClickNode::new(Arc::new(DryRunBackend::new()));
        assert!(std::ptr::eq(a.contract(), b.contract()));
    }
}
