//! Pluggable desktop automation nodes for workflow chains
//!
//! Each node declares a [`NodeContract`], checks the previous step's result
//! before acting, and reports a uniform result (`success`, `error_message`,
//! `execution_time` plus kind-specific fields) instead of returning errors.
//!
//! ```no_run
//! use autotask::{create_backend, NodeContext, NodeInputs, NodeRegistry};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let (backend, clipboard) = create_backend(true)?;
//! let registry = NodeRegistry::builtin(backend, clipboard);
//!
//! let click = registry.get("mouse_click").ok_or("unknown node")?;
//! let inputs = NodeInputs::from_value(json!({ "x": 100, "y": 200 }))?;
//! let output = click.execute(&inputs, &NodeContext::new("click-1")).await;
//! assert_eq!(output["success"], true);
//! # Ok(())
//! # }
//! ```

pub mod branch;
pub mod clipboard;
pub mod contract;
pub mod errors;
pub mod guard;
pub mod inputs;
pub mod logger;
pub mod nodes;
pub mod platforms;
pub mod poller;
pub mod result;

pub use branch::{is_truthy, Branch};
pub use contract::{DescriptorSet, InputDescriptor, NodeContract, OutputDescriptor, ValueType};
pub use errors::{ActionError, AutomationError, ConditionError, ContractError, InputError};
pub use guard::{should_skip, SKIP_MESSAGE};
pub use inputs::NodeInputs;
pub use logger::{RecordingLogger, TracingLogger, WorkflowLogger};
pub use nodes::{ConditionalNode, Node, NodeContext, NodeRegistry};
pub use platforms::{create_backend, AutomationBackend, Clipboard};
pub use poller::{poll_until_found, LocateOutcome, PollReport};
pub use result::{ActionResult, NodeOutput, Point};
