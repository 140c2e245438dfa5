use std::path::Path;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;

use super::rpa::{run_action, RPA_BASE, RPA_CATEGORY};
use super::{Node, NodeContext};
use crate::contract::{DescriptorSet, InputDescriptor, NodeContract, ValueType};
use crate::errors::ActionError;
use crate::inputs::NodeInputs;
use crate::platforms::AutomationBackend;
use crate::result::{LaunchPayload, NodeOutput, ProcessInfo};

static CONTRACT: Lazy<NodeContract> = Lazy::new(|| {
    NodeContract::compose(
        "Open Application",
        "Start the given application",
        RPA_CATEGORY,
        &[&RPA_BASE],
        DescriptorSet::new()
            .input(
                "app_file",
                InputDescriptor::new(
                    "Application",
                    "Path of the program or document to open",
                    ValueType::String,
                )
                .required(),
            )
            .input(
                "wait_time",
                InputDescriptor::new(
                    "Wait Time",
                    "Seconds to wait for the application to start",
                    ValueType::Float,
                )
                .default_value(2.0),
            ),
    )
});

pub struct OpenApplicationNode {
    backend: Arc<dyn AutomationBackend>,
}

impl OpenApplicationNode {
    pub fn new(backend: Arc<dyn AutomationBackend>) -> Self {
        Self { backend }
    }

    async fn open(&self, inputs: &NodeInputs, ctx: &NodeContext) -> Result<LaunchPayload, ActionError> {
        let app_file = inputs.require_str("app_file")?;
        let wait = inputs.seconds_or("wait_time", 2.0)?;
        let start_time = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let path = Path::new(app_file);
        if !path.exists() {
            return Err(ActionError::FileNotFound {
                what: "application path",
                path: app_file.to_string(),
            });
        }

        self.backend.launch(path).await?;
        ctx.log().info(&format!(
            "launched {app_file}, waiting {:.1}s",
            wait.as_secs_f64()
        ));
        tokio::time::sleep(wait).await;

        Ok(LaunchPayload {
            process_info: Some(ProcessInfo {
                application_path: app_file.to_string(),
                start_time,
            }),
        })
    }
}

#[async_trait::async_trait]
impl Node for OpenApplicationNode {
    fn kind(&self) -> &'static str {
        "open_application"
    }

    fn contract(&self) -> &'static NodeContract {
        &CONTRACT
    }

    async fn execute(&self, inputs: &NodeInputs, ctx: &NodeContext) -> NodeOutput {
        let inputs = CONTRACT.with_defaults(inputs);
        run_action("launch application", &inputs, ctx, || self.open(&inputs, ctx)).await
    }
}
