use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;

use super::rpa::{run_action, RPA_BASE, RPA_CATEGORY};
use super::{Node, NodeContext};
use crate::contract::{DescriptorSet, InputDescriptor, NodeContract, ValueType};
use crate::errors::{ActionError, AutomationError};
use crate::inputs::NodeInputs;
use crate::platforms::AutomationBackend;
use crate::poller::{poll_until_found, LocateOutcome, DEFAULT_ATTEMPT_GAP};
use crate::result::{ImageClickPayload, NodeOutput};

/// Accepted image file extensions, lowercase.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

static CONTRACT: Lazy<NodeContract> = Lazy::new(|| {
    NodeContract::compose(
        "Image Click",
        "Find an image on screen and click its center",
        RPA_CATEGORY,
        &[&RPA_BASE],
        DescriptorSet::new()
            .input(
                "target_img",
                InputDescriptor::new("Image", "Path of the image to find", ValueType::ImageUpload)
                    .required(),
            )
            .input(
                "confidence",
                InputDescriptor::new(
                    "Confidence",
                    "Minimum match confidence (0-1)",
                    ValueType::Float,
                )
                .default_value(0.8)
                .step(0.03),
            )
            .input(
                "wait_time",
                InputDescriptor::new(
                    "Wait Time",
                    "Longest time to wait for the image, in seconds",
                    ValueType::Float,
                )
                .default_value(1.0),
            ),
    )
});

pub struct ImageClickNode {
    backend: Arc<dyn AutomationBackend>,
    attempt_gap: Duration,
}

impl ImageClickNode {
    pub fn new(backend: Arc<dyn AutomationBackend>) -> Self {
        Self {
            backend,
            attempt_gap: DEFAULT_ATTEMPT_GAP,
        }
    }

    /// Pause between two lookups.
    pub fn with_attempt_gap(mut self, gap: Duration) -> Self {
        self.attempt_gap = gap;
        self
    }

    async fn find_and_click(
        &self,
        inputs: &NodeInputs,
        ctx: &NodeContext,
    ) -> Result<ImageClickPayload, ActionError> {
        let target = inputs.require_str("target_img")?;
        let image = Path::new(target);
        ctx.log().debug(&format!("looking for image file {target}"));

        if !image.exists() {
            return Err(ActionError::FileNotFound {
                what: "image file",
                path: target.to_string(),
            });
        }
        if !has_image_extension(image) {
            return Err(ActionError::UnsupportedImageFormat {
                path: target.to_string(),
            });
        }

        let confidence = inputs.f64_or("confidence", 0.8)?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(AutomationError::InvalidArgument(format!(
                "confidence must be between 0 and 1, got {confidence}"
            ))
            .into());
        }
        let wait = inputs.seconds_or("wait_time", 1.0)?;
        ctx.log().debug(&format!(
            "searching for image, wait time: {:.1}s, confidence: {confidence}",
            wait.as_secs_f64()
        ));

        let backend = self.backend.as_ref();
        let report = poll_until_found(wait, self.attempt_gap, &ctx.cancel, |attempt| async move {
            match backend.locate_on_screen(image, confidence).await {
                Ok(Some(point)) => LocateOutcome::Found(point),
                Ok(None) => LocateOutcome::NotFound,
                Err(e) => {
                    ctx.log()
                        .debug(&format!("attempt {attempt} to locate image failed: {e}"));
                    LocateOutcome::AttemptError(e.to_string())
                }
            }
        })
        .await;

        match report.found {
            Some(point) => {
                ctx.log().info(&format!(
                    "image found at ({}, {}) after {} attempts",
                    point.x, point.y, report.attempts
                ));
                self.backend.click(point, 1, Duration::ZERO).await?;
                Ok(ImageClickPayload {
                    image_found: true,
                    click_position: Some(point),
                })
            }
            None if report.cancelled => Err(ActionError::Cancelled {
                attempts: report.attempts,
            }),
            None => {
                ctx.log().warning(&format!(
                    "image not found within {:.1}s ({} attempts)",
                    wait.as_secs_f64(),
                    report.attempts
                ));
                Err(ActionError::ImageNotFound {
                    attempts: report.attempts,
                })
            }
        }
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[async_trait::async_trait]
impl Node for ImageClickNode {
    fn kind(&self) -> &'static str {
        "image_click"
    }

    fn contract(&self) -> &'static NodeContract {
        &CONTRACT
    }

    async fn execute(&self, inputs: &NodeInputs, ctx: &NodeContext) -> NodeOutput {
        let inputs = CONTRACT.with_defaults(inputs);
        run_action("image click", &inputs, ctx, || {
            self.find_and_click(&inputs, ctx)
        })
        .await
    }
}
