//! Linear chain host: runs steps in order, feeding each RPA step the
//! latest action result, and follows condition branches.

use std::time::Instant;

use anyhow::{bail, Result};
use autotask::inputs::PREVIOUS_RESULT;
use autotask::{Branch, NodeContext, NodeInputs, NodeRegistry, SKIP_MESSAGE};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::chain::Chain;
use crate::workflow_result::{ChainResult, StepRecord, WorkflowState};

/// Jumps may revisit steps; this bounds the total per step.
const VISITS_PER_STEP: usize = 4;

pub struct ChainRunner {
    registry: NodeRegistry,
    cancel: CancellationToken,
}

impl ChainRunner {
    pub fn new(registry: NodeRegistry) -> Self {
        Self {
            registry,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run `chain` to the end. Fails only when the chain does not validate;
    /// node failures are part of the result.
    #[instrument(skip_all, fields(chain = %chain.display_name()))]
    pub async fn run(&self, chain: &Chain) -> Result<ChainResult> {
        let issues = chain.validate(&self.registry);
        if !issues.is_empty() {
            bail!("chain is invalid:\n  {}", issues.join("\n  "));
        }

        let started = Instant::now();
        let budget = chain.steps.len() * VISITS_PER_STEP;
        let mut records: Vec<StepRecord> = Vec::new();
        let mut previous: Option<Value> = None;
        let mut first_error: Option<String> = None;
        let mut cancelled = false;
        let mut index = 0;

        while index < chain.steps.len() {
            if self.cancel.is_cancelled() {
                warn!("chain cancelled before step '{}'", chain.steps[index].id);
                cancelled = true;
                break;
            }
            if records.len() >= budget {
                first_error = Some(format!(
                    "step budget of {budget} exhausted, check branch targets for loops"
                ));
                break;
            }

            let step = &chain.steps[index];
            let Some(node) = self.registry.get(&step.node) else {
                bail!("unknown node '{}'", step.node);
            };

            let mut inputs = NodeInputs::new(step.inputs.clone());
            if node.contract().inputs.contains_key(PREVIOUS_RESULT)
                && !inputs.contains(PREVIOUS_RESULT)
            {
                if let Some(previous) = &previous {
                    inputs.insert(PREVIOUS_RESULT, previous.clone());
                }
            }

            info!(step = %step.id, node = %step.node, "running step");
            let ctx = NodeContext::new(step.id.clone()).with_cancel(self.cancel.clone());
            let output = node.execute(&inputs, &ctx).await;

            let mut record = StepRecord {
                id: step.id.clone(),
                node: step.node.clone(),
                output,
                branch: None,
            };
            if record.success() == Some(false) && first_error.is_none() {
                if let Some(message) = record.error_message().filter(|m| *m != SKIP_MESSAGE) {
                    first_error = Some(format!("step '{}': {message}", step.id));
                }
            }

            let mut next = index + 1;
            if let Some(conditional) = node.as_conditional() {
                let branch = conditional.active_branch(&record.output);
                debug!(step = %step.id, %branch, "branch selected");
                let target = step.branches.as_ref().and_then(|b| match branch {
                    Branch::TrueBranch => b.true_branch.as_deref(),
                    Branch::FalseBranch => b.false_branch.as_deref(),
                });
                if let Some(target) = target {
                    // Validated above.
                    next = chain.position(target).unwrap_or(chain.steps.len());
                }
                record.branch = Some(branch.to_string());
            }

            // Condition outputs carry no `success`; the last action result
            // stays in effect across them.
            if record.success().is_some() {
                previous = Some(Value::Object(record.output.clone()));
            }
            records.push(record);
            index = next;
        }

        let state = if first_error.is_some() {
            WorkflowState::Failure
        } else if cancelled {
            WorkflowState::Skipped
        } else {
            WorkflowState::Success
        };
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(?state, steps = records.len(), duration_ms, "chain finished");

        Ok(ChainResult::new(
            chain.display_name(),
            state,
            first_error,
            records,
            duration_ms,
        ))
    }
}
