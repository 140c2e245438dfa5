use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Chain execution state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowState {
    Success,
    Failure,
    Skipped,
}

/// Output of one executed step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub id: String,
    pub node: String,
    pub output: Map<String, Value>,
    /// Branch taken, for conditional steps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl StepRecord {
    /// `None` for nodes that do not report `success`.
    pub fn success(&self) -> Option<bool> {
        self.output.get("success").and_then(Value::as_bool)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.output
            .get("error_message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
    }
}

/// Summary of one chain run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainResult {
    pub name: String,
    pub success: bool,
    pub state: WorkflowState,
    pub message: String,
    /// First failure, if any
    pub error: Option<String>,
    pub steps: Vec<StepRecord>,
    pub duration_ms: u64,
}

impl ChainResult {
    pub fn new(
        name: impl Into<String>,
        state: WorkflowState,
        error: Option<String>,
        steps: Vec<StepRecord>,
        duration_ms: u64,
    ) -> Self {
        let message = match state {
            WorkflowState::Success => "Chain completed successfully",
            WorkflowState::Failure => "Chain failed",
            WorkflowState::Skipped => "Chain cancelled before completion",
        }
        .to_string();
        Self {
            name: name.into(),
            success: state == WorkflowState::Success,
            state,
            message,
            error,
            steps,
            duration_ms,
        }
    }

    /// Print a human-readable summary to stderr.
    pub fn display(&self) {
        use colored::*;

        eprintln!();
        eprintln!("{}", "═".repeat(60));

        match self.state {
            WorkflowState::Success => {
                eprintln!("{} {}", "SUCCESS:".green().bold(), self.message);
            }
            WorkflowState::Failure => {
                eprintln!("{} {}", "FAILURE:".red().bold(), self.message);
            }
            WorkflowState::Skipped => {
                eprintln!("{} {}", "SKIPPED:".yellow().bold(), self.message);
            }
        }

        eprintln!("{}", "─".repeat(60));
        eprintln!("Chain: {}", self.name);
        eprintln!("   • Steps Executed: {}", self.steps.len());
        let seconds = self.duration_ms as f64 / 1000.0;
        eprintln!("   • Duration: {seconds:.2}s");

        eprintln!("{}", "─".repeat(60));
        for step in &self.steps {
            let status = match step.success() {
                Some(true) => "ok".green(),
                Some(false) => "failed".red(),
                None => "done".normal(),
            };
            match &step.branch {
                Some(branch) => eprintln!("   {} [{}] {status} -> {branch}", step.id, step.node),
                None => eprintln!("   {} [{}] {status}", step.id, step.node),
            }
            if let Some(message) = step.error_message() {
                eprintln!("      {}", message.dimmed());
            }
        }

        if let Some(error) = &self.error {
            eprintln!("{}", "─".repeat(60));
            eprintln!("{} {}", "Error:".yellow(), error);
        }

        eprintln!("{}", "═".repeat(60));
        eprintln!();
    }
}
