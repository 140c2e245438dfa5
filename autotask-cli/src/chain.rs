//! Chain files: an ordered list of node invocations.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use autotask::{NodeInputs, NodeRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain {
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<ChainStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainStep {
    pub id: String,
    /// Registry kind, e.g. `mouse_click`
    pub node: String,
    #[serde(default)]
    pub inputs: Map<String, Value>,
    /// Jump targets after a conditional step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Branches>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Branches {
    #[serde(default)]
    pub true_branch: Option<String>,
    #[serde(default)]
    pub false_branch: Option<String>,
}

impl Branches {
    fn targets(&self) -> impl Iterator<Item = &str> {
        self.true_branch
            .iter()
            .chain(self.false_branch.iter())
            .map(String::as_str)
    }
}

impl Chain {
    /// Read a chain from a `.yaml`/`.yml` or `.json` file. Other extensions
    /// are tried as JSON first, then YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read chain file {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        let parsed = match extension.as_deref() {
            Some("json") => Self::from_json(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content).or_else(|_| Self::from_yaml(&content)),
        };
        parsed.with_context(|| format!("invalid chain file {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("failed to parse chain as JSON")
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("failed to parse chain as YAML")
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("chain")
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == id)
    }

    /// Every problem that would stop the chain from running as written.
    pub fn validate(&self, registry: &NodeRegistry) -> Vec<String> {
        let mut issues = Vec::new();
        if self.steps.is_empty() {
            issues.push("chain has no steps".to_string());
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.id.as_str()) {
                issues.push(format!("duplicate step id '{}'", step.id));
            }
        }

        for step in &self.steps {
            let Some(node) = registry.get(&step.node) else {
                issues.push(format!("step '{}': unknown node '{}'", step.id, step.node));
                continue;
            };

            let inputs = NodeInputs::new(step.inputs.clone());
            if let Err(e) = node.contract().validate(&inputs) {
                issues.push(format!("step '{}': {e}", step.id));
            }

            if let Some(branches) = &step.branches {
                if node.as_conditional().is_none() {
                    issues.push(format!(
                        "step '{}': branches set on non-conditional node '{}'",
                        step.id, step.node
                    ));
                }
                for target in branches.targets() {
                    if self.position(target).is_none() {
                        issues.push(format!(
                            "step '{}': branch target '{target}' does not exist",
                            step.id
                        ));
                    }
                }
            }
        }
        issues
    }
}
