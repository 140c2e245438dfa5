//! Node contracts: the declared inputs and outputs of a node type.
//!
//! Families of nodes share a base [`DescriptorSet`]. A concrete node's
//! contract is composed once, when its type is first used, by layering the
//! bases in declaration order and then the node's own descriptors on top:
//!
//! ```text
//! effective = base[0] <- base[1] <- ... <- own
//! ```
//!
//! where `<-` overwrites on key collision.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::errors::ContractError;
use crate::inputs::NodeInputs;

/// Value types understood by the host engine's editor and validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Int,
    Float,
    String,
    Bool,
    Dict,
    List,
    Any,
    #[serde(rename = "IMAGEUPLOAD")]
    ImageUpload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputDescriptor {
    pub label: String,
    pub description: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Increment hint for numeric editors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub multiline: bool,
}

impl InputDescriptor {
    pub fn new(label: &str, description: &str, value_type: ValueType) -> Self {
        Self {
            label: label.to_string(),
            description: description.to_string(),
            value_type,
            required: false,
            default: None,
            step: None,
            multiline: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputDescriptor {
    pub label: String,
    pub description: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl OutputDescriptor {
    pub fn new(label: &str, description: &str, value_type: ValueType) -> Self {
        Self {
            label: label.to_string(),
            description: description.to_string(),
            value_type,
        }
    }
}

/// A named set of input and output descriptors. Either side may be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DescriptorSet {
    pub inputs: BTreeMap<String, InputDescriptor>,
    pub outputs: BTreeMap<String, OutputDescriptor>,
}

impl DescriptorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, name: &str, descriptor: InputDescriptor) -> Self {
        self.inputs.insert(name.to_string(), descriptor);
        self
    }

    pub fn output(mut self, name: &str, descriptor: OutputDescriptor) -> Self {
        self.outputs.insert(name.to_string(), descriptor);
        self
    }

    /// Overlay `other` onto `self`; entries of `other` win on collision.
    fn merge_from(&mut self, other: &DescriptorSet) {
        self.inputs
            .extend(other.inputs.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.outputs
            .extend(other.outputs.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

/// The effective, immutable contract of a node type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeContract {
    pub name: String,
    pub description: String,
    pub category: String,
    pub inputs: BTreeMap<String, InputDescriptor>,
    pub outputs: BTreeMap<String, OutputDescriptor>,
}

impl NodeContract {
    /// Layer `bases` in order, then `own`, into the effective contract.
    pub fn compose(
        name: &str,
        description: &str,
        category: &str,
        bases: &[&DescriptorSet],
        own: DescriptorSet,
    ) -> Self {
        let mut effective = DescriptorSet::new();
        for base in bases {
            effective.merge_from(base);
        }
        effective.merge_from(&own);

        Self {
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            inputs: effective.inputs,
            outputs: effective.outputs,
        }
    }

    /// Declared default of an input, if any.
    pub fn default_of(&self, input: &str) -> Option<&Value> {
        self.inputs.get(input).and_then(|d| d.default.as_ref())
    }

    /// Copy of `inputs` with every absent input that declares a default
    /// filled in.
    pub fn with_defaults(&self, inputs: &NodeInputs) -> NodeInputs {
        let mut resolved = inputs.clone();
        for (name, descriptor) in &self.inputs {
            if let Some(default) = &descriptor.default {
                if !resolved.contains(name) {
                    resolved.insert(name.clone(), default.clone());
                }
            }
        }
        resolved
    }

    /// Check that every required input is present and not null.
    pub fn validate(&self, inputs: &NodeInputs) -> Result<(), ContractError> {
        let missing: Vec<String> = self
            .inputs
            .iter()
            .filter(|(name, descriptor)| descriptor.required && inputs.get(name).is_none())
            .map(|(name, _)| name.clone())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ContractError::MissingInputs {
                node: self.name.clone(),
                missing,
            })
        }
    }
}
