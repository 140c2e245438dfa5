use thiserror::Error;

/// Failures reported by the automation primitives.
#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("Platform-specific error: {0}")]
    PlatformError(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Failed to launch '{path}': {message}")]
    Launch { path: String, message: String },
}

/// A node input that is missing or has the wrong shape.
#[derive(Error, Debug, PartialEq)]
pub enum InputError {
    #[error("missing required input '{0}'")]
    Missing(String),

    #[error("input '{name}' expected {expected}, got {actual}")]
    WrongType {
        name: String,
        expected: &'static str,
        actual: String,
    },
}

/// Truthiness could not be decided for a branch value.
///
/// Unreachable with serde_json's default number representation; kept so
/// `is_truthy` stays total if a caller builds `Value`s with
/// `arbitrary_precision`.
#[derive(Error, Debug, PartialEq)]
pub enum ConditionError {
    #[error("number {0} has no finite representation")]
    UnrepresentableNumber(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("node '{node}' is missing required inputs: {}", missing.join(", "))]
    MissingInputs { node: String, missing: Vec<String> },
}

/// Why an RPA action did not complete. Turned into the failure result's
/// `error_message`, never returned past the node.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Automation(#[from] AutomationError),

    #[error("{what} does not exist: {path}")]
    FileNotFound { what: &'static str, path: String },

    #[error("unsupported image format '{path}', use one of: .png, .jpg, .jpeg, .bmp")]
    UnsupportedImageFormat { path: String },

    #[error("target image not found (attempts: {attempts})")]
    ImageNotFound { attempts: u32 },

    #[error("cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}
