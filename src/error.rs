//! Error taxonomy for the model → scenario → script pipeline.
//!
//! Every variant carries enough context (field path, offending literal, file
//! path) to act on without re-reading the input. All errors are terminal for
//! a pipeline run; nothing here is retried internally.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CadenceError {
    /// The raw model failed the structural schema check. Every violation is
    /// collected before failing, one `path: message` line each.
    #[error("model does not match the traffic-model schema:\n  {}", .violations.join("\n  "))]
    SchemaValidation { violations: Vec<String> },

    /// A domain business rule was violated. Unlike the structural check,
    /// business rules fail on the first violation.
    #[error("model violates business rule at {field}: {reason}")]
    BusinessRule { field: &'static str, reason: String },

    /// Test duration did not match the `\d+[hm]` format.
    #[error("invalid duration {input:?}: expected a positive count of minutes or hours, e.g. \"90m\" or \"2h\"")]
    DurationFormat { input: String },

    /// Headers were neither a JSON object literal nor a `key:value` list.
    #[error("invalid headers {input:?}: {reason}")]
    HeaderFormat { input: String, reason: String },

    /// A numeric option was outside its contract (scale and time-scale must
    /// be positive and finite). Checked at options resolution, before any
    /// synthesis starts.
    #[error("invalid option --{name}={value}: must be a positive, finite number")]
    InvalidOption { name: &'static str, value: f64 },

    /// The model file could not be read or parsed.
    #[error("failed to load model from {}: {source}", .path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: ModelLoadCause,
    },

    /// The generated script could not be written.
    #[error("failed to write script to {}: {source}", .path.display())]
    ScriptWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Underlying cause of a [`CadenceError::ModelLoad`].
#[derive(Debug, Error)]
pub enum ModelLoadCause {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
