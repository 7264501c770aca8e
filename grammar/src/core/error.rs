//! Failure taxonomy for pipeline operations.
//!
//! Every failure an operation can produce is returned as a [`PipelineError`];
//! nothing crosses the public boundary as a panic. Callers branch on
//! [`PipelineError::kind`] and render the `Display` message.

use serde::Serialize;
use thiserror::Error;

use crate::core::types::Stage;

/// Outcome of a pipeline operation: the final text or a tagged failure.
pub type PipelineOutcome = Result<String, PipelineError>;

/// Stable tag for each failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Empty or whitespace-only text (or a required parameter) was supplied.
    InvalidInput,
    /// No usable generation capability could be constructed.
    CapabilityUnavailable,
    /// The generation call itself failed.
    ModelFailure,
    /// The generation call succeeded but returned blank text.
    EmptyModelResponse,
    /// The caller cancelled the operation or its deadline passed.
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::CapabilityUnavailable => "capability_unavailable",
            ErrorKind::ModelFailure => "model_failure",
            ErrorKind::EmptyModelResponse => "empty_model_response",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged failure returned by every pipeline operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    CapabilityUnavailable(String),

    #[error("{message}")]
    ModelFailure { stage: Stage, message: String },

    #[error("Empty response from model")]
    EmptyModelResponse { stage: Stage },

    #[error("{message}")]
    Cancelled { stage: Stage, message: String },
}

impl PipelineError {
    /// The failure class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidInput(_) => ErrorKind::InvalidInput,
            PipelineError::CapabilityUnavailable(_) => ErrorKind::CapabilityUnavailable,
            PipelineError::ModelFailure { .. } => ErrorKind::ModelFailure,
            PipelineError::EmptyModelResponse { .. } => ErrorKind::EmptyModelResponse,
            PipelineError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Human-readable message, identical to the `Display` output.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// The stage that was running when the failure occurred, if any.
    ///
    /// Precondition and construction failures happen before any stage runs.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::ModelFailure { stage, .. }
            | PipelineError::EmptyModelResponse { stage }
            | PipelineError::Cancelled { stage, .. } => Some(*stage),
            PipelineError::InvalidInput(_) | PipelineError::CapabilityUnavailable(_) => None,
        }
    }

    pub(crate) fn empty_input() -> Self {
        PipelineError::InvalidInput("Input text cannot be empty".to_string())
    }
}
