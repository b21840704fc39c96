//! Inference error types.
//!
//! All errors are fail-closed: a buffer that does not match the model's input
//! tensor is rejected, never truncated or padded.

use thiserror::Error;

/// Errors raised by an inference backend or the invoker around it.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Input validation failed: {0}")]
    InputValidation(String),

    #[error("Inference backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Unexpected model output: {0}")]
    OutputMismatch(String),
}

