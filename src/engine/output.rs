//! Inference output types.

use serde::{Deserialize, Serialize};

/// One ranked label with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    pub label: String,
    /// Quantized score normalized to [0, 1].
    pub confidence: f64,
}

impl Recognition {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}
