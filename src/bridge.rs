// Copyright 2024-2026 vision-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Host-facing operations with callback-style replies.
//!
//! Every operation returns a [`Reply`] holding either an error message or a
//! result, mirroring the `(error, result)` callbacks host runtimes expect.
//! Nothing here panics or returns `Err`; failures become the error slot.

use serde::{Deserialize, Serialize};

use crate::engine::Recognition;
use crate::{Runtime, RuntimeError};

/// Default message when a load fails without one.
pub const DEFAULT_LOAD_ERROR: &str = "Failed to load model";

/// Default message when an inference fails without one.
pub const DEFAULT_RUN_ERROR: &str = "Failed to run model";

/// Two-slot reply: exactly one of `error` and `result` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply<T> {
    pub error: Option<String>,
    pub result: Option<T>,
}

impl<T> Reply<T> {
    pub fn ok(result: T) -> Self {
        Self {
            error: None,
            result: Some(result),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            result: None,
        }
    }

    /// Convert a result, substituting `fallback` for an empty error message.
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>, fallback: &str) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(e) => Self::err(message_or(&e, fallback)),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl<T: Serialize> Reply<T> {
    /// JSON encoding `{"error": ..., "result": ...}`.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            // Only reachable if `T` fails to serialize; keep the reply shape.
            format!(
                "{{\"error\":{},\"result\":null}}",
                serde_json::Value::String(format!("Failed to encode reply: {}", e))
            )
        })
    }
}

fn message_or(error: &dyn std::fmt::Display, fallback: &str) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// `loadModel(modelAssetPath, labelsAssetPath) -> (error, modelId)`
pub fn load_model(runtime: &Runtime, model_path: &str, labels_path: &str) -> Reply<String> {
    let result = runtime
        .load_model(model_path, labels_path)
        .map(String::from);
    Reply::from_result(result, DEFAULT_LOAD_ERROR)
}

/// `runModelOnImage(modelId, imagePath, numResults, threshold) -> (error, results)`
///
/// A negative `num_results` yields an empty result list.
pub fn run_model_on_image(
    runtime: &Runtime,
    model_id: &str,
    image_path: &str,
    num_results: i32,
    threshold: f32,
) -> Reply<Vec<Recognition>> {
    let limit = usize::try_from(num_results).unwrap_or(0);
    let result: Result<_, RuntimeError> =
        runtime.run_model_on_image(model_id, image_path, limit, threshold);
    Reply::from_result(result, DEFAULT_RUN_ERROR)
}

/// `close(modelId)`; unknown ids are ignored.
pub fn close(runtime: &Runtime, model_id: &str) {
    runtime.close(model_id);
}
