// Copyright 2024-2026 vision-bridge Contributors
// SPDX-License-Identifier: Apache-2.0

//! C ABI for host runtimes.
//!
//! Operations return JSON replies (`{"error": ..., "result": ...}`) as
//! heap-allocated C strings that the caller frees with [`vb_string_free`].
//! Construction failures are reported through [`vb_last_error`].
//! Panics never cross the boundary.

mod error;
mod models;
mod runtime;

pub use error::{vb_clear_last_error, vb_last_error};
pub use models::{vb_close, vb_load_model, vb_run_model_on_image, vb_string_free};
pub use runtime::{vb_runtime_create, vb_runtime_destroy, VbRuntime};
