//! Metrics emitted through the `metrics` facade.
//!
//! Nothing is exported unless the host installs a recorder.

use metrics::{counter, gauge, histogram};

pub const MODELS_LOADED: &str = "vision_models_loaded_total";
pub const MODELS_CLOSED: &str = "vision_models_closed_total";
pub const MODELS_ACTIVE: &str = "vision_models_active";
pub const MODELS_LOADED_BYTES: &str = "vision_models_loaded_bytes";
pub const LOAD_FAILURES: &str = "vision_model_load_failures_total";
pub const INFERENCE_TOTAL: &str = "vision_inference_total";
pub const INFERENCE_LATENCY_MS: &str = "vision_inference_latency_ms";

pub fn record_model_loaded(active: usize, loaded_bytes: u64) {
    counter!(MODELS_LOADED).increment(1);
    gauge!(MODELS_ACTIVE).set(active as f64);
    gauge!(MODELS_LOADED_BYTES).set(loaded_bytes as f64);
}

pub fn record_model_load_failure() {
    counter!(LOAD_FAILURES).increment(1);
}

pub fn record_model_closed(active: usize, loaded_bytes: u64) {
    counter!(MODELS_CLOSED).increment(1);
    gauge!(MODELS_ACTIVE).set(active as f64);
    gauge!(MODELS_LOADED_BYTES).set(loaded_bytes as f64);
}

pub fn record_inference_success(latency_ms: f64) {
    counter!(INFERENCE_TOTAL, "status" => "ok").increment(1);
    histogram!(INFERENCE_LATENCY_MS).record(latency_ms);
}

pub fn record_inference_failure(kind: &'static str) {
    counter!(INFERENCE_TOTAL, "status" => "error", "kind" => kind).increment(1);
}
