//! Telemetry module.
//!
//! Structured logging, request spans and metrics. All output goes to the
//! process's stderr, a log file, or whatever recorder the host installs.

mod logging;
pub mod metrics;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::{
    record_inference_failure, record_inference_success, record_model_closed,
    record_model_load_failure, record_model_loaded,
};
pub use spans::{RequestSpan, SpanExt};
