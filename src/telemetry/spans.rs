//! Span utilities for inference requests.

use tracing::{info_span, Span};

/// Extension trait for recording an operation's outcome on its span.
pub trait SpanExt {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for `inference_request` spans.
pub struct RequestSpan;

impl RequestSpan {
    /// Fields `status`, `error.message`, `error.kind`, `latency_ms` and
    /// `results` are filled in as the request completes.
    pub fn new(model_id: &str) -> Span {
        info_span!(
            "inference_request",
            model_id = %model_id,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            error.kind = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
            results = tracing::field::Empty,
        )
    }
}
