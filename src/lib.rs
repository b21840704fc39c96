//! vision-bridge
//!
//! On-device image classification for a host application. Loads a quantized
//! classifier and its label list from the application's assets, runs it on an
//! image file and returns the labels whose confidence clears a threshold.
//!
//! # Layers
//!
//! - [`models`]: asset loading, label lists, the model registry
//! - [`engine`]: engine seam, image preprocessing, ranking
//! - [`Runtime`]: `load_model` / `run_model_on_image` / `close`
//! - [`bridge`]: two-slot `(error, result)` replies for host callbacks
//! - `ffi`: C ABI over the bridge (feature `ffi`)

pub mod bridge;
pub mod config;
pub mod engine;
pub mod models;
pub mod telemetry;

#[cfg(feature = "ffi")]
pub mod ffi;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use engine::{
    top_above_threshold, InferenceError, InterpreterConfig, InterpreterFactory, PreprocessError,
    Preprocessor, Recognition, ResizeFilter, TfliteFactory,
};
use models::{LoadError, ModelId, ModelLoader, ModelRegistry};
use telemetry::{RequestSpan, SpanExt};

/// Errors surfaced by runtime operations.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("No such modelId")]
    NoSuchModel(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl RuntimeError {
    /// Short stable name of the failure class, for spans and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoSuchModel(_) => "no_such_model",
            Self::Load(_) => "load",
            Self::Preprocess(_) => "preprocess",
            Self::Inference(_) => "inference",
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub assets_root: PathBuf,
    pub interpreter: InterpreterConfig,
    pub resize_filter: ResizeFilter,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            assets_root: PathBuf::from("."),
            interpreter: InterpreterConfig::default(),
            resize_filter: ResizeFilter::default(),
        }
    }
}

/// The classification runtime: loader, registry and engine backend.
pub struct Runtime {
    pub model_loader: ModelLoader,
    pub model_registry: Arc<ModelRegistry>,
    preprocessor: Preprocessor,
    interpreter_config: InterpreterConfig,
    factory: Box<dyn InterpreterFactory>,
}

impl Runtime {
    /// Create a runtime backed by TensorFlow Lite.
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_factory(config, Box::new(TfliteFactory))
    }

    /// Create a runtime with a custom engine backend.
    pub fn with_factory(config: RuntimeConfig, factory: Box<dyn InterpreterFactory>) -> Self {
        Self {
            model_loader: ModelLoader::new(config.assets_root),
            model_registry: Arc::new(ModelRegistry::new()),
            preprocessor: Preprocessor::new(config.resize_filter),
            interpreter_config: config.interpreter,
            factory,
        }
    }

    /// Load a model and its labels from the asset root.
    ///
    /// Nothing is registered unless both assets load and the engine builds.
    pub fn load_model(&self, model_path: &str, labels_path: &str) -> Result<ModelId, RuntimeError> {
        let loaded = self
            .model_loader
            .load(
                model_path,
                labels_path,
                self.factory.as_ref(),
                &self.interpreter_config,
            )
            .map_err(|e| {
                warn!(model_path, labels_path, error = %e, "model load failed");
                telemetry::record_model_load_failure();
                e
            })?;

        let id = self.model_registry.register(loaded);
        let active = self.model_registry.count();
        let loaded_bytes = self.model_registry.total_memory();
        telemetry::record_model_loaded(active, loaded_bytes);
        info!(model_id = %id, model_path, active, loaded_bytes, "model registered");
        Ok(id)
    }

    /// Classify the image at `image_path` with a loaded model.
    ///
    /// Returns at most `num_results` labels whose confidence is strictly
    /// greater than `threshold`, best first.
    pub fn run_model_on_image(
        &self,
        model_id: &str,
        image_path: &str,
        num_results: usize,
        threshold: f32,
    ) -> Result<Vec<Recognition>, RuntimeError> {
        let span = RequestSpan::new(model_id);
        let _guard = span.enter();
        let started = Instant::now();

        let result = self.classify(model_id, image_path, num_results, threshold);

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        span.record("latency_ms", latency_ms);
        span.record_result(&result);
        match &result {
            Ok(recognitions) => {
                span.record("results", recognitions.len());
                telemetry::record_inference_success(latency_ms);
            }
            Err(e) => {
                span.record("error.kind", e.kind());
                warn!(model_id, kind = e.kind(), error = %e, "inference failed");
                telemetry::record_inference_failure(e.kind());
            }
        }
        result
    }

    fn classify(
        &self,
        model_id: &str,
        image_path: &str,
        num_results: usize,
        threshold: f32,
    ) -> Result<Vec<Recognition>, RuntimeError> {
        let model = self
            .model_registry
            .get(model_id)
            .ok_or_else(|| RuntimeError::NoSuchModel(model_id.to_string()))?;

        let shape = model.lock().input_shape()?;
        let input = self.preprocessor.preprocess_file(image_path, shape)?;

        let mut loaded = model.lock();
        let scores = loaded.invoke(&input)?;
        debug!(scores = scores.len(), "forward pass complete");
        if scores.len() != loaded.labels().len() {
            warn!(
                model = %loaded.metadata().name,
                scores = scores.len(),
                labels = loaded.labels().len(),
                "model output size does not match label count"
            );
        }

        Ok(top_above_threshold(
            &scores,
            loaded.labels(),
            num_results,
            f64::from(threshold),
        ))
    }

    /// Release a loaded model. Unknown ids are ignored.
    ///
    /// Returns whether a model was removed.
    pub fn close(&self, model_id: &str) -> bool {
        match self.model_registry.unregister(model_id) {
            Some(model) => {
                drop(model);
                let active = self.model_registry.count();
                let loaded_bytes = self.model_registry.total_memory();
                telemetry::record_model_closed(active, loaded_bytes);
                info!(model_id, active, loaded_bytes, "model closed");
                true
            }
            None => {
                debug!(model_id, "close ignored for unknown model");
                false
            }
        }
    }

    /// Check whether `model_id` is loaded.
    pub fn contains(&self, model_id: &str) -> bool {
        self.model_registry.contains(model_id)
    }

    /// Number of loaded models.
    pub fn model_count(&self) -> usize {
        self.model_registry.count()
    }

    /// Name of the engine backend.
    pub fn backend_name(&self) -> &str {
        self.factory.name()
    }
}
