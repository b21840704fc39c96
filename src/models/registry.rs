//! Model registry for tracking loaded models.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::labels::Labels;
use crate::engine::{InferenceError, InputShape, Interpreter};

/// Opaque identifier of a loaded model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    /// Fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<ModelId> for String {
    fn from(id: ModelId) -> Self {
        id.0
    }
}

impl Borrow<str> for ModelId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Basic model metadata.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    pub name: String,
    pub size_bytes: u64,
}

/// An engine instance together with its labels.
///
/// Dropping a `LoadedModel` releases the engine's native resources.
pub struct LoadedModel {
    interpreter: Box<dyn Interpreter>,
    labels: Labels,
    metadata: ModelMetadata,
}

impl LoadedModel {
    pub fn new(interpreter: Box<dyn Interpreter>, labels: Labels, metadata: ModelMetadata) -> Self {
        Self {
            interpreter,
            labels,
            metadata,
        }
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn input_shape(&self) -> Result<InputShape, InferenceError> {
        self.interpreter.input_shape()
    }

    /// One checked forward pass.
    pub fn invoke(&mut self, input: &[u8]) -> Result<Vec<u8>, InferenceError> {
        crate::engine::invoke(self.interpreter.as_mut(), input)
    }
}

/// Registry entry. In-flight inferences hold a clone, so `unregister` never
/// waits on a running forward pass; the engine is released with the last clone.
pub type SharedModel = Arc<Mutex<LoadedModel>>;

/// Thread-safe registry of loaded models.
pub struct ModelRegistry {
    models: Mutex<HashMap<ModelId, SharedModel>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self {
            models: Mutex::new(HashMap::new()),
        }
    }

    /// Register a model under a fresh identifier and return it.
    pub fn register(&self, model: LoadedModel) -> ModelId {
        let mut models = self.models.lock();
        let mut id = ModelId::generate();
        while models.contains_key(&id) {
            id = ModelId::generate();
        }
        models.insert(id.clone(), Arc::new(Mutex::new(model)));
        id
    }

    /// Check if a model id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.models.lock().contains_key(id)
    }

    /// Shared handle to a loaded model.
    pub fn get(&self, id: &str) -> Option<SharedModel> {
        self.models.lock().get(id).cloned()
    }

    /// Remove a model from the registry.
    pub fn unregister(&self, id: &str) -> Option<SharedModel> {
        self.models.lock().remove(id)
    }

    /// Total bytes of model assets currently loaded.
    pub fn total_memory(&self) -> u64 {
        let models: Vec<SharedModel> = self.models.lock().values().cloned().collect();
        models.iter().map(|m| m.lock().metadata().size_bytes).sum()
    }

    /// Number of loaded models.
    pub fn count(&self) -> usize {
        self.models.lock().len()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
