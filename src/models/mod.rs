//! Model management module.
//!
//! Handles asset loading, label lists and registry tracking.

mod labels;
mod loader;
mod registry;

pub use labels::{Labels, UNKNOWN_LABEL};
pub use loader::{AssetPath, LoadError, MappedModel, ModelLoader};
pub use registry::{LoadedModel, ModelId, ModelMetadata, ModelRegistry, SharedModel};
