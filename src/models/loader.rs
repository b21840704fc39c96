//! Model and label loading from the asset root.

use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use super::labels::Labels;
use super::registry::{LoadedModel, ModelMetadata};
use crate::engine::{InferenceError, InterpreterConfig, InterpreterFactory};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Asset path not allowed: {0}")]
    PathNotAllowed(PathBuf),

    #[error("Asset not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid model format: {0}")]
    InvalidFormat(String),

    #[error("Failed to read labels {path}: {source}")]
    Labels {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create interpreter: {0}")]
    Engine(#[from] InferenceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validated asset path inside the asset root.
#[derive(Debug, Clone)]
pub struct AssetPath {
    path: PathBuf,
}

impl AssetPath {
    pub fn as_path(&self) -> &Path {
        &self.path
    }
}

/// Loads models and labels from a read-only asset directory.
pub struct ModelLoader {
    assets_root: PathBuf,
}

impl ModelLoader {
    pub fn new(assets_root: PathBuf) -> Self {
        Self { assets_root }
    }

    /// Resolve `relative_path` against the asset root, refusing anything that
    /// lands outside it once symlinks and `..` are resolved.
    pub fn validate_path(&self, relative_path: &str) -> Result<AssetPath, LoadError> {
        let full_path = self.assets_root.join(relative_path);
        let canonical = full_path
            .canonicalize()
            .map_err(|_| LoadError::NotFound(full_path.clone()))?;

        let root = self
            .assets_root
            .canonicalize()
            .map_err(|_| LoadError::NotFound(self.assets_root.clone()))?;

        if !canonical.starts_with(&root) || !canonical.is_file() {
            return Err(LoadError::PathNotAllowed(canonical));
        }

        Ok(AssetPath { path: canonical })
    }

    /// Model metadata from a validated path.
    pub fn load_metadata(&self, asset: &AssetPath) -> Result<ModelMetadata, LoadError> {
        let path = asset.as_path();
        let size = std::fs::metadata(path)?.len();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(ModelMetadata {
            name,
            size_bytes: size,
        })
    }

    /// Load model using memory-mapping (zero-copy).
    pub fn load_mapped(&self, asset: &AssetPath) -> Result<MappedModel, LoadError> {
        MappedModel::open(asset)
    }

    /// Read a newline-delimited label asset.
    pub fn load_labels(&self, relative_path: &str) -> Result<Labels, LoadError> {
        let asset = self.validate_path(relative_path)?;
        let file = File::open(asset.as_path()).map_err(|source| LoadError::Labels {
            path: asset.as_path().to_path_buf(),
            source,
        })?;
        Labels::read_from(file).map_err(|source| LoadError::Labels {
            path: asset.as_path().to_path_buf(),
            source,
        })
    }

    /// Build a ready-to-run model from a model asset and a label asset.
    ///
    /// The mapping is dropped once the engine has been constructed. If the
    /// labels fail to load, the engine is dropped before the error returns.
    pub fn load(
        &self,
        model_path: &str,
        labels_path: &str,
        factory: &dyn InterpreterFactory,
        config: &InterpreterConfig,
    ) -> Result<LoadedModel, LoadError> {
        let asset = self.validate_path(model_path)?;
        let metadata = self.load_metadata(&asset)?;
        if metadata.size_bytes == 0 {
            return Err(LoadError::InvalidFormat(format!(
                "model asset is empty: {}",
                model_path
            )));
        }

        let interpreter = {
            let mapped = self.load_mapped(&asset)?;
            debug!(
                backend = factory.name(),
                size_mb = mapped.len() as f64 / (1024.0 * 1024.0),
                threads = config.num_threads,
                "creating interpreter"
            );
            factory.create(mapped.as_bytes(), config)?
        };

        let labels = match self.load_labels(labels_path) {
            Ok(labels) => labels,
            Err(e) => {
                drop(interpreter);
                debug!(model = %metadata.name, "released interpreter after label failure");
                return Err(e);
            }
        };

        info!(
            model = %metadata.name,
            labels = labels.len(),
            size_bytes = metadata.size_bytes,
            "model loaded"
        );

        Ok(LoadedModel::new(interpreter, labels, metadata))
    }
}

/// Memory-mapped model for zero-copy loading.
pub struct MappedModel {
    mmap: Mmap,
}

impl MappedModel {
    /// Memory-map a model file for zero-copy access.
    pub fn open(path: &AssetPath) -> Result<Self, LoadError> {
        let file = File::open(path.as_path())?;
        // SAFETY: assets are read-only and are not modified while mapped
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { mmap })
    }

    /// Get model data as a byte slice (zero-copy).
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }

    /// Length of mapped data in bytes.
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Check if mapped region is empty.
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}
