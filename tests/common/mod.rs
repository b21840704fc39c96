//! Shared fixtures: a scripted engine backend and temporary asset folders.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;

use vision_bridge::engine::{
    InferenceError, InputShape, Interpreter, InterpreterConfig, InterpreterFactory,
};
use vision_bridge::{Runtime, RuntimeConfig};

/// Observations shared between a test and the interpreters it creates.
#[derive(Default)]
pub struct EngineStats {
    pub created: AtomicUsize,
    pub dropped: AtomicUsize,
    pub last_input: Mutex<Vec<u8>>,
}

impl EngineStats {
    pub fn live(&self) -> usize {
        self.created.load(Ordering::SeqCst) - self.dropped.load(Ordering::SeqCst)
    }
}

/// Engine that returns a fixed score vector.
pub struct ScriptedInterpreter {
    shape: InputShape,
    scores: Vec<u8>,
    stats: Arc<EngineStats>,
}

impl Interpreter for ScriptedInterpreter {
    fn input_shape(&self) -> Result<InputShape, InferenceError> {
        Ok(self.shape)
    }

    fn run(&mut self, input: &[u8]) -> Result<Vec<u8>, InferenceError> {
        *self.stats.last_input.lock() = input.to_vec();
        Ok(self.scores.clone())
    }
}

impl Drop for ScriptedInterpreter {
    fn drop(&mut self) {
        self.stats.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

/// Factory for [`ScriptedInterpreter`].
pub struct ScriptedFactory {
    pub shape: InputShape,
    pub scores: Vec<u8>,
    pub stats: Arc<EngineStats>,
}

impl ScriptedFactory {
    pub fn new(shape: InputShape, scores: Vec<u8>) -> Self {
        Self {
            shape,
            scores,
            stats: Arc::new(EngineStats::default()),
        }
    }
}

impl InterpreterFactory for ScriptedFactory {
    fn name(&self) -> &str {
        "scripted"
    }

    fn create(
        &self,
        model: &[u8],
        config: &InterpreterConfig,
    ) -> Result<Box<dyn Interpreter>, InferenceError> {
        config.validate()?;
        if !model.starts_with(b"TFL3") {
            return Err(InferenceError::ModelError(
                "model bytes are not a TFLite flatbuffer".into(),
            ));
        }
        self.stats.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedInterpreter {
            shape: self.shape,
            scores: self.scores.clone(),
            stats: Arc::clone(&self.stats),
        }))
    }
}

pub const MODEL_BYTES: &[u8] = b"TFL3-scripted-model";

/// Temporary asset folder with a model, labels and test images.
pub struct Assets {
    pub dir: TempDir,
}

impl Assets {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let assets = Self { dir };
        assets.write("model.tflite", MODEL_BYTES);
        assets.write("labels.txt", b"cat\ndog\n");
        assets
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).expect("write asset");
        path
    }

    /// Write a solid-color PNG and return its absolute path as a string.
    pub fn png(&self, name: &str, width: u32, height: u32, rgb: [u8; 3]) -> String {
        let path = self.path(name);
        image::RgbImage::from_pixel(width, height, image::Rgb(rgb))
            .save(&path)
            .expect("write png");
        path.display().to_string()
    }

    pub fn runtime(&self, factory: ScriptedFactory) -> Runtime {
        let config = RuntimeConfig {
            assets_root: self.root().to_path_buf(),
            ..RuntimeConfig::default()
        };
        Runtime::with_factory(config, Box::new(factory))
    }
}
