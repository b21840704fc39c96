//! Inference engine module.
//!
//! Holds the engine seam, image preprocessing and result ranking. Model
//! execution itself is delegated to a backend behind [`InterpreterFactory`].

pub mod config;
pub mod error;
pub mod output;
pub mod preprocess;
pub mod ranking;
pub mod tflite;

mod interpreter;

pub use config::{InterpreterConfig, MAX_NUM_THREADS};
pub use error::InferenceError;
pub use interpreter::{invoke, InputShape, Interpreter, InterpreterFactory};
pub use output::Recognition;
pub use preprocess::{strip_file_uri, PreprocessError, Preprocessor, ResizeFilter};
pub use ranking::{confidence, top_above_threshold};
pub use tflite::TfliteFactory;
