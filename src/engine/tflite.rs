//! TensorFlow Lite inference backend.
//!
//! Wraps a quantized `.tflite` classifier with a single `uint8` NHWC input and
//! a single `uint8` score output.

use super::config::InterpreterConfig;
use super::error::InferenceError;
use super::interpreter::{Interpreter, InterpreterFactory};

/// Factory for TensorFlow Lite interpreters.
#[derive(Debug, Default, Clone, Copy)]
pub struct TfliteFactory;

impl InterpreterFactory for TfliteFactory {
    fn name(&self) -> &str {
        "tflite"
    }

    #[cfg(feature = "tflite")]
    fn create(
        &self,
        model: &[u8],
        config: &InterpreterConfig,
    ) -> Result<Box<dyn Interpreter>, InferenceError> {
        config.validate()?;
        let interpreter = backend::TfliteInterpreter::new(model, config)?;
        Ok(Box::new(interpreter))
    }

    /// Stub for builds without the `tflite` feature.
    #[cfg(not(feature = "tflite"))]
    fn create(
        &self,
        _model: &[u8],
        config: &InterpreterConfig,
    ) -> Result<Box<dyn Interpreter>, InferenceError> {
        config.validate()?;
        Err(InferenceError::BackendUnavailable(
            "TensorFlow Lite support not compiled in. Enable 'tflite' feature.".into(),
        ))
    }
}

#[cfg(feature = "tflite")]
mod backend {
    use std::os::raw::c_int;

    use tflite::ops::builtin::BuiltinOpResolver;
    use tflite::{FlatBufferModel, InterpreterBuilder, TensorIndex};
    use tracing::debug;

    use crate::engine::config::InterpreterConfig;
    use crate::engine::error::InferenceError;
    use crate::engine::interpreter::{InputShape, Interpreter};

    fn model_error(context: &'static str) -> impl Fn(tflite::Error) -> InferenceError {
        move |e| InferenceError::ModelError(format!("{}: {}", context, e))
    }

    pub struct TfliteInterpreter {
        inner: tflite::Interpreter<'static, BuiltinOpResolver>,
        input: TensorIndex,
        output: TensorIndex,
    }

    // SAFETY: the interpreter owns its model buffer and is only reached through
    // `&mut self`; the registry serializes every call under its mutex, so the
    // native object is never touched from two threads at once.
    unsafe impl Send for TfliteInterpreter {}

    impl TfliteInterpreter {
        pub fn new(model: &[u8], config: &InterpreterConfig) -> Result<Self, InferenceError> {
            let model = FlatBufferModel::build_from_buffer(model.to_vec())
                .map_err(model_error("invalid model buffer"))?;
            let builder = InterpreterBuilder::new(model, BuiltinOpResolver::default())
                .map_err(model_error("interpreter builder"))?;
            let mut inner = builder.build().map_err(model_error("interpreter build"))?;

            inner.set_num_threads(config.num_threads as c_int);
            inner
                .allocate_tensors()
                .map_err(model_error("tensor allocation"))?;

            let input = *inner.inputs().first().ok_or_else(|| {
                InferenceError::ModelError("model declares no input tensors".into())
            })?;
            let output = *inner.outputs().first().ok_or_else(|| {
                InferenceError::ModelError("model declares no output tensors".into())
            })?;

            debug!(
                inputs = inner.inputs().len(),
                outputs = inner.outputs().len(),
                threads = config.num_threads,
                "TFLite interpreter ready"
            );

            Ok(Self {
                inner,
                input,
                output,
            })
        }
    }

    impl Interpreter for TfliteInterpreter {
        fn input_shape(&self) -> Result<InputShape, InferenceError> {
            let info = self.inner.tensor_info(self.input).ok_or_else(|| {
                InferenceError::ModelError("input tensor descriptor unavailable".into())
            })?;
            InputShape::from_dims(&info.dims)
        }

        fn run(&mut self, input: &[u8]) -> Result<Vec<u8>, InferenceError> {
            let slot = self
                .inner
                .tensor_data_mut::<u8>(self.input)
                .map_err(|e| InferenceError::InputValidation(format!("input tensor: {}", e)))?;
            if slot.len() != input.len() {
                return Err(InferenceError::InputValidation(format!(
                    "input tensor holds {} bytes, got {}",
                    slot.len(),
                    input.len()
                )));
            }
            slot.copy_from_slice(input);

            self.inner.invoke().map_err(model_error("invoke"))?;

            let scores = self
                .inner
                .tensor_data::<u8>(self.output)
                .map_err(|e| InferenceError::OutputMismatch(format!("output tensor: {}", e)))?;
            Ok(scores.to_vec())
        }
    }
}

#[cfg(all(test, not(feature = "tflite")))]
mod tests {
    use super::*;

    #[test]
    fn test_stub_reports_missing_backend() {
        let result = TfliteFactory.create(&[0u8; 16], &InterpreterConfig::default());
        match result {
            Err(InferenceError::BackendUnavailable(msg)) => assert!(msg.contains("tflite")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("stub must not construct an interpreter"),
        }
    }

    #[test]
    fn test_stub_still_validates_config() {
        let result = TfliteFactory.create(&[], &InterpreterConfig::with_threads(0));
        assert!(matches!(result, Err(InferenceError::InputValidation(_))));
    }
}
