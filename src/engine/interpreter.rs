//! Engine seam: construct from model bytes, describe the input tensor, run.
//!
//! Backends implement [`InterpreterFactory`] and [`Interpreter`]. Native
//! resources are released when the boxed interpreter is dropped.

use super::config::InterpreterConfig;
use super::error::InferenceError;

/// Shape of the model's image input tensor (NHWC, batch of one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputShape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl InputShape {
    pub fn new(height: usize, width: usize, channels: usize) -> Self {
        Self {
            height,
            width,
            channels,
        }
    }

    /// Build a shape from tensor dims, either `[1, h, w, c]` or `[h, w, c]`.
    pub fn from_dims(dims: &[usize]) -> Result<Self, InferenceError> {
        let (h, w, c) = match dims {
            [1, h, w, c] => (*h, *w, *c),
            [h, w, c] => (*h, *w, *c),
            [n, _, _, _] => {
                return Err(InferenceError::ModelError(format!(
                    "input batch size must be 1, got {}",
                    n
                )))
            }
            _ => {
                return Err(InferenceError::ModelError(format!(
                    "expected NHWC input tensor, got dims {:?}",
                    dims
                )))
            }
        };

        if h == 0 || w == 0 || c == 0 {
            return Err(InferenceError::ModelError(format!(
                "input tensor has a zero dimension: {:?}",
                dims
            )));
        }

        Ok(Self::new(h, w, c))
    }

    /// Number of bytes in one input buffer.
    pub fn len(&self) -> usize {
        self.height * self.width * self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A loaded engine instance bound to one model.
pub trait Interpreter: Send {
    /// Describe the first input tensor.
    fn input_shape(&self) -> Result<InputShape, InferenceError>;

    /// Run one synchronous forward pass and return the quantized scores.
    fn run(&mut self, input: &[u8]) -> Result<Vec<u8>, InferenceError>;
}

/// Constructs interpreters from model bytes.
pub trait InterpreterFactory: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    fn create(
        &self,
        model: &[u8],
        config: &InterpreterConfig,
    ) -> Result<Box<dyn Interpreter>, InferenceError>;
}

/// Execute one forward pass after checking the buffer against the input tensor.
pub fn invoke(
    interpreter: &mut dyn Interpreter,
    input: &[u8],
) -> Result<Vec<u8>, InferenceError> {
    let shape = interpreter.input_shape()?;
    if input.len() != shape.len() {
        return Err(InferenceError::InputValidation(format!(
            "input buffer is {} bytes, model expects {} ({}x{}x{})",
            input.len(),
            shape.len(),
            shape.height,
            shape.width,
            shape.channels
        )));
    }
    interpreter.run(input)
}
