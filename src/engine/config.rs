//! Interpreter configuration.
//!
//! All fields have safe defaults. Configuration is validated before an engine
//! instance is constructed.

use super::error::InferenceError;

/// Upper bound on engine worker threads per model.
pub const MAX_NUM_THREADS: usize = 64;

/// Per-model engine configuration, fixed at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Worker threads the engine may use during one forward pass.
    pub num_threads: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self { num_threads: 1 }
    }
}

impl InterpreterConfig {
    pub fn with_threads(num_threads: usize) -> Self {
        Self { num_threads }
    }

    /// Validate configuration values. Returns error on invalid values.
    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.num_threads == 0 {
            return Err(InferenceError::InputValidation(
                "num_threads must be >= 1".into(),
            ));
        }
        if self.num_threads > MAX_NUM_THREADS {
            return Err(InferenceError::InputValidation(format!(
                "num_threads must be <= {}",
                MAX_NUM_THREADS
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_single_threaded() {
        assert_eq!(InterpreterConfig::default().num_threads, 1);
        assert!(InterpreterConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_threads_rejected() {
        let config = InterpreterConfig::with_threads(0);
        assert!(matches!(
            config.validate(),
            Err(InferenceError::InputValidation(_))
        ));
    }

    #[test]
    fn test_thread_upper_bound() {
        assert!(InterpreterConfig::with_threads(MAX_NUM_THREADS).validate().is_ok());
        assert!(InterpreterConfig::with_threads(MAX_NUM_THREADS + 1)
            .validate()
            .is_err());
    }
}
