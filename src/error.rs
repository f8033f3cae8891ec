use thiserror::Error;

/// Application-level failure carrying the process exit code.
#[derive(Debug, Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

/// Failures raised by the convergence engine.
///
/// `Domain` and `ConvergenceFailure` are recovered per field by the study
/// aggregator; `Usage` always reaches the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvergenceError {
    /// Invalid math in a pure formula (zero division, log of a non-positive value, ...).
    #[error("domain error: {0}")]
    Domain(String),

    /// The order-of-convergence iteration ran out of budget or diverged.
    #[error("order of convergence failed to converge after {iterations} iterations (residual {residual:.3e})")]
    ConvergenceFailure { iterations: usize, residual: f64 },

    /// Malformed or insufficient input at the study boundary.
    #[error("usage error: {0}")]
    Usage(String),
}

impl ConvergenceError {
    pub fn domain(message: impl Into<String>) -> Self {
        ConvergenceError::Domain(message.into())
    }

    pub fn usage(message: impl Into<String>) -> Self {
        ConvergenceError::Usage(message.into())
    }
}

pub type ConvergenceResult<T> = Result<T, ConvergenceError>;

impl From<ConvergenceError> for AppError {
    fn from(err: ConvergenceError) -> Self {
        let exit_code = match err {
            ConvergenceError::Usage(_) => 3,
            ConvergenceError::Domain(_) | ConvergenceError::ConvergenceFailure { .. } => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_map_to_exit_code_3() {
        let err: AppError = ConvergenceError::usage("no triplets").into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("no triplets"));
    }

    #[test]
    fn numerical_errors_map_to_exit_code_4() {
        let err: AppError = ConvergenceError::ConvergenceFailure {
            iterations: 11,
            residual: 0.5,
        }
        .into();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn app_error_debug_shows_code_and_message() {
        let err = AppError::new(2, "bad line");
        let debug = format!("{err:?}");
        assert!(debug.contains("exit_code: 2"), "{debug}");
        assert!(debug.contains("bad line"), "{debug}");
        assert_eq!(err.to_string(), "bad line");
    }
}
