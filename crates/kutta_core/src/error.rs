use thiserror::Error;

/// Errors raised by the integration kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IntegrationError {
    /// The state handed to a stepper does not match the system's dimension.
    #[error("State dimension mismatch. Expected {expected}, got {actual}.")]
    ShapeMismatch { expected: usize, actual: usize },
}
