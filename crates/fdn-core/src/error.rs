//! Error types for the FDN reverberator

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FdnError {
    #[error("Network not ready: dimension {dimension} but {delay_lines} delay lines configured")]
    NotReady { dimension: usize, delay_lines: usize },

    #[error("Invalid dimension: {0} (expected 2, 4, 8 or 16)")]
    InvalidDimension(usize),

    #[error("Too many delay lines: {requested} requested, {available} primes available")]
    TooManyDelayLines { requested: usize, available: usize },

    #[error("Gain vector length mismatch: expected {expected}, got b={b} c={c}")]
    GainVectorLength { expected: usize, b: usize, c: usize },

    #[error("Control queue full")]
    QueueFull,
}

/// Result type alias
pub type FdnResult<T> = Result<T, FdnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_message() {
        let err = FdnError::NotReady {
            dimension: 8,
            delay_lines: 4,
        };
        assert_eq!(
            err.to_string(),
            "Network not ready: dimension 8 but 4 delay lines configured"
        );
    }
}
