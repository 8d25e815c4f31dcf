//! Engine error types.

use thiserror::Error;

/// Structured error types for backtest construction and execution.
///
/// These are designed to be displayable in both CLI and report contexts.
#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("insufficient data: {len} aligned points (minimum {min})")]
    InsufficientData { len: usize, min: usize },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl BacktestError {
    /// Shorthand used by parameter validators.
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
