//! Error types for the route solver.
//!
//! Every fallible operation returns `AcoResult<T>`. Configuration and input
//! problems are reported before any iteration runs; numeric anomalies raised
//! during a pheromone update are logged and skipped by the caller.

use thiserror::Error;

/// Result type alias for solver operations.
pub type AcoResult<T> = Result<T, AcoError>;

/// Unified error type for the solver.
#[derive(Debug, Error)]
pub enum AcoError {
    /// A configuration parameter is out of range.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Which parameter was rejected and why.
        message: String,
    },

    /// The point set or an input file cannot be used.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the problem.
        message: String,
    },

    /// A non-finite or degenerate value showed up during a run.
    #[error("Numeric anomaly: {message}")]
    NumericAnomaly {
        /// Description of the offending value.
        message: String,
    },

    /// An internal invariant was broken.
    #[error("Logic error: {message}")]
    LogicError {
        /// Which invariant failed.
        message: String,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV export error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AcoError {
    /// Create an invalid configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a numeric anomaly error.
    pub fn numeric(message: impl Into<String>) -> Self {
        Self::NumericAnomaly {
            message: message.into(),
        }
    }

    /// Create a logic error.
    pub fn logic(message: impl Into<String>) -> Self {
        Self::LogicError {
            message: message.into(),
        }
    }

    /// Whether a run can continue after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NumericAnomaly { .. })
    }
}
