//! Tracker error types
//!
//! Every failure here is recoverable: the caller reports it and may retry.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Need at least 2 weight entries in the last {window_days} days, found {found}")]
    InsufficientHistory { found: usize, window_days: u32 },

    #[error("All {samples} weight entries share one timestamp; cannot fit a trend")]
    DegenerateRegression { samples: usize },

    #[error("{operation} failed: {reason}")]
    NetworkFailure {
        operation: &'static str,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    ValidationFailure(String),

    #[error("An expenditure recompute is already in progress")]
    RecomputeInProgress,

    #[error("Local state error: {0}")]
    LocalState(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;

impl TrackerError {
    pub fn network(operation: &'static str, err: StoreError) -> Self {
        TrackerError::NetworkFailure {
            operation,
            reason: err.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        TrackerError::ValidationFailure(message.into())
    }

    /// Not enough usable history to fit a trend (includes the degenerate case)
    pub fn is_insufficient_history(&self) -> bool {
        matches!(
            self,
            TrackerError::InsufficientHistory { .. } | TrackerError::DegenerateRegression { .. }
        )
    }

    /// Short machine-readable kind for status fields
    pub fn kind(&self) -> &'static str {
        match self {
            TrackerError::InsufficientHistory { .. } => "insufficient_history",
            TrackerError::DegenerateRegression { .. } => "degenerate_regression",
            TrackerError::NetworkFailure { .. } => "network_failure",
            TrackerError::ValidationFailure(_) => "validation_failure",
            TrackerError::RecomputeInProgress => "busy",
            TrackerError::LocalState(_) => "local_state",
            TrackerError::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_history_message_reports_count() {
        let err = TrackerError::InsufficientHistory {
            found: 1,
            window_days: 7,
        };
        assert!(err.to_string().contains("Need at least 2 weight entries"));
        assert!(err.to_string().contains("found 1"));
        assert!(err.is_insufficient_history());
    }

    #[test]
    fn test_degenerate_counts_as_insufficient() {
        let err = TrackerError::DegenerateRegression { samples: 3 };
        assert!(err.is_insufficient_history());
        assert_eq!(err.kind(), "degenerate_regression");
    }

    #[test]
    fn test_network_failure_wraps_store_error() {
        let err = TrackerError::network("Fetch weights", StoreError::Unavailable("offline".into()));
        assert_eq!(err.kind(), "network_failure");
        assert!(err.to_string().starts_with("Fetch weights failed"));
        assert!(!err.is_insufficient_history());
    }
}
