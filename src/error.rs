//! Error types used by the greenhouse runtime and tracked operations.
//!
//! This module defines two main error enums:
//!
//! - [`GardenError`] - misuse detected at the call that supplied the bad input.
//! - [`OperationError`] - failure reasons the runtime itself attaches to an operation.
//!
//! Expected outcomes (success, failure, timeout, cancellation) are never errors:
//! they are carried as data by [`Outcome`](crate::Outcome).
//! Both enums provide `as_label` helpers for logs/metrics.

use std::error::Error;

use thiserror::Error;

use crate::id::Id;

/// Boxed, thread-safe error returned by an operation.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// # Errors produced by the greenhouse API.
///
/// Returned synchronously by the call that was misused; they never surface
/// from inside the deadline race.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum GardenError {
    /// Planting requires a tokio runtime to drive the deadline race.
    #[error("no tokio runtime is available to drive pots")]
    NoRuntime,

    /// The nursery was closed, or evicted from its greenhouse, and accepts no new operations.
    #[error("nursery {nursery} is closed and accepts no new operations")]
    NurseryClosed {
        /// Identity of the closed nursery.
        nursery: Id,
    },
}

impl GardenError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use greenhouse::GardenError;
    ///
    /// assert_eq!(GardenError::NoRuntime.as_label(), "garden_no_runtime");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            GardenError::NoRuntime => "garden_no_runtime",
            GardenError::NurseryClosed { .. } => "garden_nursery_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            GardenError::NoRuntime => "no tokio runtime".to_string(),
            GardenError::NurseryClosed { nursery } => format!("nursery closed: {nursery}"),
        }
    }
}

/// # Failure reasons attached by the runtime.
///
/// An operation that panics still settles as [`Outcome::Failure`](crate::Outcome::Failure),
/// with one of these as its reason.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// The operation panicked while being polled.
    #[error("operation panicked: {message}")]
    Panicked {
        /// Panic payload rendered as text.
        message: String,
    },
}

impl OperationError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            OperationError::Panicked { .. } => "operation_panicked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let closed = GardenError::NurseryClosed {
            nursery: Id::from("n-1"),
        };
        assert_eq!(closed.as_label(), "garden_nursery_closed");
        assert_eq!(closed.as_message(), "nursery closed: n-1");
        let crash = OperationError::Panicked {
            message: "x".into(),
        };
        assert_eq!(crash.as_label(), "operation_panicked");
    }

    #[test]
    fn test_panicked_display_carries_message() {
        let err = OperationError::Panicked {
            message: "kaboom".into(),
        };
        assert_eq!(err.to_string(), "operation panicked: kaboom");
    }
}
