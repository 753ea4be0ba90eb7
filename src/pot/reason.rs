//! # Failure reason carried by [`Outcome::Failure`](crate::Outcome::Failure).
//!
//! [`Reason`] wraps whatever error the operation produced in an `Arc`, so every
//! waiter of a pot receives a clone of the very same reason.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;

/// Shared, cloneable error describing why an operation failed.
///
/// Two reasons compare equal when they render the same message.
#[derive(Clone)]
pub struct Reason(Arc<dyn Error + Send + Sync + 'static>);

impl Reason {
    /// Wraps a concrete error.
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self(Arc::new(error))
    }

    /// Wraps an already boxed error without re-boxing it.
    pub fn from_boxed(error: BoxError) -> Self {
        Self(Arc::from(error))
    }

    /// Rendered error message.
    pub fn message(&self) -> String {
        self.0.to_string()
    }

    /// Borrows the underlying error.
    pub fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.0
    }

    /// Attempts to view the underlying error as `E`.
    ///
    /// # Example
    /// ```
    /// use greenhouse::{OperationError, Reason};
    ///
    /// let crash = OperationError::Panicked { message: "oops".into() };
    /// let reason = Reason::new(crash.clone());
    /// assert_eq!(reason.downcast_ref::<OperationError>(), Some(&crash));
    /// ```
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Error + 'static,
    {
        self.0.downcast_ref::<E>()
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Reason").field(&self.0).finish()
    }
}

impl PartialEq for Reason {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.message() == other.message()
    }
}

impl From<&str> for Reason {
    fn from(message: &str) -> Self {
        Self::from_boxed(BoxError::from(message))
    }
}

impl From<String> for Reason {
    fn from(message: String) -> Self {
        Self::from_boxed(BoxError::from(message))
    }
}

impl From<BoxError> for Reason {
    fn from(error: BoxError) -> Self {
        Self::from_boxed(error)
    }
}
