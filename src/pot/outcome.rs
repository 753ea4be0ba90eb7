//! # Outcome of racing an operation against its deadline.
//!
//! ```text
//!             ┌──► Success(value)   operation resolved first
//!             ├──► Failure(reason)  operation failed first
//!  Pending ───┼──► TimedOut         deadline fired first
//!             └──► Cancelled        cancel() called first
//! ```
//!
//! ## Rules
//! - `Pending` is the only non-terminal state
//! - Terminal states are absorbing: once reached, the outcome never changes
//! - `TimedOut` and `Cancelled` are imposed by the pot and win over any late result

use crate::pot::reason::Reason;

/// State of a pot.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// No terminal outcome yet.
    Pending,
    /// The operation completed normally.
    Success(T),
    /// The operation completed abnormally.
    Failure(Reason),
    /// The deadline elapsed before the operation produced a result.
    TimedOut,
    /// The pot was cancelled before anything else happened.
    Cancelled,
}

impl<T> Outcome<T> {
    /// True while no terminal outcome has been reached.
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending)
    }

    /// True once the outcome can no longer change.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    /// True for `Success`.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use greenhouse::Outcome;
    ///
    /// assert_eq!(Outcome::<()>::TimedOut.as_label(), "timed_out");
    /// assert_eq!(Outcome::Success(1).as_label(), "success");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::Pending => "pending",
            Outcome::Success(_) => "success",
            Outcome::Failure(_) => "failure",
            Outcome::TimedOut => "timed_out",
            Outcome::Cancelled => "cancelled",
        }
    }

    /// Borrows the success value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(v) => Some(v),
            _ => None,
        }
    }

    /// Borrows the failure reason, if any.
    pub fn reason(&self) -> Option<&Reason> {
        match self {
            Outcome::Failure(r) => Some(r),
            _ => None,
        }
    }

    /// Consumes the outcome, returning the success value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Success(v) => Some(v),
            _ => None,
        }
    }
}
