//! # Global garden configuration.
//!
//! Provides [`Config`] centralized defaults shared by pots, nurseries and the greenhouse.
//!
//! ## Sentinel values
//! - `deadline = 0s` → the timeout fires as soon as the scheduler runs it
//! - negative millisecond deadlines are clamped to `0s` by [`Config::deadline_from_millis`]

use std::time::Duration;

/// Deadline applied when none is given (10 000 ms).
pub const DEFAULT_DEADLINE: Duration = Duration::from_millis(10_000);

/// Global configuration for planting operations.
///
/// ## Field semantics
/// - `deadline`: default per-pot deadline, used whenever a call passes `None`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Default time an operation may take before its pot settles as `TimedOut`.
    pub deadline: Duration,
}

impl Config {
    /// Returns a config with the given default deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Converts an integer millisecond deadline into a [`Duration`].
    ///
    /// Zero and negative values both mean "time out immediately".
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use greenhouse::Config;
    ///
    /// assert_eq!(Config::deadline_from_millis(250), Duration::from_millis(250));
    /// assert_eq!(Config::deadline_from_millis(-5), Duration::ZERO);
    /// ```
    #[inline]
    pub fn deadline_from_millis(ms: i64) -> Duration {
        Duration::from_millis(u64::try_from(ms).unwrap_or(0))
    }

    /// Picks the explicit deadline, falling back to the configured default.
    #[inline]
    pub fn resolve_deadline(&self, deadline: Option<Duration>) -> Duration {
        deadline.unwrap_or(self.deadline)
    }
}

impl Default for Config {
    /// Default configuration: `deadline = 10s`.
    fn default() -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
        }
    }
}
