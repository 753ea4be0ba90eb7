//! # Core logger trait
//!
//! `Logger` is the extension point for observing what pots, nurseries and the
//! greenhouse do. It is optional everywhere: with no logger installed the runtime
//! behaves identically.
//!
//! ## Contract
//! - Calls are fire-and-forget and happen inline; implementations should be cheap.
//! - Implementations must not panic. A panic is caught and swallowed so it can
//!   never change the outcome of a race.
//!
//! ## Example
//! ```rust
//! use greenhouse::{Field, Level, Logger};
//!
//! struct Stderr;
//!
//! impl Logger for Stderr {
//!     fn log(&self, level: Level, message: &str, fields: &[Field<'_>]) {
//!         eprintln!("{} {message} {fields:?}", level.as_label());
//!     }
//! }
//! ```

use std::fmt;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Very fine-grained diagnostics (late results being discarded).
    Trace,
    /// Routine state changes (pot settled, nursery evicted).
    Debug,
    /// Notable lifecycle events (pot planted, nursery closed).
    Info,
    /// Imposed outcomes worth attention (pot timed out).
    Warn,
    /// Operations that blew up (panics).
    Error,
}

impl Level {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

/// One piece of structured context attached to a log record.
#[derive(Clone, Copy)]
pub struct Field<'a> {
    /// Context key, e.g. `"pot"`.
    pub key: &'static str,
    /// Context value, rendered lazily.
    pub value: &'a dyn fmt::Display,
}

impl<'a> Field<'a> {
    /// Creates a new field.
    pub fn new(key: &'static str, value: &'a dyn fmt::Display) -> Self {
        Self { key, value }
    }
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.key, self.value.to_string())
    }
}

/// Renders fields as `k1=v1 k2=v2`.
pub(crate) fn render_fields(fields: &[Field<'_>]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Contract for log sinks.
///
/// Only [`log`](Logger::log) is required; the per-level methods forward to it.
pub trait Logger: Send + Sync + 'static {
    /// Records one message with optional structured context.
    fn log(&self, level: Level, message: &str, fields: &[Field<'_>]);

    /// Records at [`Level::Info`].
    fn info(&self, message: &str, fields: &[Field<'_>]) {
        self.log(Level::Info, message, fields);
    }

    /// Records at [`Level::Warn`].
    fn warn(&self, message: &str, fields: &[Field<'_>]) {
        self.log(Level::Warn, message, fields);
    }

    /// Records at [`Level::Error`].
    fn error(&self, message: &str, fields: &[Field<'_>]) {
        self.log(Level::Error, message, fields);
    }

    /// Records at [`Level::Debug`].
    fn debug(&self, message: &str, fields: &[Field<'_>]) {
        self.log(Level::Debug, message, fields);
    }

    /// Records at [`Level::Trace`].
    fn trace(&self, message: &str, fields: &[Field<'_>]) {
        self.log(Level::Trace, message, fields);
    }

    /// Human-readable name (for diagnostics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
