//! # TracingLogger - bridge to the `tracing` ecosystem
//!
//! Forwards every record to the matching `tracing` macro under the
//! `greenhouse` target, with the structured context rendered into a
//! `context` field. Install any `tracing` subscriber to see the output.

use crate::logging::logger::{Field, Level, Logger, render_fields};

/// Logger that emits `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl TracingLogger {
    /// Construct a new [`TracingLogger`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str, fields: &[Field<'_>]) {
        let context = render_fields(fields);
        match level {
            Level::Trace => tracing::trace!(target: "greenhouse", context = %context, "{message}"),
            Level::Debug => tracing::debug!(target: "greenhouse", context = %context, "{message}"),
            Level::Info => tracing::info!(target: "greenhouse", context = %context, "{message}"),
            Level::Warn => tracing::warn!(target: "greenhouse", context = %context, "{message}"),
            Level::Error => tracing::error!(target: "greenhouse", context = %context, "{message}"),
        }
    }

    fn name(&self) -> &'static str {
        "TracingLogger"
    }
}
