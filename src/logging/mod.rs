//! Optional logging capability.
//!
//! The runtime reports what it does through an injected [`Logger`]. Nothing is
//! logged unless a logger is supplied to a builder, and a logger can never
//! change how a race resolves.
//!
//! ## Contents
//! - [`Logger`], [`Level`], [`Field`] the capability and its record shape
//! - [`TracingLogger`] forwards records to the `tracing` crate
//! - [`LogWriter`] prints records to stdout (feature `logging`, demo only)

mod logger;
mod tracing_logger;
#[cfg(feature = "logging")]
mod writer;

pub use logger::{Field, Level, Logger};
pub use tracing_logger::TracingLogger;
#[cfg(feature = "logging")]
pub use writer::LogWriter;
