//! # LogWriter - simple record printer
//!
//! A minimal logger that prints records to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [info] pot planted pot="5f0c..." deadline_ms=10000 planted_at="src/main.rs:12:5"
//! [debug] pot settled pot="5f0c..." outcome="success"
//! [warn] pot timed out pot="91aa..." deadline_ms=50
//! [info] nursery closed nursery="77e1..." pots=3 cancelled=2
//! ```

use crate::logging::logger::{Field, Level, Logger};

/// Stdout record writer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Logger for LogWriter {
    fn log(&self, level: Level, message: &str, fields: &[Field<'_>]) {
        let mut line = format!("[{}] {message}", level.as_label());
        for field in fields {
            line.push_str(&format!(" {}={:?}", field.key, field.value.to_string()));
        }
        println!("{line}");
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
