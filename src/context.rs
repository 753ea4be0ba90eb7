//! Shared runtime context: configuration plus injected capabilities.
//!
//! Every pot, nursery and greenhouse carries a [`Context`]. Builders fill it;
//! nurseries hand their context down to the pots they plant.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::config::Config;
use crate::id::{Id, IdGenerator, RandomIds};
use crate::logging::{Field, Level, Logger};

#[derive(Clone)]
pub(crate) struct Context {
    pub(crate) cfg: Config,
    pub(crate) ids: Arc<dyn IdGenerator>,
    pub(crate) logger: Option<Arc<dyn Logger>>,
}

impl Context {
    pub(crate) fn next_id(&self) -> Id {
        self.ids.next_id()
    }

    /// Forwards a record to the logger, if any.
    ///
    /// A panicking logger is contained here and never reaches the caller.
    pub(crate) fn log(&self, level: Level, message: &str, fields: &[Field<'_>]) {
        let Some(logger) = &self.logger else {
            return;
        };
        let _ = catch_unwind(AssertUnwindSafe(|| logger.log(level, message, fields)));
    }
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cfg: Config::default(),
            ids: Arc::new(RandomIds),
            logger: None,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cfg", &self.cfg)
            .field("logger", &self.logger.as_ref().map(|logger| logger.name()))
            .finish_non_exhaustive()
    }
}
