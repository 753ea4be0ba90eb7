use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::Config;
use crate::context::Context;
use crate::greenhouse::greenhouse::Greenhouse;
use crate::id::IdGenerator;
use crate::logging::Logger;

/// Builder for constructing a [`Greenhouse`] with optional capabilities.
pub struct GreenhouseBuilder<T> {
    ctx: Context,
    _value: PhantomData<fn() -> T>,
}

impl<T> GreenhouseBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            ctx: Context {
                cfg,
                ..Context::default()
            },
            _value: PhantomData,
        }
    }

    /// Installs a logger.
    ///
    /// The logger is handed down to every nursery and pot the greenhouse creates.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.ctx.logger = Some(logger);
        self
    }

    /// Replaces the id generator used for nurseries and their pots.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ctx.ids = ids;
        self
    }

    /// Builds and returns the greenhouse.
    pub fn build(self) -> Arc<Greenhouse<T>> {
        Greenhouse::new_internal(self.ctx)
    }
}
