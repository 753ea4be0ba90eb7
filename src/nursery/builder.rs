use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::Config;
use crate::context::Context;
use crate::id::IdGenerator;
use crate::logging::Logger;
use crate::nursery::nursery::Nursery;

/// Builder for nurseries with injected capabilities.
///
/// Pots planted into the built nursery inherit its config, logger and id generator.
pub struct NurseryBuilder<T> {
    ctx: Context,
    _value: PhantomData<fn() -> T>,
}

impl<T> NurseryBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a builder with default config, random ids and no logger.
    pub fn new() -> Self {
        Self {
            ctx: Context::default(),
            _value: PhantomData,
        }
    }

    /// Sets the configuration (default deadline).
    pub fn with_config(mut self, cfg: Config) -> Self {
        self.ctx.cfg = cfg;
        self
    }

    /// Installs a logger.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.ctx.logger = Some(logger);
        self
    }

    /// Replaces the id generator.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ctx.ids = ids;
        self
    }

    /// Builds an empty nursery.
    pub fn build(self) -> Nursery<T> {
        Nursery::from_context(self.ctx)
    }
}

impl<T> Default for NurseryBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
