use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::config::Config;
use crate::context::Context;
use crate::error::{BoxError, GardenError};
use crate::id::IdGenerator;
use crate::logging::Logger;
use crate::pot::pot::Pot;

/// Builder for planting pots with injected capabilities.
///
/// Reusable: every [`plant`](PotBuilder::plant) call shares the same config,
/// logger and id generator.
pub struct PotBuilder<T> {
    ctx: Context,
    _value: PhantomData<fn() -> T>,
}

impl<T> PotBuilder<T>
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

    /// Plants `operation`; see [`Pot::plant`].
    #[track_caller]
    pub fn plant<F, E>(&self, operation: F, deadline: Option<Duration>) -> Result<Pot<T>, GardenError>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let planted_at = Location::caller();
        let runtime = Handle::try_current().map_err(|_| GardenError::NoRuntime)?;
        Ok(Pot::seed(self.ctx.clone(), deadline, planted_at).start(&runtime, operation))
    }
}

impl<T> Default for PotBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for PotBuilder<T> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            _value: PhantomData,
        }
    }
}

impl<T> fmt::Debug for PotBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PotBuilder")
            .field("ctx", &self.ctx)
            .finish()
    }
}
