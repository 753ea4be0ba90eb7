//! # Greenhouse: registry of nurseries with auto-eviction.
//!
//! The greenhouse owns a map `Id → Arc<Nursery>`. Every submitted nursery is
//! registered under its own id and removed again once it fully settles.
//!
//! ## Architecture
//! ```text
//! submit(ops) ──► Nursery::plant(ops)
//!                   ├─► nurseries.insert(nursery.id(), nursery)
//!                   └─► spawn(evict_when_settled):
//!                         select! {
//!                           shutdown.cancelled()  ─► exit
//!                           nursery.settle_and_seal() ─► evict(nursery)
//!                         }
//!
//! close_nursery(id) ─► nursery.close() ─► settle resolves ─► evicted
//! drain()           ─► settle_and_seal(snapshot) ─► remove snapshot entries
//! ```
//!
//! ## Rules
//! - Registry key == nursery id, so any id returned by `submit` is a valid lookup key
//! - Eviction removes exactly the settled entry (pointer identity), never a successor
//! - A nursery is sealed before it leaves the registry; handles kept from `submit`
//!   then reject `plant`, so an unregistered nursery never holds a pending pot
//! - Eviction tasks hold a `Weak` back-reference and stop when the greenhouse drops
//! - Unknown ids are not errors: lookups return `None`, closes return `false`

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::Location;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::Duration;

use futures::future::join_all;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::context::Context;
use crate::error::{BoxError, GardenError};
use crate::greenhouse::builder::GreenhouseBuilder;
use crate::id::Id;
use crate::logging::{Field, Level};
use crate::nursery::Nursery;

/// Registry of in-flight nurseries.
///
/// Created through [`Greenhouse::builder`] or [`Greenhouse::new`], always
/// behind an `Arc`.
///
/// ## Example
/// ```rust
/// use futures::FutureExt;
/// use greenhouse::{BoxError, Greenhouse, Outcome};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let greenhouse = Greenhouse::new();
///     let nursery = greenhouse.submit(
///         [async { Ok::<_, BoxError>("a") }.boxed(), async { Ok("b") }.boxed()],
///         None,
///     )?;
///     assert!(greenhouse.get(nursery.id()).is_some());
///
///     greenhouse.drain().await;
///     assert!(greenhouse.list_nurseries().is_empty());
///     assert_eq!(nursery.outcomes(), vec![Outcome::Success("a"), Outcome::Success("b")]);
///     Ok(())
/// }
/// ```
pub struct Greenhouse<T> {
    nurseries: RwLock<HashMap<Id, Arc<Nursery<T>>>>,
    ctx: Context,
    me: Weak<Self>,
    shutdown: CancellationToken,
}

impl<T> Greenhouse<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a greenhouse with default config, random ids and no logger.
    pub fn new() -> Arc<Self> {
        Self::builder(Config::default()).build()
    }

    /// Creates a builder for injecting logger and id generator.
    pub fn builder(cfg: Config) -> GreenhouseBuilder<T> {
        GreenhouseBuilder::new(cfg)
    }

    pub(crate) fn new_internal(ctx: Context) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            nurseries: RwLock::new(HashMap::new()),
            ctx,
            me: me.clone(),
            shutdown: CancellationToken::new(),
        })
    }

    /// Plants `operations` into a fresh nursery and registers it under its id.
    ///
    /// Never blocks. The nursery is evicted in the background once it fully
    /// settles; the returned handle stays usable after eviction.
    #[track_caller]
    pub fn submit<I, F, E>(
        &self,
        operations: I,
        deadline: Option<Duration>,
    ) -> Result<Arc<Nursery<T>>, GardenError>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let planted_at = Location::caller();
        let runtime = Handle::try_current().map_err(|_| GardenError::NoRuntime)?;

        let nursery = Arc::new(Nursery::from_context(self.ctx.clone()));
        nursery.plant_at(operations, deadline, planted_at)?;

        self.write()
            .insert(nursery.id().clone(), Arc::clone(&nursery));
        self.ctx.log(
            Level::Debug,
            "nursery registered",
            &[
                Field::new("nursery", nursery.id()),
                Field::new("pots", &nursery.len()),
            ],
        );

        runtime.spawn(Self::evict_when_settled(
            self.me.clone(),
            Arc::clone(&nursery),
            self.shutdown.clone(),
        ));
        Ok(nursery)
    }

    /// Closes the nursery registered under `id`.
    ///
    /// Returns `false` if no such nursery is registered (already evicted or never existed).
    pub fn close_nursery(&self, id: &Id) -> bool {
        match self.get(id) {
            Some(nursery) => {
                nursery.close();
                true
            }
            None => false,
        }
    }

    /// Closes every registered nursery. Eviction follows as each one settles.
    pub fn close_all(&self) {
        for nursery in self.list_nurseries() {
            nursery.close();
        }
    }

    /// Waits for every nursery registered at call time to settle, then removes them.
    ///
    /// Drained nurseries are sealed and reject further plants.
    /// Nurseries submitted while draining are neither awaited nor removed.
    pub async fn drain(&self) {
        let snapshot = self.list_nurseries();
        join_all(snapshot.iter().map(|nursery| nursery.settle_and_seal())).await;

        {
            let mut nurseries = self.write();
            for nursery in &snapshot {
                remove_exact(&mut nurseries, nursery);
            }
        }
        self.ctx.log(
            Level::Info,
            "greenhouse drained",
            &[Field::new("nurseries", &snapshot.len())],
        );
    }

    /// Awaits settlement in the background, seals, then evicts exactly this nursery.
    async fn evict_when_settled(
        me: Weak<Self>,
        nursery: Arc<Nursery<T>>,
        shutdown: CancellationToken,
    ) {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = nursery.settle_and_seal() => {}
        }

        let Some(greenhouse) = me.upgrade() else {
            return;
        };
        let evicted = remove_exact(&mut greenhouse.write(), &nursery);
        if evicted {
            greenhouse.ctx.log(
                Level::Debug,
                "nursery evicted",
                &[Field::new("nursery", nursery.id())],
            );
        }
    }
}

impl<T> Greenhouse<T> {
    /// Looks up a registered nursery by id.
    pub fn get(&self, id: &Id) -> Option<Arc<Nursery<T>>> {
        self.read().get(id).cloned()
    }

    /// Point-in-time copy of the registered nurseries, sorted by id.
    pub fn list_nurseries(&self) -> Vec<Arc<Nursery<T>>> {
        let mut nurseries: Vec<_> = self.read().values().cloned().collect();
        nurseries.sort_unstable_by(|a, b| a.id().cmp(b.id()));
        nurseries
    }

    /// Number of registered nurseries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// True if no nursery is registered.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Id, Arc<Nursery<T>>>> {
        self.nurseries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Id, Arc<Nursery<T>>>> {
        self.nurseries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Drop for Greenhouse<T> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl<T> fmt::Debug for Greenhouse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Greenhouse")
            .field("nurseries", &self.len())
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

/// Removes `nursery` only if it is still the entry registered under its id.
fn remove_exact<T>(nurseries: &mut HashMap<Id, Arc<Nursery<T>>>, nursery: &Arc<Nursery<T>>) -> bool {
    let registered = nurseries
        .get(nursery.id())
        .is_some_and(|current| Arc::ptr_eq(current, nursery));
    if registered {
        nurseries.remove(nursery.id());
    }
    registered
}
