//! # Nursery: an ordered batch of pots.
//!
//! A [`Nursery`] owns the pots planted through it, in insertion order. It never
//! removes an individual pot; it can only close all of them at once.
//!
//! ## Lifecycle
//! ```text
//! new() / with_operations(ops)
//!   └─► plant(ops) ... plant(ops)     append-only, chainable
//!         ├─► is_fully_settled()      every pot terminal (non-blocking)
//!         ├─► settle().await          outcomes in insertion order
//!         └─► close()                 cancel pending pots, reject further plants
//! ```
//!
//! ## Rules
//! - `settle()` results are positionally aligned with insertion order,
//!   regardless of which pot settles first
//! - `settle()` also waits for pots added while it was waiting
//! - An empty nursery is fully settled
//! - A sealed nursery (evicted from a greenhouse) rejects plants like a closed one
//! - Caller code (operation iterators, id generators, loggers) never runs under the bed lock

use std::fmt;
use std::future::Future;
use std::panic::Location;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use tokio::runtime::Handle;

use crate::context::Context;
use crate::error::{BoxError, GardenError};
use crate::id::Id;
use crate::logging::{Field, Level};
use crate::nursery::builder::NurseryBuilder;
use crate::pot::{Outcome, Pot};

struct Beds<T> {
    pots: Vec<Pot<T>>,
    closed: bool,
    sealed: bool,
}

/// Ordered, append-only group of pots.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use futures::FutureExt;
/// use greenhouse::{BoxError, Nursery, Outcome};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let slow = async {
///         tokio::time::sleep(Duration::from_millis(20)).await;
///         Ok::<_, BoxError>(1)
///     };
///     let fast = async { Ok::<_, BoxError>(2) };
///
///     let nursery = Nursery::with_operations([slow.boxed(), fast.boxed()], None)?;
///     assert_eq!(
///         nursery.settle().await,
///         vec![Outcome::Success(1), Outcome::Success(2)]
///     );
///     assert!(nursery.is_fully_settled());
///     Ok(())
/// }
/// ```
pub struct Nursery<T> {
    id: Id,
    beds: Mutex<Beds<T>>,
    ctx: Context,
}

impl<T> Nursery<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates an empty nursery with default config, random ids and no logger.
    pub fn new() -> Self {
        Self::from_context(Context::default())
    }

    /// Creates a builder for injecting config, logger and id generator.
    pub fn builder() -> NurseryBuilder<T> {
        NurseryBuilder::new()
    }

    /// Creates a nursery and plants `operations` into it, all sharing `deadline`.
    #[track_caller]
    pub fn with_operations<I, F, E>(
        operations: I,
        deadline: Option<Duration>,
    ) -> Result<Self, GardenError>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let nursery = Self::new();
        nursery.plant_at(operations, deadline, Location::caller())?;
        Ok(nursery)
    }

    pub(crate) fn from_context(ctx: Context) -> Self {
        Self {
            id: ctx.next_id(),
            beds: Mutex::new(Beds {
                pots: Vec::new(),
                closed: false,
                sealed: false,
            }),
            ctx,
        }
    }

    /// Appends one pot per operation, all sharing `deadline`.
    ///
    /// Returns `self` so calls can be chained with `?`.
    /// Fails with [`GardenError::NurseryClosed`] after [`close`](Self::close).
    #[track_caller]
    pub fn plant<I, F, E>(
        &self,
        operations: I,
        deadline: Option<Duration>,
    ) -> Result<&Self, GardenError>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        self.plant_at(operations, deadline, Location::caller())?;
        Ok(self)
    }

    /// Appends a single operation; returns its pot.
    #[track_caller]
    pub fn plant_one<F, E>(
        &self,
        operation: F,
        deadline: Option<Duration>,
    ) -> Result<Pot<T>, GardenError>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let planted_at = Location::caller();
        let runtime = Handle::try_current().map_err(|_| GardenError::NoRuntime)?;
        self.ensure_open()?;

        let seedling = Pot::seed(self.ctx.clone(), deadline, planted_at);
        self.open_beds()?.pots.push(seedling.pot().clone());
        Ok(seedling.start(&runtime, operation))
    }

    /// Registers the new pots under the bed lock, then spawns them outside it.
    ///
    /// Pots are registered before any operation is spawned, so `close()` can
    /// never miss one; if the nursery closed meanwhile nothing is spawned.
    pub(crate) fn plant_at<I, F, E>(
        &self,
        operations: I,
        deadline: Option<Duration>,
        planted_at: &'static Location<'static>,
    ) -> Result<(), GardenError>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| GardenError::NoRuntime)?;
        self.ensure_open()?;

        let seeded: Vec<_> = operations
            .into_iter()
            .map(|op| (Pot::seed(self.ctx.clone(), deadline, planted_at), op))
            .collect();
        self.open_beds()?
            .pots
            .extend(seeded.iter().map(|(seedling, _)| seedling.pot().clone()));

        for (seedling, op) in seeded {
            seedling.start(&runtime, op);
        }
        Ok(())
    }

    /// Fails fast without holding the lock while caller code runs.
    fn ensure_open(&self) -> Result<(), GardenError> {
        self.open_beds().map(drop)
    }

    /// Locks the beds, refusing if the nursery is closed or sealed.
    fn open_beds(&self) -> Result<MutexGuard<'_, Beds<T>>, GardenError> {
        let beds = self.beds();
        if beds.closed || beds.sealed {
            return Err(GardenError::NurseryClosed {
                nursery: self.id.clone(),
            });
        }
        Ok(beds)
    }

    /// Seals the nursery iff every pot is settled, checked under the bed lock.
    ///
    /// Once sealed, `plant` fails with [`GardenError::NurseryClosed`], so a
    /// sealed nursery stays fully settled forever.
    pub(crate) fn seal_if_settled(&self) -> bool {
        let mut beds = self.beds();
        if beds.pots.iter().all(Pot::is_settled) {
            beds.sealed = true;
        }
        beds.sealed
    }

    /// Settles, then seals; re-awaits if a pot was planted in between.
    pub(crate) async fn settle_and_seal(&self) -> Vec<Outcome<T>> {
        loop {
            let outcomes = self.settle().await;
            if self.seal_if_settled() {
                return outcomes;
            }
        }
    }

    /// Waits until every pot settled; outcomes follow insertion order.
    ///
    /// Pots planted while waiting are awaited too.
    pub async fn settle(&self) -> Vec<Outcome<T>> {
        loop {
            let pots = self.pots();
            let outcomes = join_all(pots.iter().map(|pot| pot.settle())).await;
            if outcomes.len() == self.len() {
                return outcomes;
            }
        }
    }

    /// Non-blocking snapshot of every pot's current outcome.
    pub fn outcomes(&self) -> Vec<Outcome<T>> {
        self.beds().pots.iter().map(Pot::outcome).collect()
    }

    /// Cancels every pending pot and rejects further planting. Idempotent.
    pub fn close(&self) {
        let pots = {
            let mut beds = self.beds();
            if beds.closed {
                return;
            }
            beds.closed = true;
            beds.pots.clone()
        };

        let cancelled = pots.iter().filter(|pot| pot.cancel()).count();
        self.ctx.log(
            Level::Info,
            "nursery closed",
            &[
                Field::new("nursery", &self.id),
                Field::new("pots", &pots.len()),
                Field::new("cancelled", &cancelled),
            ],
        );
    }
}

impl<T> Nursery<T> {
    /// Unique identity of this nursery; also its key in a greenhouse.
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// True iff every pot reached a terminal outcome. Non-blocking.
    pub fn is_fully_settled(&self) -> bool {
        self.beds().pots.iter().all(Pot::is_settled)
    }

    /// True once [`close`](Nursery::close) was called.
    pub fn is_closed(&self) -> bool {
        self.beds().closed
    }

    /// Number of pots planted so far.
    pub fn len(&self) -> usize {
        self.beds().pots.len()
    }

    /// True if nothing was planted yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time copy of the pot handles, in insertion order.
    pub fn pots(&self) -> Vec<Pot<T>> {
        self.beds().pots.clone()
    }

    fn beds(&self) -> MutexGuard<'_, Beds<T>> {
        self.beds.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for Nursery<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Nursery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (pots, closed, sealed) = {
            let beds = self.beds();
            (beds.pots.len(), beds.closed, beds.sealed)
        };
        f.debug_struct("Nursery")
            .field("id", &self.id)
            .field("pots", &pots)
            .field("closed", &closed)
            .field("sealed", &sealed)
            .field("ctx", &self.ctx)
            .finish()
    }
}
