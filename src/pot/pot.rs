//! # Pot: one operation raced against its deadline.
//!
//! A [`Pot`] wraps a single async operation. Planting fixes the expiry instant,
//! spawns the operation on its own task and starts a driver that races it
//! against that instant and against explicit cancellation.
//!
//! ## Race
//! ```text
//! plant(op, deadline)
//!   ├─► expires = now + deadline      fixed before anything is spawned
//!   ├─► spawn(op)                     ─► JoinHandle
//!   └─► spawn(drive):
//!         select! { biased;
//!           timer.cancelled()         ─► exit (someone else settled the pot)
//!           sleep_until(expires)      ─► TimedOut
//!           JoinHandle resolves       ─► Success(v) / Failure(reason)
//!         }
//!         └─► transition(next)        ─► applied only if still Pending
//!
//! cancel() ──► transition(Cancelled) ─► timer.cancel() ─► driver exits
//! ```
//!
//! ## Rules
//! - **Single transition**: the outcome leaves `Pending` at most once. The
//!   transition is a compare-and-set under the watch channel's write lock.
//! - **Timer cleared under the same lock**: whoever wins the transition takes
//!   and cancels the timer token before the lock is released.
//! - **Expiry wins ties**: once the expiry instant has passed, a result that
//!   is only observed afterwards settles the pot as `TimedOut`.
//! - **Fan-out**: every `settle()` caller waits on the same watch channel and
//!   receives a clone of the one stored terminal outcome.
//! - **Observation only**: on timeout or cancel the driver drops the
//!   `JoinHandle` (detach). The operation keeps running and its result is discarded.
//! - **Durable**: the terminal outcome is stored even if nobody is waiting.

use std::fmt;
use std::future::Future;
use std::panic::Location;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::context::Context;
use crate::error::{BoxError, GardenError, OperationError};
use crate::id::Id;
use crate::logging::{Field, Level};
use crate::pot::builder::PotBuilder;
use crate::pot::outcome::Outcome;
use crate::pot::reason::Reason;

/// Expiry used when `now + deadline` overflows (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// State shared by every handle of one pot and its driver.
struct Shared<T> {
    state: watch::Sender<Outcome<T>>,
    /// Deadline timer handle; `None` once the pot settled.
    timer: Mutex<Option<CancellationToken>>,
}

impl<T> Shared<T> {
    /// Moves `Pending` → `next`. Returns `false` if the pot already settled.
    fn transition(&self, next: Outcome<T>) -> bool {
        self.state.send_if_modified(move |current| {
            if current.is_terminal() {
                return false;
            }
            if let Some(timer) = self
                .timer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
            {
                timer.cancel();
            }
            *current = next;
            true
        })
    }
}

/// Handle to one tracked operation.
///
/// Cheap to clone; all clones observe the same state.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use greenhouse::{BoxError, Outcome, Pot};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pot = Pot::plant(async { Ok::<_, BoxError>("ripe") }, Some(Duration::from_secs(1)))?;
///     assert_eq!(pot.settle().await, Outcome::Success("ripe"));
///
///     let stuck = Pot::plant(std::future::pending::<Result<u8, BoxError>>(), None)?;
///     stuck.cancel();
///     assert_eq!(stuck.outcome(), Outcome::Cancelled);
///     Ok(())
/// }
/// ```
pub struct Pot<T> {
    id: Id,
    deadline: Duration,
    expires: Instant,
    planted_at: &'static Location<'static>,
    shared: Arc<Shared<T>>,
    ctx: Context,
}

/// A pot whose clock is running but whose operation is not spawned yet.
///
/// Lets a nursery register the pot before any task exists.
pub(crate) struct Seedling<T> {
    pot: Pot<T>,
    timer: CancellationToken,
}

impl<T> Pot<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Plants `operation` with default id generation and no logger.
    ///
    /// `deadline = None` uses [`Config::deadline`](crate::Config::deadline) (10s).
    /// The deadline is measured from this call. Never blocks; fails only when
    /// called outside a tokio runtime.
    #[track_caller]
    pub fn plant<F, E>(operation: F, deadline: Option<Duration>) -> Result<Self, GardenError>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let planted_at = Location::caller();
        let runtime = Handle::try_current().map_err(|_| GardenError::NoRuntime)?;
        Ok(Self::seed(Context::default(), deadline, planted_at).start(&runtime, operation))
    }

    /// Mints the id, creates the state cell and fixes the expiry instant.
    pub(crate) fn seed(
        ctx: Context,
        deadline: Option<Duration>,
        planted_at: &'static Location<'static>,
    ) -> Seedling<T> {
        let deadline = ctx.cfg.resolve_deadline(deadline);
        let now = Instant::now();
        let expires = now.checked_add(deadline).unwrap_or_else(|| now + FAR_FUTURE);
        let timer = CancellationToken::new();
        let (state, _) = watch::channel(Outcome::Pending);

        let pot = Self {
            id: ctx.next_id(),
            deadline,
            expires,
            planted_at,
            shared: Arc::new(Shared {
                state,
                timer: Mutex::new(Some(timer.clone())),
            }),
            ctx,
        };
        Seedling { pot, timer }
    }

    /// Creates a builder for injecting config, logger and id generator.
    pub fn builder() -> PotBuilder<T> {
        PotBuilder::new()
    }

    /// Non-blocking read of the current outcome.
    pub fn outcome(&self) -> Outcome<T> {
        self.shared.state.borrow().clone()
    }

    /// Waits for the terminal outcome.
    ///
    /// Resolves without suspending if the pot already settled. All concurrent
    /// callers observe the identical outcome.
    pub async fn settle(&self) -> Outcome<T> {
        let mut rx = self.shared.state.subscribe();
        let settled = rx
            .wait_for(Outcome::is_terminal)
            .await
            .map(|outcome| outcome.clone());
        // The sender lives in `shared`, which we hold, so the channel never closes.
        settled.unwrap_or_else(|_| self.outcome())
    }

    /// Forces `Cancelled` if the pot is still pending.
    ///
    /// Returns `true` if this call settled the pot, `false` if it was already terminal.
    /// The operation itself is not cancelled, only observation of it.
    pub fn cancel(&self) -> bool {
        let cancelled = self.shared.transition(Outcome::Cancelled);
        if cancelled {
            self.ctx
                .log(Level::Info, "pot cancelled", &[Field::new("pot", &self.id)]);
        }
        cancelled
    }

    /// Runs the race until the pot settles or someone else settles it.
    async fn drive(
        self,
        mut operation: JoinHandle<Result<T, BoxError>>,
        timer: CancellationToken,
    ) {
        let next = tokio::select! {
            biased;
            _ = timer.cancelled() => return,
            _ = time::sleep_until(self.expires) => Outcome::TimedOut,
            joined = &mut operation => outcome_of(joined),
        };

        let label = next.as_label();
        if self.shared.transition(next) {
            self.log_settled();
        } else {
            self.ctx.log(
                Level::Trace,
                "late result discarded",
                &[Field::new("pot", &self.id), Field::new("outcome", &label)],
            );
        }
    }

    fn log_settled(&self) {
        let (label, reason) = {
            let state = self.shared.state.borrow();
            (state.as_label(), state.reason().cloned())
        };
        let pot = Field::new("pot", &self.id);

        match (label, reason) {
            ("timed_out", _) => self.ctx.log(
                Level::Warn,
                "pot timed out",
                &[
                    pot,
                    Field::new("deadline_ms", &self.deadline.as_millis()),
                    Field::new("planted_at", &self.planted_at),
                ],
            ),
            (_, Some(reason)) if reason.downcast_ref::<OperationError>().is_some() => {
                self.ctx.log(
                    Level::Error,
                    "operation crashed",
                    &[pot, Field::new("reason", &reason)],
                )
            }
            (label, _) => self.ctx.log(
                Level::Debug,
                "pot settled",
                &[pot, Field::new("outcome", &label)],
            ),
        }
    }
}

impl<T> Seedling<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Handle to the pot before it is started.
    pub(crate) fn pot(&self) -> &Pot<T> {
        &self.pot
    }

    /// Spawns the operation and its driver on `runtime`.
    ///
    /// A pot cancelled before starting keeps its outcome and spawns nothing.
    pub(crate) fn start<F, E>(self, runtime: &Handle, operation: F) -> Pot<T>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let Seedling { pot, timer } = self;
        pot.ctx.log(
            Level::Info,
            "pot planted",
            &[
                Field::new("pot", &pot.id),
                Field::new("deadline_ms", &pot.deadline.as_millis()),
                Field::new("planted_at", &pot.planted_at),
            ],
        );
        if timer.is_cancelled() {
            return pot;
        }

        let operation =
            runtime.spawn(async move { operation.await.map_err(Into::<BoxError>::into) });
        runtime.spawn(pot.clone().drive(operation, timer));
        pot
    }
}

impl<T> Pot<T> {
    /// Unique identity of this pot.
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Deadline the operation is raced against.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Source location that planted this pot.
    pub fn planted_at(&self) -> &'static Location<'static> {
        self.planted_at
    }

    /// True once the outcome is terminal. Non-blocking.
    pub fn is_settled(&self) -> bool {
        self.shared.state.borrow().is_terminal()
    }
}

impl<T> Clone for Pot<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            deadline: self.deadline,
            expires: self.expires,
            planted_at: self.planted_at,
            shared: Arc::clone(&self.shared),
            ctx: self.ctx.clone(),
        }
    }
}

impl<T> fmt::Debug for Pot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pot")
            .field("id", &self.id)
            .field("deadline", &self.deadline)
            .field("outcome", &self.shared.state.borrow().as_label())
            .field("planted_at", &self.planted_at)
            .finish()
    }
}

/// Maps the operation task's join result to an outcome.
fn outcome_of<T>(joined: Result<Result<T, BoxError>, JoinError>) -> Outcome<T> {
    match joined {
        Ok(Ok(value)) => Outcome::Success(value),
        Ok(Err(err)) => Outcome::Failure(Reason::from_boxed(err)),
        Err(je) if je.is_panic() => Outcome::Failure(Reason::new(OperationError::Panicked {
            message: panic_message(je),
        })),
        Err(je) => Outcome::Failure(Reason::new(je)),
    }
}

fn panic_message(je: JoinError) -> String {
    let payload = je.into_panic();
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::id::SequentialIds;
    use crate::logging::testing::MemoryLogger;
    use futures::FutureExt;

    async fn after<T>(ms: u64, value: T) -> Result<T, BoxError> {
        time::sleep(Duration::from_millis(ms)).await;
        Ok(value)
    }

    fn never<T: Send + 'static>() -> impl Future<Output = Result<T, BoxError>> + Send + 'static {
        std::future::pending()
    }

    fn explode() -> Result<u8, BoxError> {
        panic!("kaboom")
    }

    #[test]
    fn test_plant_outside_runtime_fails_fast() {
        let res = Pot::plant(async { Ok::<u8, BoxError>(1) }, None);
        assert!(matches!(res, Err(GardenError::NoRuntime)));
    }

    #[tokio::test]
    async fn test_starts_pending() {
        let pot = Pot::<u8>::plant(never(), None).unwrap();
        assert_eq!(pot.outcome(), Outcome::Pending);
        assert!(!pot.is_settled());
        assert_eq!(pot.deadline(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_resolves_success() {
        let pot = Pot::plant(async { Ok::<_, BoxError>("success") }, None).unwrap();
        assert_eq!(pot.settle().await, Outcome::Success("success"));
        assert_eq!(pot.outcome(), Outcome::Success("success"));
    }

    #[tokio::test]
    async fn test_rejection_is_captured_as_failure() {
        let pot = Pot::plant(async { Err::<u8, _>("boom") }, None).unwrap();
        assert_eq!(pot.settle().await, Outcome::Failure(Reason::from("boom")));
    }

    #[tokio::test]
    async fn test_times_out_when_operation_never_resolves() {
        let pot = Pot::<u8>::plant(never(), Some(Duration::from_millis(50))).unwrap();
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(pot.outcome(), Outcome::TimedOut);
    }

    #[tokio::test]
    async fn test_settle_waits_for_timeout() {
        let pot = Pot::<u8>::plant(never(), Some(Duration::from_millis(30))).unwrap();
        assert_eq!(pot.settle().await, Outcome::TimedOut);
    }

    #[tokio::test]
    async fn test_zero_deadline_times_out_immediately() {
        let pot = Pot::<u8>::plant(never(), Some(Config::deadline_from_millis(-1))).unwrap();
        assert_eq!(pot.settle().await, Outcome::TimedOut);
    }

    #[tokio::test]
    async fn test_late_success_after_deadline_stays_timed_out() {
        let pot = Pot::plant(after(80, "late"), Some(Duration::from_millis(20))).unwrap();
        assert_eq!(pot.settle().await, Outcome::TimedOut);

        time::sleep(Duration::from_millis(120)).await;
        assert_eq!(pot.outcome(), Outcome::TimedOut);
    }

    #[tokio::test]
    async fn test_deadline_counts_from_planting_not_first_poll() {
        let (tx, rx) = tokio::sync::oneshot::channel::<u8>();
        let pot = Pot::plant(rx, Some(Duration::from_millis(20))).unwrap();

        let sender = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(40));
            let _ = tx.send(7);
        });
        // Keep the only worker busy past the deadline before the driver is polled.
        std::thread::sleep(Duration::from_millis(30));

        assert_eq!(pot.settle().await, Outcome::TimedOut);
        sender.join().unwrap();
        time::sleep(Duration::from_millis(20)).await;
        assert_eq!(pot.outcome(), Outcome::TimedOut);
    }

    #[tokio::test]
    async fn test_huge_deadline_does_not_overflow() {
        let pot = Pot::plant(async { Ok::<_, BoxError>(1u8) }, Some(Duration::MAX)).unwrap();
        assert_eq!(pot.deadline(), Duration::MAX);
        assert_eq!(pot.settle().await, Outcome::Success(1));
    }

    #[tokio::test]
    async fn test_expired_deadline_beats_ready_result() {
        let pot = Pot::plant(async { Ok::<_, BoxError>(1u8) }, Some(Duration::from_millis(10))).unwrap();
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(pot.settle().await, Outcome::TimedOut);
    }

    #[tokio::test]
    async fn test_cancel_before_start_spawns_nothing() {
        let seedling = Pot::<u8>::seed(Context::default(), None, Location::caller());
        assert!(seedling.pot().cancel());

        let pot = seedling.start(&Handle::current(), async { Ok::<_, BoxError>(1u8) });
        tokio::task::yield_now().await;
        assert_eq!(pot.outcome(), Outcome::Cancelled);
    }

    #[tokio::test]
    async fn test_non_panic_join_error_is_kept_as_reason() {
        let handle = tokio::spawn(std::future::pending::<Result<u8, BoxError>>());
        handle.abort();

        let outcome = outcome_of(handle.await);
        let reason = outcome.reason().expect("failure reason");
        assert!(
            reason
                .downcast_ref::<JoinError>()
                .is_some_and(JoinError::is_cancelled)
        );
    }

    #[tokio::test]
    async fn test_cancel_discards_late_result() {
        let pot = Pot::plant(after(30, "ignored"), None).unwrap();
        assert!(pot.cancel());
        assert_eq!(pot.outcome(), Outcome::Cancelled);

        time::sleep(Duration::from_millis(80)).await;
        assert_eq!(pot.outcome(), Outcome::Cancelled);
        assert_eq!(pot.settle().await, Outcome::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_clears_the_deadline_timer() {
        let pot = Pot::<u8>::plant(never(), Some(Duration::from_millis(30))).unwrap();
        pot.cancel();
        time::sleep(Duration::from_millis(80)).await;
        assert_eq!(pot.outcome(), Outcome::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_after_settle_is_noop() {
        let pot = Pot::plant(async { Ok::<_, BoxError>(7u8) }, None).unwrap();
        assert_eq!(pot.settle().await, Outcome::Success(7));
        assert!(!pot.cancel());
        assert_eq!(pot.outcome(), Outcome::Success(7));
    }

    #[tokio::test]
    async fn test_settle_is_immediate_once_terminal() {
        let pot = Pot::plant(async { Ok::<_, BoxError>("test") }, None).unwrap();
        pot.settle().await;
        assert_eq!(
            pot.settle().now_or_never(),
            Some(Outcome::Success("test"))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_all_waiters_observe_identical_outcome() {
        let pot = Pot::plant(after(20, "shared"), None).unwrap();

        let waiters: Vec<_> = (0..16)
            .map(|_| {
                let p = pot.clone();
                tokio::spawn(async move { p.settle().await })
            })
            .collect();

        for w in futures::future::join_all(waiters).await {
            assert_eq!(w.unwrap(), Outcome::Success("shared"));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_outcome_changes_at_most_once_under_races() {
        let pots: Vec<Pot<usize>> = (0..200)
            .map(|i| Pot::plant(after(5, i), Some(Duration::from_millis(5))).unwrap())
            .collect();

        // Cancel every third pot while the timer and the result race each other.
        for p in pots.iter().step_by(3) {
            p.cancel();
        }

        for (i, p) in pots.iter().enumerate() {
            let first = p.settle().await;
            assert!(
                matches!(
                    first,
                    Outcome::Success(v) if v == i
                ) || matches!(first, Outcome::TimedOut | Outcome::Cancelled),
                "pot {i} settled as {first:?}"
            );
            time::sleep(Duration::from_millis(1)).await;
            assert_eq!(p.outcome(), first, "pot {i} changed after settling");
            assert!(!p.cancel());
        }
    }

    #[tokio::test]
    async fn test_panicking_operation_settles_as_failure() {
        let pot = Pot::plant(async { explode() }, None).unwrap();
        let outcome = pot.settle().await;
        let reason = outcome.reason().expect("failure reason");
        assert_eq!(
            reason.downcast_ref::<OperationError>(),
            Some(&OperationError::Panicked {
                message: "kaboom".into()
            })
        );
    }

    #[tokio::test]
    async fn test_records_planting_location() {
        let pot = Pot::<u8>::plant(never(), None).unwrap();
        assert!(pot.planted_at().file().ends_with("pot.rs"));
    }

    #[tokio::test]
    async fn test_builder_injects_ids_and_logger() {
        let logger = Arc::new(MemoryLogger::default());
        let builder = Pot::builder()
            .with_id_generator(Arc::new(SequentialIds::new("pot")))
            .with_logger(logger.clone());

        let pot = builder
            .plant(never::<u8>(), Some(Duration::from_millis(20)))
            .unwrap();
        assert_eq!(pot.id().as_str(), "pot-1");
        assert_eq!(pot.settle().await, Outcome::TimedOut);

        let ok = builder.plant(after(1, 1u8), None).unwrap();
        assert_eq!(ok.id().as_str(), "pot-2");
        ok.settle().await;

        assert!(logger.has(Level::Info, "pot planted pot=pot-1"));
        assert!(logger.has(Level::Warn, "pot timed out pot=pot-1"));
        assert!(logger.has(Level::Debug, "pot settled pot=pot-2 outcome=success"));
    }
}
