//! # greenhouse
//!
//! **Greenhouse** tracks async operations against deadlines.
//!
//! Every operation is raced against a timer and against explicit cancellation;
//! the first of the three to finish decides the outcome, and that outcome never
//! changes again. Operations are grouped into ordered batches, and batches are
//! kept in a registry that forgets them once they are done.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  operation   │   │  operation   │   │  operation   │
//!     │ (user future)│   │ (user future)│   │ (user future)│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │     Pot      │   │     Pot      │   │     Pot      │
//!     │ op vs timer  │   │ op vs timer  │   │ op vs timer  │
//!     │  vs cancel   │   │  vs cancel   │   │  vs cancel   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            └──────────────────┼──────────────────┘
//!                               ▼
//!                 ┌──────────────────────────┐
//!                 │  Nursery (ordered batch) │
//!                 │  settle() / close()      │
//!                 └────────────┬─────────────┘
//!                              ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Greenhouse (registry)                                            │
//! │  - Id → Arc<Nursery>                                              │
//! │  - background eviction once a nursery settles                     │
//! │  - drain() awaits every registered nursery                        │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle of a pot
//! ```text
//! Pending ──┬─► Success(value)   operation resolved first
//!           ├─► Failure(reason)  operation failed or panicked
//!           ├─► TimedOut         deadline elapsed first
//!           └─► Cancelled        cancel() called first
//!
//! terminal states are absorbing; late results are discarded
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                       |
//! |-------------------|--------------------------------------------------------------|------------------------------------------|
//! | **Pots**          | One operation raced against deadline and cancel.             | [`Pot`], [`Outcome`], [`Reason`]         |
//! | **Nurseries**     | Ordered batches with positional settle and bulk close.       | [`Nursery`]                              |
//! | **Registry**      | Keyed nurseries with auto-eviction and drain.                | [`Greenhouse`]                           |
//! | **Logging**       | Optional injected logger, `tracing` bridge.                  | [`Logger`], [`TracingLogger`]            |
//! | **Identifiers**   | Injected id generation, random or sequential.                | [`IdGenerator`], [`RandomIds`]           |
//! | **Errors**        | Typed misuse errors and crate-produced failure reasons.      | [`GardenError`], [`OperationError`]      |
//! | **Configuration** | Default deadline.                                            | [`Config`]                               |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use futures::FutureExt;
//! use greenhouse::{BoxError, Config, Greenhouse, Outcome, TracingLogger};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default().with_deadline(Duration::from_millis(50));
//!     let greenhouse = Greenhouse::builder(cfg)
//!         .with_logger(Arc::new(TracingLogger))
//!         .build();
//!
//!     let quick = async { Ok::<_, BoxError>(1) }.boxed();
//!     let stuck = std::future::pending::<Result<i32, BoxError>>().boxed();
//!     let nursery = greenhouse.submit([quick, stuck], None)?;
//!
//!     // Waits for every registered nursery, then empties the registry.
//!     greenhouse.drain().await;
//!
//!     assert_eq!(nursery.outcomes(), vec![Outcome::Success(1), Outcome::TimedOut]);
//!     assert!(greenhouse.is_empty());
//!     Ok(())
//! }
//! ```
mod config;
mod context;
mod error;
mod greenhouse;
mod id;
mod logging;
mod nursery;
mod pot;

// ---- Public re-exports ----

pub use config::{Config, DEFAULT_DEADLINE};
pub use error::{BoxError, GardenError, OperationError};
pub use greenhouse::{Greenhouse, GreenhouseBuilder};
pub use id::{Id, IdGenerator, RandomIds, SequentialIds};
pub use logging::{Field, Level, Logger, TracingLogger};
pub use nursery::{Nursery, NurseryBuilder};
pub use pot::{Outcome, Pot, PotBuilder, Reason};

// Optional: expose a simple built-in stdout logger (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use logging::LogWriter;
