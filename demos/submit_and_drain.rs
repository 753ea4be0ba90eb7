//! # Example: submit_and_drain
//!
//! Minimal greenhouse round trip: submit a batch, close another, drain.
//!
//! Demonstrates how to:
//! - Build a [`Greenhouse`] with the stdout [`LogWriter`].
//! - Submit operations that succeed, fail and time out in one nursery.
//! - Close a stuck nursery by id, then wait for everything with `drain()`.
//!
//! ## Flow
//! ```text
//! Greenhouse::builder(cfg).build()
//!     ├─► submit([fast, failing, stuck])     batch
//!     │     └─► each pot: op vs timer vs cancel
//!     ├─► submit([forever])                  abandoned
//!     ├─► close_nursery(abandoned.id())      pending pots ─► Cancelled
//!     └─► drain()
//!          ├─► settle every registered nursery
//!          └─► registry empty
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example submit_and_drain --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use greenhouse::{BoxError, Config, Greenhouse, LogWriter, Outcome};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Short default deadline so the stuck operation times out quickly
    let cfg = Config::default().with_deadline(Duration::from_millis(200));

    // 2. Greenhouse with a stdout logger
    let greenhouse = Greenhouse::builder(cfg)
        .with_logger(Arc::new(LogWriter::new()))
        .build();

    // 3. One batch with three different fates
    let fast = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, BoxError>("fast")
    }
    .boxed();
    let failing = async { Err::<&str, BoxError>("disk full".into()) }.boxed();
    let stuck = std::future::pending::<Result<&str, BoxError>>().boxed();
    let batch = greenhouse.submit([fast, failing, stuck], None)?;

    // 4. A nursery nobody will wait for; close it by id
    let forever = std::future::pending::<Result<&str, BoxError>>().boxed();
    let abandoned = greenhouse.submit([forever], Some(Duration::from_secs(60)))?;
    greenhouse.close_nursery(abandoned.id());

    // 5. Wait for every registered nursery
    greenhouse.drain().await;

    for (i, outcome) in batch.outcomes().iter().enumerate() {
        println!("[batch] pot {i}: {}", outcome.as_label());
    }
    assert_eq!(abandoned.outcomes(), vec![Outcome::Cancelled]);
    assert!(greenhouse.is_empty());
    Ok(())
}
