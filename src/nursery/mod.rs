//! # Nurseries: ordered batches of pots.
//!
//! - [`Nursery`] - append-only group of pots with batch settle and close
//! - [`NurseryBuilder`] - creates nurseries with injected config, logger and ids

mod builder;
#[allow(clippy::module_inception)]
mod nursery;

pub use builder::NurseryBuilder;
pub use nursery::Nursery;
