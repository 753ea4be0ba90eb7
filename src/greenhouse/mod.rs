//! # Greenhouse: keyed registry of nurseries.
//!
//! - [`Greenhouse`] - registers submitted nurseries and evicts them once settled
//! - [`GreenhouseBuilder`] - injects config, logger and id generator

mod builder;
#[allow(clippy::module_inception)]
mod greenhouse;

pub use builder::GreenhouseBuilder;
pub use greenhouse::Greenhouse;
