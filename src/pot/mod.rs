//! # Pots: single operations raced against a deadline.
//!
//! This module provides the per-operation completion state machine:
//! - [`Pot`] - handle to one tracked operation
//! - [`PotBuilder`] - plants pots with injected config, logger and ids
//! - [`Outcome`] - pending or terminal state of a pot
//! - [`Reason`] - shared failure reason carried by [`Outcome::Failure`]

mod builder;
#[allow(clippy::module_inception)]
mod pot;
mod outcome;
mod reason;

pub use builder::PotBuilder;
pub use outcome::Outcome;
pub use pot::Pot;
pub use reason::Reason;
