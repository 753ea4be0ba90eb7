//! # Identifiers for pots and nurseries.
//!
//! [`Id`] is an opaque, comparable, printable identifier. Ids are produced by an
//! injected [`IdGenerator`]:
//! - [`RandomIds`] (default): random 128-bit ids rendered as 32 hex chars
//! - [`SequentialIds`]: `{prefix}-{n}` from an atomic counter, deterministic for tests

use std::borrow::{Borrow, Cow};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

/// Opaque identifier of a pot or nursery.
///
/// Cheap to clone (`Arc<str>` inside).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(Arc<str>);

impl Id {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.0)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl Borrow<str> for Id {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Source of identifiers unique among concurrently live pots and nurseries.
///
/// Inject a custom generator through the builders to get predictable ids.
pub trait IdGenerator: Send + Sync + 'static {
    /// Produces the next identifier.
    fn next_id(&self) -> Id;
}

/// Random 128-bit identifiers (collision probability negligible).
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> Id {
        let raw: u128 = rand::rng().random();
        Id::from(format!("{raw:032x}"))
    }
}

/// Monotonic identifiers `{prefix}-{n}` starting at 1.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: Cow<'static, str>,
    next: AtomicU64,
}

impl SequentialIds {
    /// Creates a counter-backed generator with the given prefix.
    pub fn new(prefix: impl Into<Cow<'static, str>>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> Id {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        Id::from(format!("{}-{n}", self.prefix))
    }
}
