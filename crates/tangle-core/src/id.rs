//! Strongly-typed identifiers for arenas, backing stores, and views.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`ArenaId`] allocation.
static ARENA_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Counter for unique [`ViewId`] allocation.
static VIEW_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a slice arena.
///
/// Every view remembers the arena that created it. Operations reject a
/// view that belongs to a different arena instead of resolving its store
/// index against the wrong slab.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaId(u64);

impl ArenaId {
    /// Allocate a fresh, unique arena ID. Thread-safe.
    pub fn next() -> Self {
        Self(ARENA_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a backing store within its arena.
///
/// `slot` is the slab index; `generation` is bumped every time the slot is
/// reclaimed and reused, so two stores that occupied the same slot at
/// different times never compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId {
    /// Slab slot index.
    pub slot: u32,
    /// Reuse generation of the slot.
    pub generation: u32,
}

impl StoreId {
    /// Create a store ID from its slot and generation.
    pub fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.slot, self.generation)
    }
}

/// Identifies a single view descriptor.
///
/// Every construction (`from_elements`, `slice`, `append`) yields a new ID.
/// Cloning a view preserves its ID, because a clone is the same descriptor
/// over the same range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

impl ViewId {
    /// Allocate a fresh, unique view ID. Thread-safe.
    pub fn next() -> Self {
        Self(VIEW_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
