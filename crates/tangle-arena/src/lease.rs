//! Store leases.
//!
//! A [`StoreLease`] names one slab slot at one generation. The slab keeps
//! one `Arc<StoreLease>` per occupied slot and every view descriptor holds
//! another, so the lease's strong count is the number of holders. When only
//! the slab's copy remains, no view can reach the store and the slot may be
//! reclaimed.

use std::fmt;

use tangle_core::{ArenaId, StoreId};

/// Reference-counted token tying views to a backing store slot.
#[derive(Debug, PartialEq, Eq)]
pub struct StoreLease {
    /// Arena whose slab owns the slot.
    arena: ArenaId,
    /// Slot index and generation.
    store: StoreId,
}

impl StoreLease {
    pub(crate) fn new(arena: ArenaId, store: StoreId) -> Self {
        Self { arena, store }
    }

    /// The arena that issued this lease.
    pub fn arena(&self) -> ArenaId {
        self.arena
    }

    /// The store this lease refers to.
    pub fn store(&self) -> StoreId {
        self.store
    }
}

impl fmt::Display for StoreLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreLease(arena={}, store={})", self.arena, self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lease_round_trip() {
        let arena = ArenaId::next();
        let lease = StoreLease::new(arena, StoreId::new(4, 2));
        assert_eq!(lease.arena(), arena);
        assert_eq!(lease.store(), StoreId::new(4, 2));
    }

    #[test]
    fn display_names_arena_and_store() {
        let arena = ArenaId::next();
        let lease = StoreLease::new(arena, StoreId::new(1, 0));
        let text = lease.to_string();
        assert!(text.contains("store=1#0"));
        assert!(text.contains(&format!("arena={arena}")));
    }
}
