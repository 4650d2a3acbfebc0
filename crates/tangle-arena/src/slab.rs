//! Slab of backing stores.
//!
//! [`StoreSlab`] owns every backing store an arena has allocated. Views
//! never hold a store directly; they hold an `Arc<StoreLease>` naming a
//! slot. Reclamation is deferred: [`StoreSlab::reclaim`] sweeps the slots
//! and frees each store whose lease is held by the slab alone.
//!
//! Freed slots go onto a free list and are handed out again with a bumped
//! generation, so a [`StoreId`] is never reused for a different store.

use std::sync::Arc;

use tangle_core::{ArenaId, SliceError, StoreId};

use crate::lease::StoreLease;
use crate::store::BackingStore;

/// A single slab slot.
#[derive(Debug)]
struct StoreSlot<T> {
    /// The occupying store and the slab's own lease on it.
    occupant: Option<(BackingStore<T>, Arc<StoreLease>)>,
    /// Generation of the current (or most recent) occupant.
    generation: u32,
}

/// Slot allocator for backing stores.
#[derive(Debug)]
pub struct StoreSlab<T> {
    /// Arena identity stamped into every lease.
    arena: ArenaId,
    /// All slots (occupied and free).
    slots: Vec<StoreSlot<T>>,
    /// Indices of free slots available for reuse.
    free_list: Vec<usize>,
}

impl<T> StoreSlab<T> {
    /// Create an empty slab for the given arena.
    pub fn new(arena: ArenaId) -> Self {
        Self {
            arena,
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Place a store in a slot and return a lease on it.
    ///
    /// Reuses a free slot when one exists. Returns
    /// `Err(SliceError::AllocationFailure)` if the slot index space is
    /// exhausted.
    pub fn insert(&mut self, store: BackingStore<T>) -> Result<Arc<StoreLease>, SliceError> {
        let requested = store.capacity();
        let (index, generation) = match self.free_list.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.generation = slot.generation.wrapping_add(1);
                (index, slot.generation)
            }
            None => {
                if self.slots.len() >= u32::MAX as usize {
                    return Err(SliceError::AllocationFailure { requested });
                }
                self.slots.push(StoreSlot {
                    occupant: None,
                    generation: 0,
                });
                (self.slots.len() - 1, 0)
            }
        };

        let lease = Arc::new(StoreLease::new(
            self.arena,
            StoreId::new(index as u32, generation),
        ));
        self.slots[index].occupant = Some((store, Arc::clone(&lease)));
        Ok(lease)
    }

    /// Resolve a lease to its store.
    ///
    /// Returns `None` if the lease was issued by another arena or names a
    /// slot generation that is no longer occupied.
    pub fn resolve(&self, lease: &StoreLease) -> Option<&BackingStore<T>> {
        let index = self.occupied(lease)?;
        self.slots[index].occupant.as_ref().map(|(store, _)| store)
    }

    /// Resolve a lease to its store for mutation.
    pub fn resolve_mut(&mut self, lease: &StoreLease) -> Option<&mut BackingStore<T>> {
        let index = self.occupied(lease)?;
        self.slots[index].occupant.as_mut().map(|(store, _)| store)
    }

    /// Look up a store by ID (diagnostics and queries).
    pub fn get(&self, store: StoreId) -> Option<&BackingStore<T>> {
        let slot = self.slots.get(store.slot as usize)?;
        if slot.generation != store.generation {
            return None;
        }
        slot.occupant.as_ref().map(|(store, _)| store)
    }

    /// Free every store no view can reach any more.
    ///
    /// Returns the IDs of the freed stores.
    pub fn reclaim(&mut self) -> Vec<StoreId> {
        let mut freed = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let unreferenced = matches!(
                &slot.occupant,
                Some((_, lease)) if Arc::strong_count(lease) == 1
            );
            if unreferenced {
                slot.occupant = None;
                self.free_list.push(index);
                freed.push(StoreId::new(index as u32, slot.generation));
            }
        }
        freed
    }

    /// Number of occupied slots.
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Total slots (occupied + free).
    pub fn total_slots(&self) -> usize {
        self.slots.len()
    }

    /// Number of free slots available for reuse.
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Sum of the capacities of all live stores, in elements.
    pub fn memory_elements(&self) -> usize {
        self.slots
            .iter()
            .filter_map(|slot| slot.occupant.as_ref())
            .map(|(store, _)| store.capacity())
            .sum()
    }

    fn occupied(&self, lease: &StoreLease) -> Option<usize> {
        if lease.arena() != self.arena {
            return None;
        }
        let id = lease.store();
        let slot = self.slots.get(id.slot as usize)?;
        (slot.generation == id.generation && slot.occupant.is_some()).then_some(id.slot as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_slab() -> StoreSlab<i32> {
        StoreSlab::new(ArenaId::next())
    }

    #[test]
    fn insert_creates_live_slot() {
        let mut slab = make_slab();
        let lease = slab.insert(BackingStore::from_vec(vec![1, 2, 3])).unwrap();
        assert_eq!(lease.store(), StoreId::new(0, 0));
        assert_eq!(slab.live_count(), 1);
        assert_eq!(slab.resolve(&lease).unwrap().capacity(), 3);
    }

    #[test]
    fn reclaim_skips_referenced_stores() {
        let mut slab = make_slab();
        let held = slab.insert(BackingStore::from_vec(vec![1])).unwrap();
        let dropped = slab.insert(BackingStore::from_vec(vec![2])).unwrap();
        let dropped_id = dropped.store();
        drop(dropped);

        let freed = slab.reclaim();
        assert_eq!(freed, vec![dropped_id]);
        assert!(slab.resolve(&held).is_some());
        assert_eq!(slab.live_count(), 1);
        assert_eq!(slab.free_count(), 1);
    }

    #[test]
    fn clones_of_a_lease_keep_the_store_alive() {
        let mut slab = make_slab();
        let lease = slab.insert(BackingStore::from_vec(vec![1])).unwrap();
        let clone = Arc::clone(&lease);
        drop(lease);
        assert!(slab.reclaim().is_empty());
        drop(clone);
        assert_eq!(slab.reclaim().len(), 1);
    }

    #[test]
    fn freed_slot_is_reused_with_new_generation() {
        let mut slab = make_slab();
        let first = slab.insert(BackingStore::from_vec(vec![1])).unwrap();
        let first_id = first.store();
        drop(first);
        slab.reclaim();

        let second = slab.insert(BackingStore::from_vec(vec![2, 2])).unwrap();
        assert_eq!(second.store().slot, first_id.slot);
        assert_eq!(second.store().generation, first_id.generation + 1);
        assert_eq!(slab.total_slots(), 1);
        assert!(slab.get(first_id).is_none());
        assert_eq!(slab.get(second.store()).unwrap().capacity(), 2);
    }

    #[test]
    fn foreign_lease_does_not_resolve() {
        let mut slab = make_slab();
        let mut other = make_slab();
        slab.insert(BackingStore::from_vec(vec![1])).unwrap();
        let foreign = other.insert(BackingStore::from_vec(vec![9])).unwrap();
        assert!(slab.resolve(&foreign).is_none());
        assert!(slab.resolve_mut(&foreign).is_none());
    }

    #[test]
    fn memory_elements_counts_live_stores_only() {
        let mut slab = make_slab();
        let _a = slab.insert(BackingStore::from_vec(vec![0; 10])).unwrap();
        let b = slab.insert(BackingStore::from_vec(vec![0; 5])).unwrap();
        assert_eq!(slab.memory_elements(), 15);
        drop(b);
        slab.reclaim();
        assert_eq!(slab.memory_elements(), 10);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn reclaim_frees_exactly_the_dropped_leases(
                keep in proptest::collection::vec(any::<bool>(), 1..32),
            ) {
                let mut slab = make_slab();
                let mut held = Vec::new();
                for (i, &k) in keep.iter().enumerate() {
                    let lease = slab.insert(BackingStore::from_vec(vec![i as i32])).unwrap();
                    if k {
                        held.push(lease);
                    }
                }
                let freed = slab.reclaim();
                prop_assert_eq!(freed.len(), keep.iter().filter(|&&k| !k).count());
                prop_assert_eq!(slab.live_count(), held.len());
                for lease in &held {
                    prop_assert!(slab.resolve(lease).is_some());
                }
            }

            #[test]
            fn total_slots_bounded_by_peak_occupancy(
                rounds in proptest::collection::vec(1usize..8, 1..10),
            ) {
                let mut slab = make_slab();
                let peak = rounds.iter().copied().max().unwrap_or(0);
                for &n in &rounds {
                    let leases: Vec<_> = (0..n)
                        .map(|_| slab.insert(BackingStore::from_vec(vec![0])).unwrap())
                        .collect();
                    drop(leases);
                    slab.reclaim();
                }
                prop_assert!(slab.total_slots() <= peak);
            }
        }
    }
}
