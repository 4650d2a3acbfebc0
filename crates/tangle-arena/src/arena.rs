//! The slice arena: every view operation lives here.
//!
//! [`SliceArena`] owns the store slab, the growth policy, and (optionally)
//! the hazard tracker. Views are plain descriptors; they name a store but
//! cannot touch it without the arena.
//!
//! Borrowing mirrors the concurrency contract of the model. Reads (`get`,
//! `slice`, `read`, queries) take `&self` and may run concurrently from any
//! number of threads. Writes (`set`, `append`, `reclaim`) take `&mut self`,
//! so callers serialise them by construction. There is no internal locking
//! around store data.
//!
//! # Append
//!
//! ```text
//! needed <= capacity   write in place at offset+len.., clobbering whatever
//!                      is there; same store, same capacity
//! needed >  capacity   allocate next_capacity(capacity, needed), copy the
//!                      `len` live elements (never the tail), write the new
//!                      elements; offset 0, new store, old store untouched
//! ```

use std::ops::Range;
use std::sync::Arc;

use smallvec::SmallVec;
use tangle_core::{ArenaId, ConfigError, GrowthPolicy, SliceError, StoreId};

use crate::config::ArenaConfig;
use crate::growth::{self, StandardGrowth};
use crate::hazard::{HazardEvent, HazardTracker, WriteKind};
use crate::slab::StoreSlab;
use crate::store::BackingStore;
use crate::view::{BorrowedView, Grow, OwnedView, View, ViewDescriptor};

/// Arena of backing stores and the operations over their views.
pub struct SliceArena<T> {
    /// Identity stamped into every lease this arena issues.
    id: ArenaId,
    /// All backing stores.
    slab: StoreSlab<T>,
    /// Capacity chooser for promoting appends.
    policy: Box<dyn GrowthPolicy>,
    /// Arena configuration.
    config: ArenaConfig,
    /// Present when `config.track_hazards` is set.
    hazards: Option<HazardTracker>,
}

impl<T> SliceArena<T> {
    /// Create an arena with the default config and [`StandardGrowth`].
    pub fn new() -> Self {
        Self::build(ArenaConfig::new(), Box::new(StandardGrowth::default()))
    }

    /// Create an arena with the given config and [`StandardGrowth`].
    pub fn with_config(config: ArenaConfig) -> Result<Self, ConfigError> {
        Self::with_policy(config, StandardGrowth::default())
    }

    /// Create an arena with the given config and growth policy.
    pub fn with_policy<P>(config: ArenaConfig, policy: P) -> Result<Self, ConfigError>
    where
        P: GrowthPolicy + 'static,
    {
        config.validate()?;
        Ok(Self::build(config, Box::new(policy)))
    }

    fn build(config: ArenaConfig, policy: Box<dyn GrowthPolicy>) -> Self {
        let id = ArenaId::next();
        let hazards = config
            .track_hazards
            .then(|| HazardTracker::new(config.max_hazard_events));
        Self {
            id,
            slab: StoreSlab::new(id),
            policy,
            config,
            hazards,
        }
    }

    /// This arena's identity.
    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// The configuration this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Allocate a store holding exactly `elements` and return the sole view
    /// over it (`offset = 0`, `len = capacity = n`).
    ///
    /// Returns `Err(SliceError::AllocationFailure)` if the element count
    /// exceeds `max_store_capacity` or the store cannot be allocated. The
    /// iterator is not drained past the ceiling.
    pub fn from_elements<I>(&mut self, elements: I) -> Result<OwnedView<T>, SliceError>
    where
        I: IntoIterator<Item = T>,
    {
        let store = BackingStore::try_from_iter(elements, self.config.max_store_capacity)?;
        let len = store.capacity();
        let lease = self.slab.insert(store)?;
        tracing::trace!(store = %lease.store(), len, "allocated store from elements");
        let view = self.track(Arc::new(ViewDescriptor::new(lease, 0, len, len)));
        Ok(OwnedView::from_descriptor(view))
    }

    /// Re-slice `view` to `[lo, hi)`.
    ///
    /// `hi` is bounded by the view's **capacity**, not its length, so a
    /// re-slice can reveal slots the parent could not index. The result
    /// shares the parent's store: `offset = parent.offset + lo`,
    /// `len = hi - lo`, `capacity = parent.capacity - lo`.
    ///
    /// Returns `Err(SliceError::OutOfRange)` unless `lo <= hi <= capacity`.
    pub fn slice<V>(&self, view: &V, lo: usize, hi: usize) -> Result<BorrowedView<T>, SliceError>
    where
        V: View<T>,
    {
        let desc = view.descriptor();
        self.check_owner(desc)?;
        if lo > hi || hi > desc.capacity() {
            return Err(SliceError::OutOfRange {
                lo,
                hi,
                capacity: desc.capacity(),
            });
        }
        Ok(self.reslice(desc, lo, hi, desc.capacity() - lo))
    }

    /// Three-index re-slice `[lo, hi, max)`: as [`slice`](Self::slice), but
    /// the result's capacity is capped at `max - lo`.
    ///
    /// A view whose capacity equals its length promotes on its first append
    /// instead of writing into memory another view can see.
    ///
    /// Returns `Err(SliceError::OutOfRange)` unless
    /// `lo <= hi <= max <= capacity`.
    pub fn slice_full<V>(
        &self,
        view: &V,
        lo: usize,
        hi: usize,
        max: usize,
    ) -> Result<BorrowedView<T>, SliceError>
    where
        V: View<T>,
    {
        let desc = view.descriptor();
        self.check_owner(desc)?;
        if max > desc.capacity() {
            return Err(SliceError::OutOfRange {
                lo,
                hi: max,
                capacity: desc.capacity(),
            });
        }
        if lo > hi || hi > max {
            return Err(SliceError::OutOfRange {
                lo,
                hi,
                capacity: max,
            });
        }
        Ok(self.reslice(desc, lo, hi, max - lo))
    }

    /// Read the element at logical index `index`.
    ///
    /// Returns `Err(SliceError::IndexOutOfBounds)` unless `index < len`.
    pub fn get<V>(&self, view: &V, index: usize) -> Result<T, SliceError>
    where
        V: View<T>,
        T: Clone,
    {
        let desc = view.descriptor();
        self.check_owner(desc)?;
        check_index(desc, index)?;
        Ok(self.store(desc)?.slice(desc.offset() + index, 1)[0].clone())
    }

    /// Overwrite the element at logical index `index`.
    ///
    /// The write lands in the shared store at `offset + index`; every view
    /// covering that slot observes it immediately.
    ///
    /// Returns `Err(SliceError::IndexOutOfBounds)` unless `index < len`.
    pub fn set<V>(&mut self, view: &V, index: usize, value: T) -> Result<(), SliceError>
    where
        V: View<T>,
    {
        let desc = view.descriptor();
        self.check_owner(desc)?;
        check_index(desc, index)?;
        let absolute = desc.offset() + index;
        if let Some(tracker) = &self.hazards {
            tracker.check_write(desc, absolute..absolute + 1, WriteKind::Set);
        }
        self.store_mut(desc)?.write(absolute, value);
        Ok(())
    }

    /// The view's logical elements as a slice.
    pub fn read<V>(&self, view: &V) -> Result<&[T], SliceError>
    where
        V: View<T>,
    {
        let desc = view.descriptor();
        Ok(self.store(desc)?.slice(desc.offset(), desc.len()))
    }

    /// Iterate over the view's logical elements.
    pub fn iter<V>(&self, view: &V) -> Result<std::slice::Iter<'_, T>, SliceError>
    where
        V: View<T>,
    {
        self.read(view).map(<[T]>::iter)
    }

    /// Copy the view's logical elements out.
    pub fn to_vec<V>(&self, view: &V) -> Result<Vec<T>, SliceError>
    where
        V: View<T>,
        T: Clone,
    {
        self.read(view).map(<[T]>::to_vec)
    }

    /// Reclaim every store that no view references any more.
    ///
    /// Returns the number of stores freed. Stores reachable from a live view
    /// are never freed.
    pub fn reclaim(&mut self) -> usize {
        let freed = self.slab.reclaim();
        if !freed.is_empty() {
            tracing::debug!(count = freed.len(), "reclaimed unreferenced stores");
            if let Some(tracker) = &self.hazards {
                tracker.forget_stores(&freed);
            }
        }
        freed.len()
    }

    /// Retained hazard events involving `view` or its store, oldest first.
    ///
    /// Each call takes a fresh snapshot of the log. Always empty when hazard
    /// tracking is off.
    pub fn hazard_events<V>(&self, view: &V) -> impl Iterator<Item = HazardEvent>
    where
        V: View<T>,
    {
        let id = view.id();
        let store = view.store();
        let events = self.hazards.as_ref().map_or_else(Vec::new, |tracker| {
            tracker.events_matching(|event| event.involves_view(id) || event.involves_store(store))
        });
        events.into_iter()
    }

    /// The hazard tracker, when tracking is on.
    pub fn hazard_tracker(&self) -> Option<&HazardTracker> {
        self.hazards.as_ref()
    }

    /// Number of live backing stores.
    pub fn live_stores(&self) -> usize {
        self.slab.live_count()
    }

    /// Total slab slots (live + free).
    pub fn total_slots(&self) -> usize {
        self.slab.total_slots()
    }

    /// Number of free slab slots.
    pub fn free_slots(&self) -> usize {
        self.slab.free_count()
    }

    /// Capacity of a live store, if it exists.
    pub fn store_capacity(&self, store: StoreId) -> Option<usize> {
        self.slab.get(store).map(BackingStore::capacity)
    }

    /// Sum of all live store capacities, in elements.
    pub fn memory_elements(&self) -> usize {
        self.slab.memory_elements()
    }

    fn reslice(&self, desc: &ViewDescriptor, lo: usize, hi: usize, capacity: usize) -> BorrowedView<T> {
        let child = ViewDescriptor::new(
            Arc::clone(desc.lease()),
            desc.offset() + lo,
            hi - lo,
            capacity,
        );
        BorrowedView::from_descriptor(self.track(Arc::new(child)))
    }

    fn track(&self, view: Arc<ViewDescriptor>) -> Arc<ViewDescriptor> {
        if let Some(tracker) = &self.hazards {
            tracker.register(&view);
        }
        view
    }

    fn check_owner(&self, desc: &ViewDescriptor) -> Result<(), SliceError> {
        if desc.arena() != self.id {
            return Err(SliceError::ForeignView {
                view_arena: desc.arena(),
                arena: self.id,
            });
        }
        Ok(())
    }

    fn store(&self, desc: &ViewDescriptor) -> Result<&BackingStore<T>, SliceError> {
        self.check_owner(desc)?;
        self.slab.resolve(desc.lease()).ok_or(SliceError::ForeignView {
            view_arena: desc.arena(),
            arena: self.id,
        })
    }

    fn store_mut(&mut self, desc: &ViewDescriptor) -> Result<&mut BackingStore<T>, SliceError> {
        self.check_owner(desc)?;
        let arena = self.id;
        self.slab
            .resolve_mut(desc.lease())
            .ok_or(SliceError::ForeignView {
                view_arena: desc.arena(),
                arena,
            })
    }
}

impl<T: Clone + Default> SliceArena<T> {
    /// Allocate a default-filled store of `len` slots and return the sole
    /// view over it.
    pub fn with_len(&mut self, len: usize) -> Result<OwnedView<T>, SliceError> {
        self.with_capacity(len, len)
    }

    /// Allocate a default-filled store of `capacity` slots and return a
    /// view of length `len` over it.
    ///
    /// Returns `Err(SliceError::OutOfRange)` if `len > capacity`, or
    /// `Err(SliceError::AllocationFailure)` if `capacity` exceeds the
    /// configured ceiling or cannot be allocated.
    pub fn with_capacity(&mut self, len: usize, capacity: usize) -> Result<OwnedView<T>, SliceError> {
        if len > capacity {
            return Err(SliceError::OutOfRange {
                lo: 0,
                hi: len,
                capacity,
            });
        }
        let store = self.allocate(capacity, std::iter::empty())?;
        let lease = self.slab.insert(store)?;
        tracing::trace!(store = %lease.store(), len, capacity, "allocated store");
        let view = self.track(Arc::new(ViewDescriptor::new(lease, 0, len, capacity)));
        Ok(OwnedView::from_descriptor(view))
    }

    /// Append `elements` to `view` and return the resulting view.
    ///
    /// If the result fits the view's capacity, the elements are written in
    /// place at `offset + len..`, overwriting whatever was stored there even
    /// when another view's length covers those slots. Otherwise a new store
    /// is allocated, the view's `len` live elements are copied into it
    /// (nothing past `len` is carried over), and the elements follow. The
    /// input view is never modified.
    ///
    /// Returns `Err(SliceError::AllocationFailure)` if a needed store cannot
    /// be obtained. Never fails on capacity grounds otherwise.
    pub fn append<V, I>(&mut self, view: &V, elements: I) -> Result<V::Grown, SliceError>
    where
        V: Grow<T>,
        I: IntoIterator<Item = T>,
    {
        let desc = view.descriptor();
        self.check_owner(desc)?;
        let elements: SmallVec<[T; 8]> = elements.into_iter().collect();
        let needed = desc
            .len()
            .checked_add(elements.len())
            .ok_or(SliceError::AllocationFailure {
                requested: usize::MAX,
            })?;

        if needed <= desc.capacity() {
            let written = desc.offset() + desc.len()..desc.offset() + needed;
            self.write_in_place(desc, written, elements)?;
            let grown = ViewDescriptor::new(
                Arc::clone(desc.lease()),
                desc.offset(),
                needed,
                desc.capacity(),
            );
            let grown = self.track(Arc::new(grown));
            return Ok(view.wrap_grown(grown, false));
        }

        let promoted = self.promote(desc, needed, elements)?;
        Ok(view.wrap_grown(promoted, true))
    }

    /// Append the logical elements of `src` to `dst`.
    ///
    /// `src` may share `dst`'s store; it is read in full before anything is
    /// written.
    pub fn extend_from_view<V, S>(&mut self, dst: &V, src: &S) -> Result<V::Grown, SliceError>
    where
        V: Grow<T>,
        S: View<T>,
    {
        let elements = self.to_vec(src)?;
        self.append(dst, elements)
    }

    fn write_in_place(
        &mut self,
        desc: &ViewDescriptor,
        written: Range<usize>,
        elements: SmallVec<[T; 8]>,
    ) -> Result<(), SliceError> {
        if written.is_empty() {
            return Ok(());
        }
        if let Some(tracker) = &self.hazards {
            tracker.check_write(desc, written.clone(), WriteKind::Append);
        }
        let slots = self.store_mut(desc)?.slice_mut(written.start, written.len());
        for (slot, value) in slots.iter_mut().zip(elements) {
            *slot = value;
        }
        Ok(())
    }

    fn promote(
        &mut self,
        desc: &ViewDescriptor,
        needed: usize,
        elements: SmallVec<[T; 8]>,
    ) -> Result<Arc<ViewDescriptor>, SliceError> {
        let new_capacity = growth::next_capacity(self.policy.as_ref(), desc.capacity(), needed);
        let live = self.store(desc)?.slice(desc.offset(), desc.len());
        let store = self.allocate(new_capacity, live.iter().cloned().chain(elements))?;
        let lease = self.slab.insert(store)?;

        tracing::debug!(
            view = %desc.id(),
            from = %desc.store(),
            to = %lease.store(),
            old_capacity = desc.capacity(),
            new_capacity,
            "append promoted view to a new store"
        );

        let promoted = self.track(Arc::new(ViewDescriptor::new(lease, 0, needed, new_capacity)));
        if let Some(tracker) = &self.hazards {
            tracker.record_promotion(desc, &promoted);
        }
        Ok(promoted)
    }

    fn allocate<I>(&self, capacity: usize, prefix: I) -> Result<BackingStore<T>, SliceError>
    where
        I: IntoIterator<Item = T>,
    {
        if capacity > self.config.max_store_capacity {
            return Err(SliceError::AllocationFailure {
                requested: capacity,
            });
        }
        BackingStore::try_with_prefix(capacity, prefix)
    }
}

impl<T> Default for SliceArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_index(desc: &ViewDescriptor, index: usize) -> Result<(), SliceError> {
    if index >= desc.len() {
        return Err(SliceError::IndexOutOfBounds {
            index,
            length: desc.len(),
        });
    }
    Ok(())
}
