//! Aliasing hazard detection.
//!
//! [`HazardTracker`] is a diagnostic layer over the arena. It remembers, per
//! backing store, the range of every live view (held weakly, so dropping a
//! view removes it from consideration) and flags two hazards:
//!
//! - **Cross-view clobber:** a write lands inside another live view's
//!   `[offset, offset + len)` but outside the writer's own logical range.
//!   In practice this is an in-place append running over a sibling's data.
//! - **Promotion:** an append outgrew its capacity and moved to a new store,
//!   silently dropping every alias it had.
//!
//! The tracker flags, never prevents. Operations behave identically with
//! tracking on or off.
//!
//! The registry sits behind a `Mutex` because `slice` registers views
//! through `&SliceArena`. The lock guards diagnostic bookkeeping only and
//! is never held while a store is read or written.

use std::collections::VecDeque;
use std::fmt;
use std::ops::Range;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use indexmap::IndexMap;
use smallvec::SmallVec;
use tangle_core::{StoreId, ViewId};

use crate::view::ViewDescriptor;

/// Which operation performed a write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteKind {
    /// An indexed `set`.
    Set,
    /// The in-place branch of `append`.
    Append,
}

impl fmt::Display for WriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set => write!(f, "set"),
            Self::Append => write!(f, "append"),
        }
    }
}

/// A detected aliasing hazard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HazardEvent {
    /// A write overwrote another view's logical elements.
    CrossViewClobber {
        /// Store the write landed in.
        store: StoreId,
        /// View that performed the write.
        writer: ViewId,
        /// View whose elements were overwritten.
        victim: ViewId,
        /// Absolute store indices that were overwritten.
        clobbered: Range<usize>,
        /// Operation that performed the write.
        kind: WriteKind,
    },
    /// An append moved a view to a freshly allocated store.
    Promotion {
        /// View that was appended to.
        view: ViewId,
        /// View returned by the append.
        promoted: ViewId,
        /// Store the view used to share.
        from: StoreId,
        /// Store the returned view owns.
        to: StoreId,
        /// Capacity before the append.
        old_capacity: usize,
        /// Capacity of the new store.
        new_capacity: usize,
        /// In-capacity slots past the old length that were not carried over.
        discarded_tail: usize,
    },
}

impl HazardEvent {
    /// Whether the event concerns the given view (as writer, victim, or
    /// either side of a promotion).
    pub fn involves_view(&self, id: ViewId) -> bool {
        match self {
            Self::CrossViewClobber { writer, victim, .. } => *writer == id || *victim == id,
            Self::Promotion { view, promoted, .. } => *view == id || *promoted == id,
        }
    }

    /// Whether the event concerns the given store.
    pub fn involves_store(&self, id: StoreId) -> bool {
        match self {
            Self::CrossViewClobber { store, .. } => *store == id,
            Self::Promotion { from, to, .. } => *from == id || *to == id,
        }
    }
}

impl fmt::Display for HazardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrossViewClobber {
                store,
                writer,
                victim,
                clobbered,
                kind,
            } => write!(
                f,
                "{kind} through {writer} clobbered {victim} at [{}..{}) in store {store}",
                clobbered.start, clobbered.end
            ),
            Self::Promotion {
                view,
                promoted,
                from,
                to,
                old_capacity,
                new_capacity,
                discarded_tail,
            } => write!(
                f,
                "append to {view} promoted to {promoted}: store {from} (cap {old_capacity}) -> \
                 store {to} (cap {new_capacity}), {discarded_tail} tail slots dropped"
            ),
        }
    }
}

/// A live view range registered against a store.
#[derive(Debug)]
struct TrackedView {
    id: ViewId,
    range: Range<usize>,
    alive: Weak<ViewDescriptor>,
}

#[derive(Debug, Default)]
struct TrackerState {
    /// Store -> live views over it, in registration order.
    views: IndexMap<StoreId, SmallVec<[TrackedView; 4]>>,
    /// Retained events, oldest first.
    events: VecDeque<HazardEvent>,
    /// Events evicted because the budget was exhausted.
    evicted: u64,
}

/// Per-arena registry of live view ranges and the hazard log.
#[derive(Debug)]
pub struct HazardTracker {
    state: Mutex<TrackerState>,
    max_events: usize,
}

impl HazardTracker {
    /// Create a tracker retaining at most `max_events` events.
    pub fn new(max_events: usize) -> Self {
        Self {
            state: Mutex::new(TrackerState::default()),
            max_events,
        }
    }

    /// Start tracking a view's logical range.
    ///
    /// Entries for views dropped since the last registration on the same
    /// store are pruned first, so the registry stays proportional to the
    /// number of live views.
    pub fn register(&self, view: &Arc<ViewDescriptor>) {
        let mut state = self.lock();
        let views = state.views.entry(view.store()).or_default();
        views.retain(|tracked| tracked.alive.strong_count() > 0);
        views.push(TrackedView {
            id: view.id(),
            range: view.range(),
            alive: Arc::downgrade(view),
        });
    }

    /// Check a write of absolute indices `written` through `writer` and
    /// record a clobber event for every other live view it lands in.
    ///
    /// Returns the number of events recorded.
    pub fn check_write(
        &self,
        writer: &ViewDescriptor,
        written: Range<usize>,
        kind: WriteKind,
    ) -> usize {
        let foreign = outside(written, writer.range());
        if foreign.is_empty() {
            return 0;
        }

        let mut state = self.lock();
        let store = writer.store();
        let mut found: SmallVec<[HazardEvent; 2]> = SmallVec::new();
        if let Some(views) = state.views.get_mut(&store) {
            views.retain(|tracked| tracked.alive.strong_count() > 0);
            for tracked in views.iter().filter(|tracked| tracked.id != writer.id()) {
                for part in &foreign {
                    let clobbered = intersect(part.clone(), tracked.range.clone());
                    if !clobbered.is_empty() {
                        found.push(HazardEvent::CrossViewClobber {
                            store,
                            writer: writer.id(),
                            victim: tracked.id,
                            clobbered,
                            kind,
                        });
                    }
                }
            }
        }

        let count = found.len();
        for event in found {
            tracing::warn!(%event, "aliasing hazard");
            self.push(&mut state, event);
        }
        count
    }

    /// Record that `view` was promoted to `promoted`.
    pub fn record_promotion(&self, view: &ViewDescriptor, promoted: &ViewDescriptor) {
        let event = HazardEvent::Promotion {
            view: view.id(),
            promoted: promoted.id(),
            from: view.store(),
            to: promoted.store(),
            old_capacity: view.capacity(),
            new_capacity: promoted.capacity(),
            discarded_tail: view.capacity() - view.len(),
        };
        tracing::debug!(%event, "view promoted");
        let mut state = self.lock();
        self.push(&mut state, event);
    }

    /// Drop bookkeeping for stores that have been reclaimed.
    pub fn forget_stores(&self, stores: &[StoreId]) {
        let mut state = self.lock();
        for store in stores {
            state.views.shift_remove(store);
        }
    }

    /// Snapshot of retained events matching `filter`, oldest first.
    pub fn events_matching<F>(&self, filter: F) -> Vec<HazardEvent>
    where
        F: Fn(&HazardEvent) -> bool,
    {
        self.lock()
            .events
            .iter()
            .filter(|event| filter(event))
            .cloned()
            .collect()
    }

    /// Number of retained events.
    pub fn event_count(&self) -> usize {
        self.lock().events.len()
    }

    /// Number of events evicted to stay within budget.
    pub fn evicted_count(&self) -> u64 {
        self.lock().evicted
    }

    /// Number of live views registered against `store`.
    pub fn live_views(&self, store: StoreId) -> usize {
        self.lock().views.get(&store).map_or(0, |views| {
            views
                .iter()
                .filter(|tracked| tracked.alive.strong_count() > 0)
                .count()
        })
    }

    /// Number of registry entries held for `store`, including dropped views
    /// not yet pruned.
    pub fn registered_entries(&self, store: StoreId) -> usize {
        self.lock().views.get(&store).map_or(0, SmallVec::len)
    }

    fn push(&self, state: &mut TrackerState, event: HazardEvent) {
        while state.events.len() >= self.max_events.max(1) {
            state.events.pop_front();
            state.evicted += 1;
        }
        state.events.push_back(event);
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Parts of `written` that fall outside `own`.
fn outside(written: Range<usize>, own: Range<usize>) -> SmallVec<[Range<usize>; 2]> {
    let mut parts = SmallVec::new();
    let before = written.start..written.end.min(own.start);
    if !before.is_empty() {
        parts.push(before);
    }
    let after = written.start.max(own.end)..written.end;
    if !after.is_empty() {
        parts.push(after);
    }
    parts
}

fn intersect(a: Range<usize>, b: Range<usize>) -> Range<usize> {
    a.start.max(b.start)..a.end.min(b.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lease::StoreLease;
    use tangle_core::ArenaId;

    fn view(lease: &Arc<StoreLease>, offset: usize, len: usize, cap: usize) -> Arc<ViewDescriptor> {
        Arc::new(ViewDescriptor::new(Arc::clone(lease), offset, len, cap))
    }

    fn lease() -> Arc<StoreLease> {
        Arc::new(StoreLease::new(ArenaId::next(), StoreId::new(0, 0)))
    }

    #[test]
    fn outside_splits_around_own_range() {
        assert!(outside(2..4, 0..5).is_empty());
        assert_eq!(outside(3..5, 0..3).as_slice(), &[3..5]);
        assert_eq!(outside(0..6, 2..4).as_slice(), &[0..2, 4..6]);
    }

    #[test]
    fn write_inside_own_range_is_not_a_clobber() {
        let tracker = HazardTracker::new(16);
        let lease = lease();
        let whole = view(&lease, 0, 5, 5);
        let part = view(&lease, 0, 3, 5);
        tracker.register(&whole);
        tracker.register(&part);
        assert_eq!(tracker.check_write(&part, 1..2, WriteKind::Set), 0);
    }

    #[test]
    fn append_past_length_clobbers_sibling() {
        let tracker = HazardTracker::new(16);
        let lease = lease();
        let whole = view(&lease, 0, 5, 5);
        let part = view(&lease, 0, 3, 5);
        tracker.register(&whole);
        tracker.register(&part);

        assert_eq!(tracker.check_write(&part, 3..5, WriteKind::Append), 1);
        let events = tracker.events_matching(|_| true);
        assert_eq!(
            events[0],
            HazardEvent::CrossViewClobber {
                store: StoreId::new(0, 0),
                writer: part.id(),
                victim: whole.id(),
                clobbered: 3..5,
                kind: WriteKind::Append,
            }
        );
    }

    #[test]
    fn dropped_views_are_not_victims() {
        let tracker = HazardTracker::new(16);
        let lease = lease();
        let part = view(&lease, 0, 3, 5);
        tracker.register(&part);
        {
            let whole = view(&lease, 0, 5, 5);
            tracker.register(&whole);
        }
        assert_eq!(tracker.check_write(&part, 3..5, WriteKind::Append), 0);
        assert_eq!(tracker.live_views(StoreId::new(0, 0)), 1);
    }

    #[test]
    fn registry_prunes_dropped_views_on_register() {
        let tracker = HazardTracker::new(4);
        let lease = lease();
        let whole = view(&lease, 0, 5, 5);
        tracker.register(&whole);
        for _ in 0..1_000 {
            let part = view(&lease, 0, 3, 5);
            tracker.register(&part);
        }
        let store = StoreId::new(0, 0);
        assert_eq!(tracker.live_views(store), 1);
        // The last slice is dropped but not yet pruned.
        assert_eq!(tracker.registered_entries(store), 2);
    }

    #[test]
    fn event_budget_evicts_oldest() {
        let tracker = HazardTracker::new(2);
        let lease = lease();
        let a = view(&lease, 0, 1, 4);
        let b = view(&lease, 0, 2, 2);
        for _ in 0..3 {
            tracker.record_promotion(&a, &b);
        }
        assert_eq!(tracker.event_count(), 2);
        assert_eq!(tracker.evicted_count(), 1);
    }

    #[test]
    fn promotion_event_counts_discarded_tail() {
        let tracker = HazardTracker::new(4);
        let old = view(&lease(), 0, 2, 5);
        let new = view(&lease(), 0, 6, 10);
        tracker.record_promotion(&old, &new);
        let events = tracker.events_matching(|e| e.involves_view(old.id()));
        assert!(matches!(
            events[0],
            HazardEvent::Promotion {
                discarded_tail: 3,
                old_capacity: 5,
                new_capacity: 10,
                ..
            }
        ));
    }

    #[test]
    fn forget_stores_clears_registry() {
        let tracker = HazardTracker::new(4);
        let lease = lease();
        let v = view(&lease, 0, 1, 1);
        tracker.register(&v);
        tracker.forget_stores(&[StoreId::new(0, 0)]);
        assert_eq!(tracker.live_views(StoreId::new(0, 0)), 0);
    }
}
