//! View descriptors and capability handles.
//!
//! A [`ViewDescriptor`] is the `(store, offset, length, capacity)` tuple.
//! It is immutable: every operation that changes a view's shape returns a
//! new descriptor, and the caller decides which one to keep.
//!
//! Descriptors are wrapped in one of two capability handles:
//!
//! - [`OwnedView`]: produced by allocation (`from_elements`, `with_capacity`,
//!   or a promoting append). Appending to it always yields another
//!   `OwnedView`.
//! - [`BorrowedView`]: produced by re-slicing. Appending to it yields a
//!   [`Grown`], which is `InPlace` while the append fits the borrowed
//!   capacity and `Promoted` once it had to allocate. Promotion is therefore
//!   a type change the caller has to match on, not a silent identity swap.
//!
//! Neither handle grants access on its own; reads and writes go through
//! the arena that issued it.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tangle_core::{ArenaId, StoreId, ViewId};

use crate::lease::StoreLease;

/// The `(store, offset, length, capacity)` tuple behind every view.
///
/// Invariants: `len <= capacity` and `offset + capacity` never exceeds the
/// store's capacity.
#[derive(Debug)]
pub struct ViewDescriptor {
    id: ViewId,
    lease: Arc<StoreLease>,
    offset: usize,
    len: usize,
    capacity: usize,
}

impl ViewDescriptor {
    pub(crate) fn new(lease: Arc<StoreLease>, offset: usize, len: usize, capacity: usize) -> Self {
        debug_assert!(len <= capacity, "view length {len} exceeds capacity {capacity}");
        Self {
            id: ViewId::next(),
            lease,
            offset,
            len,
            capacity,
        }
    }

    /// Unique ID of this descriptor.
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Start index of the view within its store.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Logical element count.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view has no logical elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slots available from `offset` to the end of the view's reach.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Backing store this view reads and writes.
    pub fn store(&self) -> StoreId {
        self.lease.store()
    }

    /// Arena that issued this view.
    pub fn arena(&self) -> ArenaId {
        self.lease.arena()
    }

    /// Absolute store range `[offset, offset + len)` covered by the view's length.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }

    pub(crate) fn lease(&self) -> &Arc<StoreLease> {
        &self.lease
    }
}

impl fmt::Display for ViewDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(store={}, off={}, len={}, cap={})",
            self.id, self.lease.store(), self.offset, self.len, self.capacity
        )
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Read-only shape queries shared by every view handle.
///
/// Sealed: only the handles defined in this crate implement it.
pub trait View<T>: sealed::Sealed {
    /// The descriptor behind this handle.
    fn descriptor(&self) -> &ViewDescriptor;

    /// Unique ID of the descriptor.
    fn id(&self) -> ViewId {
        self.descriptor().id()
    }

    /// Logical element count.
    fn len(&self) -> usize {
        self.descriptor().len()
    }

    /// Whether the view has no logical elements.
    fn is_empty(&self) -> bool {
        self.descriptor().is_empty()
    }

    /// Addressable slots from the view's offset.
    fn capacity(&self) -> usize {
        self.descriptor().capacity()
    }

    /// Start index within the backing store.
    fn offset(&self) -> usize {
        self.descriptor().offset()
    }

    /// Identity of the backing store.
    fn store(&self) -> StoreId {
        self.descriptor().store()
    }

    /// Whether both views read and write the same backing store.
    fn shares_store_with<V: View<T>>(&self, other: &V) -> bool
    where
        Self: Sized,
    {
        self.descriptor().arena() == other.descriptor().arena() && self.store() == other.store()
    }
}

/// A view whose append result type depends on its capability.
pub trait Grow<T>: View<T> {
    /// Handle returned by appending to this view.
    type Grown;

    #[doc(hidden)]
    fn wrap_grown(&self, descriptor: Arc<ViewDescriptor>, promoted: bool) -> Self::Grown;
}

/// An owning handle: the view that allocated its store.
pub struct OwnedView<T> {
    inner: Arc<ViewDescriptor>,
    _elem: PhantomData<fn() -> T>,
}

/// A borrowed handle: a re-slice sharing another view's store.
pub struct BorrowedView<T> {
    inner: Arc<ViewDescriptor>,
    _elem: PhantomData<fn() -> T>,
}

impl<T> OwnedView<T> {
    pub(crate) fn from_descriptor(inner: Arc<ViewDescriptor>) -> Self {
        Self {
            inner,
            _elem: PhantomData,
        }
    }

    pub(crate) fn shared(&self) -> &Arc<ViewDescriptor> {
        &self.inner
    }
}

impl<T> BorrowedView<T> {
    pub(crate) fn from_descriptor(inner: Arc<ViewDescriptor>) -> Self {
        Self {
            inner,
            _elem: PhantomData,
        }
    }

    pub(crate) fn shared(&self) -> &Arc<ViewDescriptor> {
        &self.inner
    }
}

// Manual impls: cloning a handle never requires `T: Clone`.
impl<T> Clone for OwnedView<T> {
    fn clone(&self) -> Self {
        Self::from_descriptor(Arc::clone(&self.inner))
    }
}

impl<T> Clone for BorrowedView<T> {
    fn clone(&self) -> Self {
        Self::from_descriptor(Arc::clone(&self.inner))
    }
}

impl<T> fmt::Debug for OwnedView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedView").field(&*self.inner).finish()
    }
}

impl<T> fmt::Debug for BorrowedView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BorrowedView").field(&*self.inner).finish()
    }
}

impl<T> sealed::Sealed for OwnedView<T> {}
impl<T> sealed::Sealed for BorrowedView<T> {}

impl<T> View<T> for OwnedView<T> {
    fn descriptor(&self) -> &ViewDescriptor {
        &self.inner
    }
}

impl<T> View<T> for BorrowedView<T> {
    fn descriptor(&self) -> &ViewDescriptor {
        &self.inner
    }
}

impl<T> Grow<T> for OwnedView<T> {
    type Grown = OwnedView<T>;

    fn wrap_grown(&self, descriptor: Arc<ViewDescriptor>, _promoted: bool) -> OwnedView<T> {
        OwnedView::from_descriptor(descriptor)
    }
}

impl<T> Grow<T> for BorrowedView<T> {
    type Grown = Grown<T>;

    fn wrap_grown(&self, descriptor: Arc<ViewDescriptor>, promoted: bool) -> Grown<T> {
        if promoted {
            Grown::Promoted(OwnedView::from_descriptor(descriptor))
        } else {
            Grown::InPlace(BorrowedView::from_descriptor(descriptor))
        }
    }
}

/// Result of appending to a [`BorrowedView`].
pub enum Grown<T> {
    /// The append fit the borrowed capacity; the view still shares its
    /// parent's store.
    InPlace(BorrowedView<T>),
    /// The append outgrew the borrowed capacity; the view now owns a fresh
    /// store and aliases nothing it aliased before.
    Promoted(OwnedView<T>),
}

impl<T> Grown<T> {
    /// Whether the view has been promoted to its own store.
    pub fn is_promoted(&self) -> bool {
        matches!(self, Self::Promoted(_))
    }

    /// The owning handle, if promotion happened.
    pub fn into_owned(self) -> Option<OwnedView<T>> {
        match self {
            Self::Promoted(owned) => Some(owned),
            Self::InPlace(_) => None,
        }
    }

    /// The borrowed handle, if the append stayed in place.
    pub fn into_borrowed(self) -> Option<BorrowedView<T>> {
        match self {
            Self::InPlace(borrowed) => Some(borrowed),
            Self::Promoted(_) => None,
        }
    }

    pub(crate) fn shared(&self) -> &Arc<ViewDescriptor> {
        match self {
            Self::InPlace(borrowed) => borrowed.shared(),
            Self::Promoted(owned) => owned.shared(),
        }
    }
}

impl<T> From<BorrowedView<T>> for Grown<T> {
    fn from(view: BorrowedView<T>) -> Self {
        Self::InPlace(view)
    }
}

impl<T> Clone for Grown<T> {
    fn clone(&self) -> Self {
        match self {
            Self::InPlace(borrowed) => Self::InPlace(borrowed.clone()),
            Self::Promoted(owned) => Self::Promoted(owned.clone()),
        }
    }
}

impl<T> fmt::Debug for Grown<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InPlace(borrowed) => f.debug_tuple("InPlace").field(borrowed).finish(),
            Self::Promoted(owned) => f.debug_tuple("Promoted").field(owned).finish(),
        }
    }
}

impl<T> sealed::Sealed for Grown<T> {}

impl<T> View<T> for Grown<T> {
    fn descriptor(&self) -> &ViewDescriptor {
        self.shared()
    }
}

impl<T> Grow<T> for Grown<T> {
    type Grown = Grown<T>;

    fn wrap_grown(&self, descriptor: Arc<ViewDescriptor>, promoted: bool) -> Grown<T> {
        // Once promoted, a view owns its store for good.
        if promoted || self.is_promoted() {
            Grown::Promoted(OwnedView::from_descriptor(descriptor))
        } else {
            Grown::InPlace(BorrowedView::from_descriptor(descriptor))
        }
    }
}
