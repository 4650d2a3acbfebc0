//! Contiguous backing stores.
//!
//! A [`BackingStore`] is a fixed-capacity `Vec<T>` whose length always
//! equals its capacity: every slot is addressable from the moment the
//! store exists, default-initialised unless the caller supplied a value.
//! Stores never resize. Growing a view means allocating a new store and
//! copying into it.

use tangle_core::SliceError;

/// A single contiguous, fixed-capacity element buffer.
///
/// Stores are never exposed to callers directly; they are reached only
/// through the views that reference them.
#[derive(Debug)]
pub struct BackingStore<T> {
    /// Element storage. `data.len()` is the store's capacity.
    data: Vec<T>,
}

impl<T: Default> BackingStore<T> {
    /// Allocate a default-initialised store of exactly `capacity` slots.
    ///
    /// Returns `Err(SliceError::AllocationFailure)` if the memory cannot be
    /// reserved.
    pub fn try_allocate(capacity: usize) -> Result<Self, SliceError> {
        Self::try_with_prefix(capacity, std::iter::empty())
    }

    /// Allocate a store of exactly `capacity` slots, filling the head from
    /// `prefix` and default-initialising the rest.
    ///
    /// Items of `prefix` beyond `capacity` are ignored.
    pub fn try_with_prefix<I>(capacity: usize, prefix: I) -> Result<Self, SliceError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| SliceError::AllocationFailure {
                requested: capacity,
            })?;
        data.extend(prefix.into_iter().take(capacity));
        data.resize_with(capacity, T::default);
        Ok(Self { data })
    }
}

impl<T> BackingStore<T> {
    /// Adopt an existing vector as a store whose capacity is its length.
    ///
    /// Nothing is allocated; the vector's buffer becomes the store.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Collect `elements` into a store whose capacity is the element count.
    ///
    /// The iterator's lower size bound is checked against `max_capacity` and
    /// reserved up front; further growth is reserved fallibly as the
    /// iterator is drained, and draining stops at the first element past
    /// `max_capacity`.
    ///
    /// Returns `Err(SliceError::AllocationFailure)` if the ceiling is
    /// exceeded or memory cannot be reserved.
    pub fn try_from_iter<I>(elements: I, max_capacity: usize) -> Result<Self, SliceError>
    where
        I: IntoIterator<Item = T>,
    {
        let elements = elements.into_iter();
        let (lower, _) = elements.size_hint();
        if lower > max_capacity {
            return Err(SliceError::AllocationFailure { requested: lower });
        }
        let mut data = Vec::new();
        data.try_reserve_exact(lower)
            .map_err(|_| SliceError::AllocationFailure { requested: lower })?;
        for element in elements {
            let requested = data.len().saturating_add(1);
            if requested > max_capacity {
                return Err(SliceError::AllocationFailure { requested });
            }
            if data.len() == data.capacity() {
                data.try_reserve(1)
                    .map_err(|_| SliceError::AllocationFailure { requested })?;
            }
            data.push(element);
        }
        Ok(Self { data })
    }

    /// Total capacity in elements.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Get a shared slice at the given absolute offset and length.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the store's capacity.
    pub fn slice(&self, offset: usize, len: usize) -> &[T] {
        &self.data[offset..offset + len]
    }

    /// Get a mutable slice at the given absolute offset and length.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the store's capacity.
    pub fn slice_mut(&mut self, offset: usize, len: usize) -> &mut [T] {
        &mut self.data[offset..offset + len]
    }

    /// Overwrite the slot at an absolute index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the store's capacity.
    pub fn write(&mut self, index: usize, value: T) {
        self.data[index] = value;
    }
}
