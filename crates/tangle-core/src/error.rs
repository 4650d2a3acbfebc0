//! Error types for the Tangle slice model.
//!
//! Bounds violations are always reported, never clamped: a silently
//! truncated request is exactly the class of corruption this model exists
//! to make visible.

use std::error::Error;
use std::fmt;

use crate::id::ArenaId;

/// Errors from view construction, indexed access, and append.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SliceError {
    /// Slice bounds violate `lo <= hi <= capacity`.
    OutOfRange {
        /// Requested low bound.
        lo: usize,
        /// Requested high bound.
        hi: usize,
        /// Capacity the bounds were checked against.
        capacity: usize,
    },
    /// Element index violates `index < length`.
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Logical length of the view.
        length: usize,
    },
    /// A new backing store could not be obtained.
    ///
    /// Fatal at this layer: propagated to the caller, never retried.
    AllocationFailure {
        /// Number of elements the allocation asked for.
        requested: usize,
    },
    /// The view was created by a different arena.
    ForeignView {
        /// Arena that created the view.
        view_arena: ArenaId,
        /// Arena the operation was invoked on.
        arena: ArenaId,
    },
}

impl fmt::Display for SliceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { lo, hi, capacity } => {
                write!(
                    f,
                    "slice bounds out of range: [{lo}:{hi}] with capacity {capacity}"
                )
            }
            Self::IndexOutOfBounds { index, length } => {
                write!(f, "index out of bounds: index {index} with length {length}")
            }
            Self::AllocationFailure { requested } => {
                write!(f, "allocation failed: requested {requested} elements")
            }
            Self::ForeignView { view_arena, arena } => {
                write!(f, "view belongs to arena {view_arena}, not arena {arena}")
            }
        }
    }
}

impl Error for SliceError {}

/// Invalid arena or growth-policy configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    /// Human-readable description of the rejected setting.
    pub reason: String,
}

impl ConfigError {
    /// Create a configuration error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: {}", self.reason)
    }
}

impl Error for ConfigError {}
