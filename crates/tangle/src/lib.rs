//! Tangle: a capacity-aware slice model that reproduces view aliasing,
//! in-capacity clobbering, and silent promotion.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Tangle sub-crates. For most users, adding `tangle` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tangle::prelude::*;
//!
//! let mut arena = SliceArena::new();
//! let arr = arena.from_elements([1, 2, 3, 4, 5])?;
//! let sub = arena.slice(&arr, 0, 3)?;
//!
//! // `sub` has length 3 but capacity 5: this append writes in place...
//! let grown = arena.append(&sub, [6, 7])?;
//! assert!(!grown.is_promoted());
//!
//! // ...over the last two elements of `arr`.
//! assert_eq!(arena.to_vec(&arr)?, vec![1, 2, 3, 6, 7]);
//!
//! // One more element no longer fits: the view moves to a new store.
//! let promoted = arena.append(&grown, [8])?;
//! assert!(promoted.is_promoted());
//! arena.set(&promoted, 0, 100)?;
//! assert_eq!(arena.get(&arr, 0)?, 1);
//! # Ok::<(), tangle::types::SliceError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `tangle-arena` | `SliceArena`, view handles, growth policies, hazard tracking |
//! | [`types`] | `tangle-core` | IDs, errors, the `GrowthPolicy` trait |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Backing stores, views, growth, and hazard tracking (`tangle-arena`).
pub use tangle_arena as arena;

/// Identifiers, errors, and the growth-policy trait (`tangle-core`).
pub use tangle_core as types;

/// Common imports for working with the slice model.
///
/// ```rust
/// use tangle::prelude::*;
/// ```
pub mod prelude {
    pub use tangle_arena::{
        ArenaConfig, BorrowedView, ExactGrowth, Grow, Grown, HazardEvent, OwnedView, SliceArena,
        StandardGrowth, View, WriteKind,
    };
    pub use tangle_core::{ArenaId, ConfigError, GrowthPolicy, SliceError, StoreId, ViewId};
}
