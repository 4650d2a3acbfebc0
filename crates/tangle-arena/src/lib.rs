//! Backing stores, aliasing views, and growth for the Tangle slice model.
//!
//! A view is a `(store, offset, length, capacity)` descriptor over a shared
//! backing store. Re-slices alias their parent, writes are visible through
//! every overlapping view, appends that fit the capacity overwrite whatever
//! sits past the view's length, and appends that do not fit move the view
//! to a fresh store without telling anyone who still aliases the old one.
//! This crate reproduces that behaviour exactly and makes it observable.
//!
//! # Architecture
//!
//! ```text
//! SliceArena<T> (every operation)
//! ├── StoreSlab<T> → BackingStore<T>[] (fixed-capacity Vec<T>)
//! │   └── Arc<StoreLease> per slot (refcount = holders, reclaim at 1)
//! ├── Box<dyn GrowthPolicy> (StandardGrowth by default)
//! └── Option<HazardTracker> (live view ranges + hazard log)
//!
//! OwnedView<T> / BorrowedView<T> / Grown<T> → Arc<ViewDescriptor>
//! ```
//!
//! # Capabilities
//!
//! - **OwnedView:** allocated the store it points at. Appends yield `OwnedView`.
//! - **BorrowedView:** a re-slice. Appends yield [`Grown`], either still
//!   `InPlace` or `Promoted` to an `OwnedView`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod config;
pub mod growth;
pub mod hazard;
pub mod lease;
pub mod slab;
pub mod store;
pub mod view;

// Public re-exports for the primary API surface.
pub use arena::SliceArena;
pub use config::ArenaConfig;
pub use growth::{ExactGrowth, StandardGrowth};
pub use hazard::{HazardEvent, HazardTracker, WriteKind};
pub use view::{BorrowedView, Grow, Grown, OwnedView, View, ViewDescriptor};
