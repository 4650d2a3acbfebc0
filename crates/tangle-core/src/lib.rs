//! Core types and traits for the Tangle slice model.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers, the error taxonomy, and the growth-policy seam shared
//! by the arena and every consumer of the model.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod traits;

pub use error::{ConfigError, SliceError};
pub use id::{ArenaId, StoreId, ViewId};
pub use traits::GrowthPolicy;
