//! Benchmark workloads for the Tangle slice model.
//!
//! - [`filled_arena`]: an arena holding one view of `len` sequential values.
//! - [`append_chain`]: grow a view one element at a time, the workload that
//!   exercises the growth policy hardest.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tangle_arena::{OwnedView, SliceArena};
use tangle_core::SliceError;

/// Build an arena holding a single view over `0..len`.
pub fn filled_arena(len: usize) -> Result<(SliceArena<u64>, OwnedView<u64>), SliceError> {
    let mut arena = SliceArena::new();
    let view = arena.from_elements(0..len as u64)?;
    Ok((arena, view))
}

/// Append `count` elements one at a time starting from an empty view.
///
/// Returns the final view. Intermediate stores are reclaimed before returning.
pub fn append_chain(arena: &mut SliceArena<u64>, count: usize) -> Result<OwnedView<u64>, SliceError> {
    let mut view = arena.from_elements(std::iter::empty())?;
    for i in 0..count as u64 {
        view = arena.append(&view, [i])?;
    }
    arena.reclaim();
    Ok(view)
}
