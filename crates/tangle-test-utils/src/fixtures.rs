//! Canonical aliasing scenarios.
//!
//! - [`five_element_array`]: the five-element array `[1, 2, 3, 4, 5]` every
//!   scenario starts from.
//! - [`ClobberScenario`]: a three-element prefix view appended to in place,
//!   overwriting the parent's last two elements.

use tangle_arena::{ArenaConfig, BorrowedView, Grown, OwnedView, SliceArena};

/// An arena with hazard tracking on.
pub fn tracked_arena<T>() -> SliceArena<T> {
    SliceArena::with_config(ArenaConfig::tracked()).expect("tracked config is valid")
}

/// Allocate `[1, 2, 3, 4, 5]`.
pub fn five_element_array(arena: &mut SliceArena<i32>) -> OwnedView<i32> {
    arena
        .from_elements([1, 2, 3, 4, 5])
        .expect("five-element store allocates")
}

/// `arr = [1, 2, 3, 4, 5]; sub = arr[0:3]; grown = append(sub, 6, 7)`.
pub struct ClobberScenario {
    pub arr: OwnedView<i32>,
    pub sub: BorrowedView<i32>,
    pub grown: Grown<i32>,
}

impl ClobberScenario {
    pub fn run(arena: &mut SliceArena<i32>) -> Self {
        let arr = five_element_array(arena);
        let sub = arena.slice(&arr, 0, 3).expect("0..3 is within capacity 5");
        let grown = arena.append(&sub, [6, 7]).expect("in-place append");
        Self { arr, sub, grown }
    }
}
