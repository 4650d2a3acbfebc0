//! A naive reference model of the slice semantics.
//!
//! [`ShadowModel`] keeps every store as a plain `Vec<i64>` and every view as
//! a `Copy` tuple. It shares no code with `tangle-arena`, so agreement
//! between the two under random operation sequences is evidence that the
//! arena's aliasing, clobbering, and promotion timing are right.

use tangle_core::GrowthPolicy;

/// A view in the shadow model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShadowView {
    pub store: usize,
    pub offset: usize,
    pub len: usize,
    pub cap: usize,
}

/// One step of a random operation sequence.
///
/// `view` indexes the list of views produced so far (modulo its length);
/// bounds are deliberately unconstrained so invalid requests are exercised.
#[derive(Clone, Debug)]
pub enum Op {
    Slice { view: usize, lo: usize, hi: usize },
    Set { view: usize, index: usize, value: i64 },
    Append { view: usize, values: Vec<i64> },
}

/// Stores and views of the reference model.
#[derive(Debug, Default)]
pub struct ShadowModel {
    stores: Vec<Vec<i64>>,
}

impl ShadowModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(&mut self, elements: &[i64]) -> ShadowView {
        self.stores.push(elements.to_vec());
        ShadowView {
            store: self.stores.len() - 1,
            offset: 0,
            len: elements.len(),
            cap: elements.len(),
        }
    }

    pub fn slice(&self, view: ShadowView, lo: usize, hi: usize) -> Option<ShadowView> {
        if lo > hi || hi > view.cap {
            return None;
        }
        Some(ShadowView {
            store: view.store,
            offset: view.offset + lo,
            len: hi - lo,
            cap: view.cap - lo,
        })
    }

    pub fn get(&self, view: ShadowView, index: usize) -> Option<i64> {
        (index < view.len).then(|| self.stores[view.store][view.offset + index])
    }

    pub fn set(&mut self, view: ShadowView, index: usize, value: i64) -> bool {
        if index >= view.len {
            return false;
        }
        self.stores[view.store][view.offset + index] = value;
        true
    }

    pub fn append(&mut self, view: ShadowView, values: &[i64], policy: &dyn GrowthPolicy) -> ShadowView {
        let needed = view.len + values.len();
        if needed <= view.cap {
            let store = &mut self.stores[view.store];
            for (i, &value) in values.iter().enumerate() {
                store[view.offset + view.len + i] = value;
            }
            return ShadowView { len: needed, ..view };
        }

        let cap = policy.grow(view.cap, needed).max(needed);
        let mut fresh = vec![0; cap];
        fresh[..view.len].copy_from_slice(&self.stores[view.store][view.offset..view.offset + view.len]);
        fresh[view.len..needed].copy_from_slice(values);
        self.stores.push(fresh);
        ShadowView {
            store: self.stores.len() - 1,
            offset: 0,
            len: needed,
            cap,
        }
    }

    pub fn contents(&self, view: ShadowView) -> Vec<i64> {
        self.stores[view.store][view.offset..view.offset + view.len].to_vec()
    }

    pub fn store_count(&self) -> usize {
        self.stores.len()
    }
}
