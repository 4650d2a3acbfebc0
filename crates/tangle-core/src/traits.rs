//! Core abstraction traits.

/// Chooses the capacity of the replacement store when an append outgrows
/// its view.
///
/// Implementations receive the view's current capacity and the number of
/// elements the append needs. The arena always rounds the answer up to at
/// least `needed`, so a policy cannot break monotonicity; the policy only
/// decides how much headroom the new store gets.
///
/// Any `Fn(usize, usize) -> usize` closure is a policy.
pub trait GrowthPolicy: Send + Sync {
    /// Return the capacity for the replacement store.
    fn grow(&self, capacity: usize, needed: usize) -> usize;
}

impl<F> GrowthPolicy for F
where
    F: Fn(usize, usize) -> usize + Send + Sync,
{
    fn grow(&self, capacity: usize, needed: usize) -> usize {
        self(capacity, needed)
    }
}
