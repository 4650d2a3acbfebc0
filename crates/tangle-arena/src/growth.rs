//! Growth policies for promoting appends.
//!
//! [`StandardGrowth`] reproduces the reference behaviour: double while the
//! old capacity is below a threshold, then grow by `capacity / slow_divisor`
//! steps until the request fits. A request larger than twice the old
//! capacity jumps straight to the requested size.
//!
//! The constants are policy, not contract. The only invariant the arena
//! relies on is `new_capacity >= needed`, and [`next_capacity`] enforces it
//! regardless of what the policy returns.

use tangle_core::{ConfigError, GrowthPolicy};

/// Double below a threshold, then grow by a sub-2x factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StandardGrowth {
    /// Capacities below this double on growth.
    pub threshold: usize,
    /// At or above the threshold, capacity grows in steps of
    /// `capacity / slow_divisor` (4 gives the 1.25x factor).
    pub slow_divisor: usize,
}

impl StandardGrowth {
    /// Default doubling threshold, in elements.
    pub const DEFAULT_THRESHOLD: usize = 1024;

    /// Default slow-growth divisor (x1.25 per step).
    pub const DEFAULT_SLOW_DIVISOR: usize = 4;

    /// Create a policy with explicit constants.
    ///
    /// Returns `Err(ConfigError)` if `slow_divisor` is zero.
    pub fn new(threshold: usize, slow_divisor: usize) -> Result<Self, ConfigError> {
        if slow_divisor == 0 {
            return Err(ConfigError::new("slow_divisor must be non-zero"));
        }
        Ok(Self {
            threshold,
            slow_divisor,
        })
    }
}

impl Default for StandardGrowth {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            slow_divisor: Self::DEFAULT_SLOW_DIVISOR,
        }
    }
}

impl GrowthPolicy for StandardGrowth {
    fn grow(&self, capacity: usize, needed: usize) -> usize {
        let doubled = capacity.saturating_mul(2);
        if needed > doubled {
            return needed;
        }
        if capacity < self.threshold {
            return doubled;
        }
        let divisor = self.slow_divisor.max(1);
        let mut grown = capacity;
        while grown < needed {
            grown = grown.saturating_add((grown / divisor).max(1));
        }
        grown
    }
}

/// Grow to exactly the requested size. Every promoting append leaves the
/// new store full, so the next append promotes again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExactGrowth;

impl GrowthPolicy for ExactGrowth {
    fn grow(&self, _capacity: usize, needed: usize) -> usize {
        needed
    }
}

/// Ask `policy` for a replacement capacity, rounded up to at least `needed`.
pub fn next_capacity(policy: &dyn GrowthPolicy, capacity: usize, needed: usize) -> usize {
    policy.grow(capacity, needed).max(needed)
}
