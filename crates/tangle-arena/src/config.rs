//! Arena configuration parameters.

use tangle_core::ConfigError;

/// Configuration for a slice arena.
///
/// Validated at construction; all values are immutable after creation.
/// The growth policy is injected separately (see
/// [`SliceArena::with_policy`](crate::SliceArena::with_policy)).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Largest store, in elements, the arena will allocate on its own
    /// behalf (`with_capacity` and promoting appends).
    ///
    /// Default: `isize::MAX`, the hard limit of a `Vec`. Lower it to make
    /// allocation failure reachable in tests or to cap interpreter memory.
    pub max_store_capacity: usize,

    /// Record cross-view clobbers and promotions as hazard events.
    ///
    /// Default: `false`. Tracking never changes what an operation does.
    pub track_hazards: bool,

    /// Maximum number of hazard events retained. Oldest events are dropped
    /// first.
    ///
    /// Default: 4096. Must be non-zero when `track_hazards` is set.
    pub max_hazard_events: usize,
}

impl ArenaConfig {
    /// Default store capacity ceiling.
    pub const DEFAULT_MAX_STORE_CAPACITY: usize = isize::MAX as usize;

    /// Default hazard event budget.
    pub const DEFAULT_MAX_HAZARD_EVENTS: usize = 4096;

    /// Create a config with default values and hazard tracking off.
    pub fn new() -> Self {
        Self {
            max_store_capacity: Self::DEFAULT_MAX_STORE_CAPACITY,
            track_hazards: false,
            max_hazard_events: Self::DEFAULT_MAX_HAZARD_EVENTS,
        }
    }

    /// Create a config with default values and hazard tracking on.
    pub fn tracked() -> Self {
        Self {
            track_hazards: true,
            ..Self::new()
        }
    }

    /// Check the config for settings the arena cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_store_capacity == 0 {
            return Err(ConfigError::new("max_store_capacity must be non-zero"));
        }
        if self.track_hazards && self.max_hazard_events == 0 {
            return Err(ConfigError::new(
                "max_hazard_events must be non-zero when track_hazards is set",
            ));
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
