//! Test utilities for Tangle development.
//!
//! Provides logging setup for tests, the canonical aliasing scenarios as
//! ready-made fixtures, and [`ShadowModel`], a deliberately naive second
//! implementation of the slice semantics used as an oracle by property
//! tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod shadow;

pub use fixtures::{five_element_array, tracked_arena, ClobberScenario};
pub use shadow::{Op, ShadowModel, ShadowView};

/// Initialise `tracing` output for tests.
///
/// Honours `RUST_LOG`, defaulting to `debug`. Safe to call from every test;
/// only the first call installs a subscriber.
pub fn init_test_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}
