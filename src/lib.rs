//! Region-of-interest geometry for gridded datasets: a shape family with
//! identity and reconstruction proxies, scan-line classification of grid
//! points, and complement/difference composition.

pub mod error;
pub mod geometry;
pub mod grid;
pub mod math;
pub mod operations;
pub mod roi;
pub mod scan;

pub use error::{RoiError, Result};

/// Routes `tracing` output through the test harness. `RUST_LOG` selects levels.
#[cfg(test)]
pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
