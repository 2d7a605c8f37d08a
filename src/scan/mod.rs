//! Scan-line primitives: crossings, the winding resolver, span algebra and
//! the flattened edge tables that drive classification.

pub mod crossing;
mod shape;
pub mod spans;
pub mod winding;

pub use crossing::{sort_crossings, Crossing, Direction};
pub(crate) use shape::ScanShape;
pub use winding::{inside_intervals, resolve_winding};

use crate::error::{GeometryError, Result};

/// Parameters controlling how boundaries are approximated for scanning.
#[derive(Debug, Clone, Copy)]
pub struct ScanParams {
    /// Maximum deviation of flattened arc chords from the true boundary.
    pub flatness: f64,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self { flatness: 1e-3 }
    }
}

impl ScanParams {
    /// Sets the flatness tolerance used to flatten arcs.
    #[must_use]
    pub fn with_flatness(mut self, flatness: f64) -> Self {
        self.flatness = flatness;
        self
    }

    /// Checks that the flatness is positive and finite.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidTolerance`] otherwise.
    pub fn validate(&self) -> Result<()> {
        if self.flatness > 0.0 && self.flatness.is_finite() {
            Ok(())
        } else {
            Err(GeometryError::InvalidTolerance(self.flatness).into())
        }
    }
}
