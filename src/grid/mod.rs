//! Regular sample grids and their mapping onto the plane.

mod classify;
pub mod recipient;

use std::ops::{Range, RangeInclusive};

pub use classify::GridClassifier;
pub use recipient::{
    DivisionCollector, GridPointDivisionRecipient, GridPointRecipient, PointCollector,
    PointCounter,
};

use crate::error::{GeometryError, Result};
use crate::math::{Point2, Vector2};

/// Index values within this distance of an integer are treated as that integer.
const INDEX_SNAP: f64 = 1e-9;

/// Dimensions of a logical 2D array addressed by `(row, column)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Grid {
    pub rows: usize,
    pub columns: usize,
}

impl Grid {
    /// A grid of `rows` × `columns` points.
    #[must_use]
    pub fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }

    /// Number of grid points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.rows.saturating_mul(self.columns)
    }

    /// Whether the grid has no point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.columns == 0
    }

    /// The window covering the whole grid, or `None` for an empty grid.
    #[must_use]
    pub fn full_window(&self) -> Option<GridWindow> {
        (!self.is_empty()).then(|| GridWindow::new(0, self.rows - 1, 0, self.columns - 1))
    }
}

/// Converts grid indices to plane coordinates and back.
///
/// Rows map to `y` and columns to `x`, independently of each other. The
/// inverse functions return fractional indices.
pub trait GridMapping {
    fn x_at(&self, column: usize) -> f64;

    fn y_at(&self, row: usize) -> f64;

    fn column_at(&self, x: f64) -> f64;

    fn row_at(&self, y: f64) -> f64;

    fn point_at(&self, row: usize, column: usize) -> Point2 {
        Point2::new(self.x_at(column), self.y_at(row))
    }
}

/// Evenly spaced samples: `point(row, col) = origin + (col * dx, row * dy)`.
///
/// Negative spacing is allowed, e.g. for images whose rows run downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegularMapping {
    origin: Point2,
    spacing: Vector2,
}

impl RegularMapping {
    /// # Errors
    ///
    /// Returns [`GeometryError::DegenerateMapping`] if a spacing component is
    /// zero or not finite.
    pub fn new(origin: Point2, spacing: Vector2) -> Result<Self> {
        let valid = |d: f64| d.is_finite() && d != 0.0;
        if !(valid(spacing.x) && valid(spacing.y)) {
            return Err(GeometryError::DegenerateMapping {
                dx: spacing.x,
                dy: spacing.y,
            }
            .into());
        }
        Ok(Self { origin, spacing })
    }

    /// Samples at the centres of cells of size `cell`, the first cell starting at `min`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegenerateMapping`] for a degenerate cell size.
    pub fn cell_centers(min: Point2, cell: Vector2) -> Result<Self> {
        Self::new(min + cell * 0.5, cell)
    }

    /// Plane position of grid point (0, 0).
    #[must_use]
    pub fn origin(&self) -> Point2 {
        self.origin
    }

    /// Distance between neighbouring grid points.
    #[must_use]
    pub fn spacing(&self) -> Vector2 {
        self.spacing
    }
}

impl GridMapping for RegularMapping {
    #[allow(clippy::cast_precision_loss)]
    fn x_at(&self, column: usize) -> f64 {
        self.origin.x + column as f64 * self.spacing.x
    }

    #[allow(clippy::cast_precision_loss)]
    fn y_at(&self, row: usize) -> f64 {
        self.origin.y + row as f64 * self.spacing.y
    }

    fn column_at(&self, x: f64) -> f64 {
        (x - self.origin.x) / self.spacing.x
    }

    fn row_at(&self, y: f64) -> f64 {
        (y - self.origin.y) / self.spacing.y
    }
}

/// Inclusive row and column bounds of a sub-rectangle of a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridWindow {
    pub rows: RangeInclusive<usize>,
    pub columns: RangeInclusive<usize>,
}

impl GridWindow {
    /// A window over the inclusive index ranges.
    #[must_use]
    pub fn new(row_min: usize, row_max: usize, column_min: usize, column_max: usize) -> Self {
        Self {
            rows: row_min..=row_max,
            columns: column_min..=column_max,
        }
    }

    /// Half-open row and column ranges clipped to `grid`.
    #[must_use]
    pub(crate) fn clamp_to(&self, grid: &Grid) -> (Range<usize>, Range<usize>) {
        let clip = |r: &RangeInclusive<usize>, n: usize| {
            let end = r.end().saturating_add(1).min(n);
            (*r.start()).min(end)..end
        };
        (clip(&self.rows, grid.rows), clip(&self.columns, grid.columns))
    }
}

/// Which grid points a classification selects relative to an ROI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoiRelativePosition {
    /// Every grid point, regardless of any ROI.
    Everything,
    Inside,
    Outside,
}

impl RoiRelativePosition {
    /// `false` only for [`RoiRelativePosition::Everything`].
    #[must_use]
    pub fn depends_on_roi(self) -> bool {
        !matches!(self, Self::Everything)
    }
}

fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() <= INDEX_SNAP {
        r
    } else {
        v
    }
}

/// Integer indices `i` with `lo <= i <= hi`, clipped to `within`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub(crate) fn index_span(lo: f64, hi: f64, within: &Range<usize>) -> Option<Range<usize>> {
    if lo.is_nan() || hi.is_nan() {
        return None;
    }
    let first = snap(lo).ceil().max(within.start as f64);
    let last = snap(hi).floor().min(within.end as f64 - 1.0);
    if first > last {
        return None;
    }
    Some(first as usize..last as usize + 1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::RoiError;

    #[test]
    fn regular_mapping_round_trip() {
        let m = RegularMapping::new(Point2::new(1.0, -2.0), Vector2::new(0.5, -0.25)).unwrap();
        let p = m.point_at(4, 6);
        assert!((p.x - 4.0).abs() < 1e-12);
        assert!((p.y + 3.0).abs() < 1e-12);
        assert!((m.column_at(p.x) - 6.0).abs() < 1e-12);
        assert!((m.row_at(p.y) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn cell_centers_offset_by_half_a_cell() {
        let m = RegularMapping::cell_centers(Point2::origin(), Vector2::new(1.0, 1.0)).unwrap();
        assert_eq!(m.point_at(0, 0), Point2::new(0.5, 0.5));
        assert_eq!(m.point_at(9, 3), Point2::new(3.5, 9.5));
    }

    #[test]
    fn zero_spacing_rejected() {
        let err = RegularMapping::new(Point2::origin(), Vector2::new(1.0, 0.0)).unwrap_err();
        assert!(matches!(
            err,
            RoiError::Geometry(GeometryError::DegenerateMapping { .. })
        ));
    }

    #[test]
    fn index_span_inclusive_and_clipped() {
        assert_eq!(index_span(1.2, 4.0, &(0..10)), Some(2..5));
        assert_eq!(index_span(-3.0, 2.5, &(0..10)), Some(0..3));
        assert_eq!(index_span(8.5, 30.0, &(0..10)), Some(9..10));
        assert_eq!(index_span(2.2, 2.8, &(0..10)), None);
        assert_eq!(index_span(2.999_999_999_9, 3.000_000_000_1, &(0..10)), Some(3..4));
        assert_eq!(index_span(f64::NAN, 3.0, &(0..10)), None);
        assert_eq!(index_span(0.0, 3.0, &(5..5)), None);
    }

    #[test]
    fn window_clamps_to_grid() {
        let grid = Grid::new(4, 6);
        let (rows, cols) = GridWindow::new(1, 10, 2, 3).clamp_to(&grid);
        assert_eq!(rows, 1..4);
        assert_eq!(cols, 2..4);
        let (rows, _) = GridWindow::new(7, 9, 0, 0).clamp_to(&grid);
        assert!(rows.is_empty());
        assert_eq!(grid.full_window(), Some(GridWindow::new(0, 3, 0, 5)));
        assert_eq!(Grid::new(0, 3).full_window(), None);
    }

    #[test]
    fn everything_is_roi_independent() {
        assert!(!RoiRelativePosition::Everything.depends_on_roi());
        assert!(RoiRelativePosition::Inside.depends_on_roi());
    }
}
