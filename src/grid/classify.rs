use std::ops::Range;

use crate::error::Result;
use crate::geometry::Shape;
use crate::scan::spans::complement;
use crate::scan::{ScanParams, ScanShape};

use super::recipient::{GridPointDivisionRecipient, GridPointRecipient};
use super::{index_span, Grid, GridMapping, GridWindow, RoiRelativePosition};

/// Consecutive rows sharing the same inside column runs.
type RowGroup = (Range<usize>, Vec<Range<usize>>);

/// Classifies the points of a regular grid against a shape, one scan line
/// per grid row.
///
/// Inside runs are delivered as blocks; consecutive rows with identical runs
/// are merged into a single multi-row block, and a run covering one cell is
/// delivered as a point. All rows are resolved before the first callback, so
/// a malformed boundary produces an error and no callbacks at all.
#[derive(Debug, Clone)]
pub struct GridClassifier {
    scan: ScanShape,
}

impl GridClassifier {
    /// Compiles `shape` with default [`ScanParams`].
    #[must_use]
    pub fn new(shape: &Shape) -> Self {
        Self {
            scan: ScanShape::compile(shape, ScanParams::default().flatness),
        }
    }

    /// Compiles `shape` with custom scan parameters.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GeometryError::InvalidTolerance`] for a
    /// flatness that is not positive and finite.
    pub fn with_params(shape: &Shape, params: &ScanParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            scan: ScanShape::compile(shape, params.flatness),
        })
    }

    /// Delivers the grid points selected by `position` to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GeometryError::MalformedBoundary`] if a row's
    /// scan line does not close.
    pub fn add_points<M, R>(
        &self,
        grid: &Grid,
        mapping: &M,
        position: RoiRelativePosition,
        recipient: &mut R,
    ) -> Result<()>
    where
        M: GridMapping + ?Sized,
        R: GridPointRecipient + ?Sized,
    {
        let Some(window) = grid.full_window() else {
            return Ok(());
        };
        let (rows, columns) = window.clamp_to(grid);

        match position {
            RoiRelativePosition::Everything => {
                emit_runs(recipient, &rows, &[columns]);
            }
            RoiRelativePosition::Inside => {
                for (group_rows, spans) in self.row_groups(rows, &columns, mapping)? {
                    emit_runs(recipient, &group_rows, &spans);
                }
            }
            RoiRelativePosition::Outside => {
                for (group_rows, spans) in self.row_groups(rows, &columns, mapping)? {
                    emit_runs(recipient, &group_rows, &complement(&spans, columns.clone()));
                }
            }
        }
        Ok(())
    }

    /// Classifies the inclusive sub-rectangle `window` in one pass, sending
    /// inside and outside points to the two channels of `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GeometryError::MalformedBoundary`] if a row's
    /// scan line does not close.
    pub fn divide_points<M, R>(
        &self,
        grid: &Grid,
        mapping: &M,
        window: &GridWindow,
        recipient: &mut R,
    ) -> Result<()>
    where
        M: GridMapping + ?Sized,
        R: GridPointDivisionRecipient + ?Sized,
    {
        let (rows, columns) = window.clamp_to(grid);
        for (group_rows, inside) in self.row_groups(rows, &columns, mapping)? {
            for span in &inside {
                if group_rows.len() == 1 && span.len() == 1 {
                    recipient.add_inside_point(group_rows.start, span.start);
                } else {
                    recipient.add_inside_block(
                        group_rows.start,
                        group_rows.end,
                        span.start,
                        span.end,
                    );
                }
            }
            for span in complement(&inside, columns.clone()) {
                if group_rows.len() == 1 && span.len() == 1 {
                    recipient.add_outside_point(group_rows.start, span.start);
                } else {
                    recipient.add_outside_block(
                        group_rows.start,
                        group_rows.end,
                        span.start,
                        span.end,
                    );
                }
            }
        }
        Ok(())
    }

    /// Never less than the number of inside points: grid points within the
    /// shape's bounding box, widened by one index on each side.
    #[must_use]
    pub fn points_inside_count_upper_bound<M: GridMapping + ?Sized>(
        &self,
        grid: &Grid,
        mapping: &M,
    ) -> usize {
        let bounds = self.scan.bounds();
        if bounds.is_empty() || grid.is_empty() {
            return 0;
        }
        let widened = |a: f64, b: f64, n: usize| {
            index_span(a.min(b) - 1.0, a.max(b) + 1.0, &(0..n)).map_or(0, |r| r.len())
        };
        let rows = widened(mapping.row_at(bounds.min.y), mapping.row_at(bounds.max.y), grid.rows);
        let columns = widened(
            mapping.column_at(bounds.min.x),
            mapping.column_at(bounds.max.x),
            grid.columns,
        );
        rows.saturating_mul(columns)
    }

    /// Never less than the number of outside points.
    #[must_use]
    pub fn points_outside_count_upper_bound(&self, grid: &Grid) -> usize {
        grid.point_count()
    }

    /// Upper bound for the points `add_points` delivers for `position`.
    #[must_use]
    pub fn point_count_upper_bound<M: GridMapping + ?Sized>(
        &self,
        grid: &Grid,
        mapping: &M,
        position: RoiRelativePosition,
    ) -> usize {
        match position {
            RoiRelativePosition::Everything => grid.point_count(),
            RoiRelativePosition::Inside => self.points_inside_count_upper_bound(grid, mapping),
            RoiRelativePosition::Outside => self.points_outside_count_upper_bound(grid),
        }
    }

    /// Resolves every row and merges consecutive rows with identical runs.
    fn row_groups<M: GridMapping + ?Sized>(
        &self,
        rows: Range<usize>,
        columns: &Range<usize>,
        mapping: &M,
    ) -> Result<Vec<RowGroup>> {
        let row_count = rows.len();
        let mut groups: Vec<RowGroup> = Vec::new();
        for row in rows {
            let spans = if columns.is_empty() {
                Vec::new()
            } else {
                self.scan.column_spans(mapping.y_at(row), mapping, columns)?
            };
            if let Some((group_rows, group_spans)) = groups.last_mut() {
                if *group_spans == spans {
                    group_rows.end = row + 1;
                    continue;
                }
            }
            groups.push((row..row + 1, spans));
        }
        tracing::trace!(rows = row_count, groups = groups.len(), "classified grid rows");
        Ok(groups)
    }
}

fn emit_runs<R: GridPointRecipient + ?Sized>(
    recipient: &mut R,
    rows: &Range<usize>,
    spans: &[Range<usize>],
) {
    for span in spans {
        if rows.is_empty() || span.is_empty() {
            continue;
        }
        if rows.len() == 1 && span.len() == 1 {
            recipient.add_point(rows.start, span.start);
        } else {
            recipient.add_block(rows.start, rows.end, span.start, span.end);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Contour, Region};
    use crate::grid::{DivisionCollector, PointCollector, PointCounter, RegularMapping};
    use crate::math::{Point2, Vector2};

    fn unit_cells() -> RegularMapping {
        RegularMapping::cell_centers(Point2::origin(), Vector2::new(1.0, 1.0)).unwrap()
    }

    fn square(min: f64, max: f64) -> Shape {
        Region::rectangle(Point2::new(min, min), Point2::new(max, max)).into()
    }

    fn hole_shape() -> Shape {
        Shape::difference(square(0.0, 10.0), [square(3.0, 7.0)])
    }

    #[test]
    fn hole_scenario_counts() {
        let grid = Grid::new(10, 10);
        let classifier = GridClassifier::new(&hole_shape());
        let mut inside = PointCollector::new();
        classifier
            .add_points(&grid, &unit_cells(), RoiRelativePosition::Inside, &mut inside)
            .unwrap();
        let mut outside = PointCollector::new();
        classifier
            .add_points(&grid, &unit_cells(), RoiRelativePosition::Outside, &mut outside)
            .unwrap();
        assert_eq!(inside.len(), 84);
        assert_eq!(outside.len(), 16);
        for r in 3..7 {
            for c in 3..7 {
                assert!(outside.points().contains(&(r, c)));
            }
        }
    }

    #[test]
    fn identical_rows_coalesce_into_one_block() {
        let grid = Grid::new(10, 10);
        let mut counter = PointCounter::default();
        GridClassifier::new(&square(2.0, 8.0))
            .add_points(&grid, &unit_cells(), RoiRelativePosition::Inside, &mut counter)
            .unwrap();
        // Centres 2.5..=7.5 in both directions.
        assert_eq!(counter.points, 36);
        assert_eq!(counter.block_calls, 1);
        assert_eq!(counter.point_calls, 0);
    }

    #[test]
    fn hole_rows_coalesce_by_run_pattern() {
        let grid = Grid::new(10, 10);
        let mut counter = PointCounter::default();
        GridClassifier::new(&hole_shape())
            .add_points(&grid, &unit_cells(), RoiRelativePosition::Inside, &mut counter)
            .unwrap();
        // Rows 0..3 full, rows 3..7 split in two runs, rows 7..10 full.
        assert_eq!(counter.block_calls, 4);
        assert_eq!(counter.points, 84);
    }

    #[test]
    fn single_cell_run_is_a_point() {
        let grid = Grid::new(5, 5);
        let mut counter = PointCounter::default();
        GridClassifier::new(&square(1.9, 2.1))
            .add_points(&grid, &unit_cells(), RoiRelativePosition::Inside, &mut counter)
            .unwrap();
        assert_eq!(counter.points, 0);

        let tiny: Shape = Region::rectangle(Point2::new(2.4, 2.4), Point2::new(2.6, 2.6)).into();
        let mut collector = PointCollector::new();
        GridClassifier::new(&tiny)
            .add_points(&grid, &unit_cells(), RoiRelativePosition::Inside, &mut collector)
            .unwrap();
        assert_eq!(collector.points(), &[(2, 2)]);
    }

    #[test]
    fn everything_ignores_the_shape() {
        let grid = Grid::new(3, 4);
        let mut counter = PointCounter::default();
        GridClassifier::new(&square(100.0, 101.0))
            .add_points(&grid, &unit_cells(), RoiRelativePosition::Everything, &mut counter)
            .unwrap();
        assert_eq!(counter.points, 12);
        assert_eq!(counter.block_calls, 1);
    }

    #[test]
    fn classification_agrees_with_contains() {
        // Concave "L" with a triangular notch, sampled on an offset grid.
        let shape: Shape = Region::from_contour(Contour::from_points(&[
            Point2::new(0.0, 0.0),
            Point2::new(6.0, 0.0),
            Point2::new(6.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(3.0, 4.0),
            Point2::new(2.0, 6.0),
            Point2::new(0.0, 6.0),
        ]))
        .into();
        let mapping = RegularMapping::new(Point2::new(-0.5, -0.5), Vector2::new(0.5, 0.5)).unwrap();
        let grid = Grid::new(16, 16);
        let mut inside = PointCollector::new();
        GridClassifier::new(&shape)
            .add_points(&grid, &mapping, RoiRelativePosition::Inside, &mut inside)
            .unwrap();
        let inside = inside.sorted();
        for row in 0..grid.rows {
            for column in 0..grid.columns {
                let p = mapping.point_at(row, column);
                let classified = inside.binary_search(&(row, column)).is_ok();
                assert_eq!(classified, shape.contains(&p), "at {p:?}");
            }
        }
    }

    #[test]
    fn upper_bounds_are_conservative() {
        let grid = Grid::new(10, 10);
        let mapping = unit_cells();
        for shape in [hole_shape(), square(2.0, 8.0), square(4.5, 4.5), Region::default().into()] {
            let classifier = GridClassifier::new(&shape);
            let mut d = DivisionCollector::default();
            classifier
                .divide_points(&grid, &mapping, &grid.full_window().unwrap(), &mut d)
                .unwrap();
            assert!(classifier.points_inside_count_upper_bound(&grid, &mapping) >= d.inside.len());
            assert!(classifier.points_outside_count_upper_bound(&grid) >= d.outside.len());
            assert_eq!(d.inside.len() + d.outside.len(), grid.point_count());
        }
    }

    #[test]
    fn upper_bound_uses_bounding_box() {
        let grid = Grid::new(100, 100);
        let classifier = GridClassifier::new(&square(10.0, 20.0));
        let bound =
            classifier.point_count_upper_bound(&grid, &unit_cells(), RoiRelativePosition::Inside);
        assert!(bound >= 100);
        assert!(bound < grid.point_count() / 4);
        assert_eq!(
            classifier.point_count_upper_bound(
                &grid,
                &unit_cells(),
                RoiRelativePosition::Everything
            ),
            10_000
        );
    }

    #[test]
    fn divide_points_covers_window_once() {
        let grid = Grid::new(10, 10);
        let window = GridWindow::new(2, 5, 1, 8);
        let mut d = DivisionCollector::default();
        GridClassifier::new(&hole_shape())
            .divide_points(&grid, &unit_cells(), &window, &mut d)
            .unwrap();
        let mut all = d.inside.sorted();
        all.extend(d.outside.sorted());
        all.sort_unstable();
        let expected: Vec<_> = (2..=5).flat_map(|r| (1..=8).map(move |c| (r, c))).collect();
        assert_eq!(all, expected);
        // Rows 3..=5, columns 3..=6 fall in the hole.
        assert_eq!(d.outside.len(), 12);
    }

    #[test]
    fn custom_params_reject_invalid_flatness() {
        for flatness in [0.0, -0.5, f64::NAN] {
            let params = ScanParams::default().with_flatness(flatness);
            assert!(matches!(
                GridClassifier::with_params(&square(0.0, 1.0), &params),
                Err(crate::error::RoiError::Geometry(
                    crate::error::GeometryError::InvalidTolerance(_)
                ))
            ));
        }
        let params = ScanParams::default().with_flatness(0.01);
        assert!(GridClassifier::with_params(&square(0.0, 1.0), &params).is_ok());
    }

    #[test]
    fn malformed_boundary_emits_nothing() {
        let shape: Shape = Region::from_contour(Contour::from_points(&[
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, f64::NAN),
            Point2::new(0.0, 10.0),
        ]))
        .into();
        let mut counter = PointCounter::default();
        let result = GridClassifier::new(&shape).add_points(
            &Grid::new(10, 10),
            &unit_cells(),
            RoiRelativePosition::Inside,
            &mut counter,
        );
        assert!(result.is_err());
        assert_eq!(counter, PointCounter::default());
    }
}
