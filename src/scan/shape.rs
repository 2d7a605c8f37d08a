use std::ops::Range;

use crate::error::Result;
use crate::geometry::{Region, Shape};
use crate::grid::{index_span, GridMapping};
use crate::math::polygon_2d::Aabb2;
use crate::math::Point2;

use super::crossing::{sort_crossings, Crossing, Direction};
use super::spans;
use super::winding::{inside_intervals, resolve_winding};

/// Flattened straight edges of one region, ready for horizontal scanning.
#[derive(Debug, Clone)]
pub(crate) struct EdgeTable {
    edges: Vec<(Point2, Point2)>,
    bounds: Aabb2,
}

/// Crossings and on-boundary intervals of one scan line.
struct ScanLine {
    crossings: Vec<Crossing>,
    touches: Vec<(f64, f64)>,
}

impl EdgeTable {
    pub(crate) fn new(region: &Region, flatness: f64) -> Self {
        let mut edges = Vec::new();
        let mut bounds = Aabb2::empty();
        for contour in region.contours() {
            let ring = contour.flatten(flatness);
            let n = ring.len();
            for (i, p) in ring.iter().enumerate() {
                bounds.include(p);
                edges.push((*p, ring[(i + 1) % n]));
            }
        }
        Self { edges, bounds }
    }

    /// Intersects every edge with the horizontal line at `y`.
    ///
    /// An edge crosses when `y` lies in its half-open vertical extent, so a
    /// vertex shared by two edges is counted once. Horizontal edges, vertices
    /// and crossing points on the line are also reported as touches so the
    /// closed region keeps its boundary.
    fn scan(&self, y: f64) -> ScanLine {
        let mut line = ScanLine {
            crossings: Vec::new(),
            touches: Vec::new(),
        };
        if !self.bounds.spans_y(y) {
            return line;
        }
        for (a, b) in &self.edges {
            if a.y == y {
                if b.y == y {
                    line.touches.push((a.x.min(b.x), a.x.max(b.x)));
                } else {
                    line.touches.push((a.x, a.x));
                }
            }
            let (lo, hi) = if a.y < b.y { (a, b) } else { (b, a) };
            if lo.y <= y && y < hi.y {
                let x = a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y);
                let direction = if b.y > a.y {
                    Direction::Upward
                } else {
                    Direction::Downward
                };
                line.crossings.push(Crossing::new(x, direction));
                line.touches.push((x, x));
            }
        }
        sort_crossings(&mut line.crossings);
        line
    }

    /// Closed inside intervals on the line at `y`, boundary included.
    fn closed_intervals(&self, y: f64) -> Result<Vec<(f64, f64)>> {
        let line = self.scan(y);
        let toggles = resolve_winding(&line.crossings, y)?;
        let mut intervals = inside_intervals(&toggles);
        intervals.extend(line.touches);
        intervals.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut merged: Vec<(f64, f64)> = Vec::with_capacity(intervals.len());
        for (lo, hi) in intervals {
            match merged.last_mut() {
                Some(last) if lo <= last.1 => last.1 = last.1.max(hi),
                _ => merged.push((lo, hi)),
            }
        }
        Ok(merged)
    }

    /// Interior intervals on the line at `y` as half-open spans.
    fn fill_spans(&self, y: f64) -> Result<Vec<Range<f64>>> {
        let line = self.scan(y);
        let toggles = resolve_winding(&line.crossings, y)?;
        Ok(inside_intervals(&toggles)
            .into_iter()
            .map(|(lo, hi)| lo..hi)
            .filter(|s| s.start < s.end)
            .collect())
    }
}

/// A [`Shape`] compiled into edge tables at a fixed flatness.
#[derive(Debug, Clone)]
pub(crate) enum ScanShape {
    Region(EdgeTable),
    Difference {
        minuend: Box<ScanShape>,
        subtrahends: Vec<ScanShape>,
    },
}

impl ScanShape {
    pub(crate) fn compile(shape: &Shape, flatness: f64) -> Self {
        match shape {
            Shape::Region(region) => Self::Region(EdgeTable::new(region, flatness)),
            Shape::Difference {
                minuend,
                subtrahends,
            } => Self::Difference {
                minuend: Box::new(Self::compile(minuend, flatness)),
                subtrahends: subtrahends
                    .iter()
                    .map(|s| Self::compile(s, flatness))
                    .collect(),
            },
        }
    }

    /// Bounds of the flattened geometry that can be inside.
    pub(crate) fn bounds(&self) -> Aabb2 {
        match self {
            Self::Region(table) => table.bounds,
            Self::Difference { minuend, .. } => minuend.bounds(),
        }
    }

    pub(crate) fn contains(&self, p: &Point2) -> Result<bool> {
        match self {
            Self::Region(table) => Ok(table
                .closed_intervals(p.y)?
                .iter()
                .any(|&(lo, hi)| lo <= p.x && p.x <= hi)),
            Self::Difference {
                minuend,
                subtrahends,
            } => {
                if !minuend.contains(p)? {
                    return Ok(false);
                }
                for s in subtrahends {
                    if s.contains(p)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Inside column runs of the grid row lying on plane line `y`, restricted
    /// to `columns`. Runs are sorted, disjoint and non-empty.
    pub(crate) fn column_spans<M: GridMapping + ?Sized>(
        &self,
        y: f64,
        mapping: &M,
        columns: &Range<usize>,
    ) -> Result<Vec<Range<usize>>> {
        match self {
            Self::Region(table) => {
                let mut out: Vec<Range<usize>> = table
                    .closed_intervals(y)?
                    .into_iter()
                    .filter_map(|(lo, hi)| {
                        let a = mapping.column_at(lo);
                        let b = mapping.column_at(hi);
                        index_span(a.min(b), a.max(b), columns)
                    })
                    .collect();
                spans::normalize(&mut out);
                Ok(out)
            }
            Self::Difference {
                minuend,
                subtrahends,
            } => {
                let mut out = minuend.column_spans(y, mapping, columns)?;
                for s in subtrahends {
                    if out.is_empty() {
                        break;
                    }
                    let cut = s.column_spans(y, mapping, columns)?;
                    out = spans::subtract(&out, &cut);
                }
                Ok(out)
            }
        }
    }

    /// Interior of the shape on plane line `y` as half-open real spans.
    pub(crate) fn fill_spans(&self, y: f64) -> Result<Vec<Range<f64>>> {
        match self {
            Self::Region(table) => {
                let mut out = table.fill_spans(y)?;
                spans::normalize(&mut out);
                Ok(out)
            }
            Self::Difference {
                minuend,
                subtrahends,
            } => {
                let mut out = minuend.fill_spans(y)?;
                for s in subtrahends {
                    let cut = s.fill_spans(y)?;
                    out = spans::subtract(&out, &cut);
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Contour;
    use crate::grid::RegularMapping;
    use crate::math::Vector2;

    fn unit_mapping() -> RegularMapping {
        RegularMapping::new(Point2::origin(), Vector2::new(1.0, 1.0)).unwrap()
    }

    #[test]
    fn local_minimum_vertex_is_a_single_touch() {
        // A "V" whose tip sits exactly on y = 0.
        let region = Region::from_contour(Contour::from_points(&[
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(-2.0, 2.0),
        ]));
        let table = EdgeTable::new(&region, 1e-3);
        let line = table.scan(0.0);
        assert_eq!(line.crossings.len(), 2);
        assert!(table.fill_spans(0.0).unwrap().is_empty());
        assert_eq!(table.closed_intervals(0.0).unwrap(), vec![(0.0, 0.0)]);
    }

    #[test]
    fn column_spans_of_rectangle() {
        let shape = ScanShape::compile(
            &Region::rectangle(Point2::new(1.5, 0.0), Point2::new(4.0, 3.0)).into(),
            1e-3,
        );
        let spans = shape.column_spans(1.0, &unit_mapping(), &(0..10)).unwrap();
        assert_eq!(spans, vec![2..5]);
        let clipped = shape.column_spans(1.0, &unit_mapping(), &(3..4)).unwrap();
        assert_eq!(clipped, vec![3..4]);
        assert!(shape.column_spans(5.0, &unit_mapping(), &(0..10)).unwrap().is_empty());
    }

    #[test]
    fn difference_spans_drop_closed_cut() {
        let shape = ScanShape::compile(
            &Shape::difference(
                Region::rectangle(Point2::new(0.0, 0.0), Point2::new(9.0, 9.0)).into(),
                [Region::rectangle(Point2::new(3.0, 3.0), Point2::new(5.0, 5.0)).into()],
            ),
            1e-3,
        );
        let spans = shape.column_spans(4.0, &unit_mapping(), &(0..10)).unwrap();
        assert_eq!(spans, vec![0..3, 6..10]);
    }

    #[test]
    fn non_finite_vertex_is_malformed() {
        let region = Region::from_contour(Contour::from_points(&[
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, f64::NAN),
            Point2::new(0.0, 10.0),
        ]));
        let shape = ScanShape::compile(&region.into(), 1e-3);
        assert!(shape.column_spans(5.0, &unit_mapping(), &(0..20)).is_err());
        assert!(shape.contains(&Point2::new(1.0, 5.0)).is_err());
    }

    #[test]
    fn fill_spans_of_square_with_hole() {
        let mut region = Region::rectangle(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        region.push(Contour::rectangle(Point2::new(3.0, 3.0), Point2::new(7.0, 7.0)).reversed());
        let shape = ScanShape::compile(&region.into(), 1e-3);
        assert_eq!(shape.fill_spans(5.0).unwrap(), vec![0.0..3.0, 7.0..10.0]);
        assert_eq!(shape.fill_spans(1.0).unwrap(), vec![0.0..10.0]);
    }
}
