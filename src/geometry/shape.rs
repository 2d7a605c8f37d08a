use crate::math::polygon_2d::Aabb2;
use crate::math::Point2;
use crate::scan::{ScanParams, ScanShape};

use super::region::Region;

/// The planar point set covered by an ROI.
///
/// A `Difference` covers its minuend minus the union of its subtrahends; a
/// point on a subtrahend's boundary is not covered.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Region(Region),
    Difference {
        minuend: Box<Shape>,
        subtrahends: Vec<Shape>,
    },
}

impl Shape {
    /// `minuend − ∪ subtrahends`.
    #[must_use]
    pub fn difference(minuend: Shape, subtrahends: impl IntoIterator<Item = Shape>) -> Self {
        Self::Difference {
            minuend: Box::new(minuend),
            subtrahends: subtrahends.into_iter().collect(),
        }
    }

    /// Bounds of the covered set; a difference is bounded by its minuend.
    #[must_use]
    pub fn bounds(&self) -> Aabb2 {
        match self {
            Self::Region(region) => region.bounds(),
            Self::Difference { minuend, .. } => minuend.bounds(),
        }
    }

    /// A copy rotated by `angle` radians about `anchor`.
    #[must_use]
    pub fn rotated(&self, angle: f64, anchor: &Point2) -> Self {
        match self {
            Self::Region(region) => Self::Region(region.rotated(angle, anchor)),
            Self::Difference {
                minuend,
                subtrahends,
            } => Self::difference(
                minuend.rotated(angle, anchor),
                subtrahends.iter().map(|s| s.rotated(angle, anchor)),
            ),
        }
    }

    /// Every region referenced by the shape, minuend first.
    #[must_use]
    pub fn regions(&self) -> Vec<&Region> {
        match self {
            Self::Region(region) => vec![region],
            Self::Difference {
                minuend,
                subtrahends,
            } => {
                let mut out = minuend.regions();
                for s in subtrahends {
                    out.extend(s.regions());
                }
                out
            }
        }
    }

    /// Structural comparison within the geometric tolerance.
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Region(a), Self::Region(b)) => a.approx_eq(b),
            (
                Self::Difference {
                    minuend: ma,
                    subtrahends: sa,
                },
                Self::Difference {
                    minuend: mb,
                    subtrahends: sb,
                },
            ) => {
                ma.approx_eq(mb)
                    && sa.len() == sb.len()
                    && sa.iter().zip(sb).all(|(a, b)| a.approx_eq(b))
            }
            _ => false,
        }
    }

    /// Closed-region containment with default scan parameters.
    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        self.contains_with(p, &ScanParams::default())
    }

    /// Closed-region containment. A boundary that fails to close on the scan
    /// line through `p`, or an invalid flatness, contains nothing.
    #[must_use]
    pub fn contains_with(&self, p: &Point2, params: &ScanParams) -> bool {
        params.validate().is_ok()
            && ScanShape::compile(self, params.flatness)
                .contains(p)
                .unwrap_or(false)
    }
}

impl From<Region> for Shape {
    fn from(region: Region) -> Self {
        Self::Region(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::contour::{Contour, ContourVertex};

    fn square(min: f64, max: f64) -> Shape {
        Region::rectangle(Point2::new(min, min), Point2::new(max, max)).into()
    }

    #[test]
    fn square_contains_interior_and_boundary() {
        let s = square(0.0, 10.0);
        assert!(s.contains(&Point2::new(5.0, 5.0)));
        assert!(s.contains(&Point2::new(0.0, 3.0)));
        assert!(s.contains(&Point2::new(10.0, 10.0)));
        assert!(s.contains(&Point2::new(4.0, 10.0)));
        assert!(!s.contains(&Point2::new(10.5, 5.0)));
        assert!(!s.contains(&Point2::new(5.0, -0.01)));
    }

    #[test]
    fn hole_by_reversed_contour() {
        let mut region = Region::rectangle(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        region.push(Contour::rectangle(Point2::new(3.0, 3.0), Point2::new(7.0, 7.0)).reversed());
        let s = Shape::Region(region);
        assert!(s.contains(&Point2::new(1.0, 5.0)));
        assert!(!s.contains(&Point2::new(5.0, 5.0)));
        // The hole's rim is still boundary of the region.
        assert!(s.contains(&Point2::new(3.0, 5.0)));
    }

    #[test]
    fn difference_excludes_subtrahend_boundary() {
        let s = Shape::difference(square(0.0, 10.0), [square(3.0, 7.0)]);
        for &(x, y) in &[(1.0, 1.0), (5.0, 5.0), (3.0, 5.0), (7.0, 7.0), (8.0, 5.0), (11.0, 5.0)] {
            let p = Point2::new(x, y);
            let expected = square(0.0, 10.0).contains(&p) && !square(3.0, 7.0).contains(&p);
            assert_eq!(s.contains(&p), expected, "at ({x}, {y})");
        }
    }

    #[test]
    fn circle_contains_by_flattened_arcs() {
        let circle: Shape = Region::from_contour(Contour::new(vec![
            ContourVertex::new(-1.0, 0.0, 1.0),
            ContourVertex::new(1.0, 0.0, 1.0),
        ]))
        .into();
        assert!(circle.contains(&Point2::new(0.0, 0.99)));
        assert!(circle.contains(&Point2::new(0.0, -0.99)));
        assert!(!circle.contains(&Point2::new(0.8, 0.8)));
    }

    #[test]
    fn invalid_flatness_contains_nothing() {
        let s = square(0.0, 10.0);
        let p = Point2::new(5.0, 5.0);
        assert!(s.contains_with(&p, &ScanParams::default().with_flatness(0.1)));
        assert!(!s.contains_with(&p, &ScanParams::default().with_flatness(0.0)));
        assert!(!s.contains_with(&p, &ScanParams::default().with_flatness(f64::NAN)));
    }

    #[test]
    fn rotation_keeps_structure() {
        let s = Shape::difference(square(0.0, 4.0), [square(1.0, 2.0)]);
        let r = s.rotated(0.0, &Point2::new(1.0, 1.0));
        assert!(r.approx_eq(&s));
        assert_eq!(r.regions().len(), 2);
        assert!(!r.approx_eq(&square(0.0, 4.0)));
    }

    #[test]
    fn difference_bounds_follow_minuend() {
        let s = Shape::difference(square(0.0, 4.0), [square(-10.0, 10.0)]);
        assert_eq!(s.bounds(), square(0.0, 4.0).bounds());
    }
}
