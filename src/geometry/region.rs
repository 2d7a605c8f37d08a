use crate::math::polygon_2d::Aabb2;
use crate::math::Point2;

use super::contour::Contour;

/// A planar region bounded by closed contours under the non-zero winding rule.
///
/// Holes are contours oriented opposite to their enclosing contour.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Region {
    contours: Vec<Contour>,
}

impl Region {
    /// A region bounded by `contours`.
    #[must_use]
    pub fn new(contours: Vec<Contour>) -> Self {
        Self { contours }
    }

    /// A region with a single boundary.
    #[must_use]
    pub fn from_contour(contour: Contour) -> Self {
        Self {
            contours: vec![contour],
        }
    }

    /// Axis-aligned rectangle spanning two corners.
    #[must_use]
    pub fn rectangle(a: Point2, b: Point2) -> Self {
        Self::from_contour(Contour::rectangle(a, b))
    }

    /// Boundaries in insertion order.
    #[must_use]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Adds a boundary. A reversed contour cuts a hole.
    pub fn push(&mut self, contour: Contour) {
        self.contours.push(contour);
    }

    /// `true` when there is no boundary vertex at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contours.iter().all(Contour::is_empty)
    }

    /// Bounds of every flattened boundary.
    #[must_use]
    pub fn bounds(&self) -> Aabb2 {
        self.contours
            .iter()
            .fold(Aabb2::empty(), |acc, c| acc.union(&c.bounds()))
    }

    /// A copy rotated by `angle` radians about `anchor`.
    #[must_use]
    pub fn rotated(&self, angle: f64, anchor: &Point2) -> Self {
        Self {
            contours: self.contours.iter().map(|c| c.rotated(angle, anchor)).collect(),
        }
    }

    /// Total flattened boundary length.
    #[must_use]
    pub fn perimeter(&self, tolerance: f64) -> f64 {
        self.contours.iter().map(|c| c.perimeter(tolerance)).sum()
    }

    /// Contour-wise comparison within [`crate::math::TOLERANCE`].
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.contours.len() == other.contours.len()
            && self
                .contours
                .iter()
                .zip(&other.contours)
                .all(|(a, b)| a.approx_eq(b))
    }
}

impl From<Contour> for Region {
    fn from(contour: Contour) -> Self {
        Self::from_contour(contour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_union_of_contours() {
        let mut region = Region::rectangle(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        region.push(Contour::rectangle(Point2::new(5.0, -2.0), Point2::new(6.0, 0.5)));
        let b = region.bounds();
        assert_eq!(b.min, Point2::new(0.0, -2.0));
        assert_eq!(b.max, Point2::new(6.0, 1.0));
    }

    #[test]
    fn empty_region() {
        assert!(Region::default().is_empty());
        assert!(Region::default().bounds().is_empty());
        assert!(!Region::rectangle(Point2::origin(), Point2::new(1.0, 1.0)).is_empty());
    }

    #[test]
    fn approx_eq_requires_matching_contours() {
        let a = Region::rectangle(Point2::origin(), Point2::new(2.0, 2.0));
        let b = Region::rectangle(Point2::origin(), Point2::new(2.0, 2.0 + 1e-12));
        let c = Region::rectangle(Point2::origin(), Point2::new(2.0, 3.0));
        assert!(a.approx_eq(&b));
        assert!(!a.approx_eq(&c));
        assert!(!a.approx_eq(&Region::default()));
    }

    #[test]
    fn perimeter_sums_contours() {
        let mut region = Region::rectangle(Point2::origin(), Point2::new(10.0, 10.0));
        region.push(Contour::rectangle(Point2::new(3.0, 3.0), Point2::new(7.0, 7.0)).reversed());
        assert!((region.perimeter(0.01) - 56.0).abs() < 1e-9);
    }
}
