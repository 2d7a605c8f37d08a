use nalgebra::Matrix2;

use crate::error::Result;
use crate::geometry::Shape;
use crate::scan::{ScanParams, ScanShape};

/// Upper limit on scan lines sampled by [`ComputeShapeFactors`].
pub const MAX_SHAPE_FACTOR_LINES: usize = 1 << 16;

/// Size and form descriptors of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeFactors {
    pub area: f64,
    /// Summed length of every boundary, including cut-out ones.
    pub perimeter: f64,
    /// Ratio of the principal axes of the area's second moments; `1.0` for a
    /// disc or square.
    pub elongation: f64,
}

/// Computes [`ShapeFactors`] by integrating along horizontal scan lines.
///
/// Lines are spaced by the flatness tolerance and sampled at strip midpoints.
pub struct ComputeShapeFactors<'a> {
    shape: &'a Shape,
    flatness: f64,
}

impl<'a> ComputeShapeFactors<'a> {
    /// Creates a new query with the default flatness.
    #[must_use]
    pub fn new(shape: &'a Shape) -> Self {
        Self {
            shape,
            flatness: ScanParams::default().flatness,
        }
    }

    /// Sets the flatness tolerance; it also spaces the scan lines.
    #[must_use]
    pub fn with_flatness(mut self, flatness: f64) -> Self {
        self.flatness = flatness;
        self
    }

    /// Integrates the shape's moments and measures its boundaries.
    ///
    /// # Errors
    ///
    /// [`crate::error::GeometryError::InvalidTolerance`] for a flatness that
    /// is not positive and finite, and
    /// [`crate::error::GeometryError::MalformedBoundary`] for an open boundary.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn execute(&self) -> Result<ShapeFactors> {
        ScanParams::default().with_flatness(self.flatness).validate()?;
        let perimeter = self
            .shape
            .regions()
            .iter()
            .map(|r| r.perimeter(self.flatness))
            .sum();

        let scan = ScanShape::compile(self.shape, self.flatness);
        let bounds = scan.bounds();
        if bounds.is_empty() {
            return Ok(ShapeFactors {
                area: 0.0,
                perimeter,
                elongation: 1.0,
            });
        }

        let height = bounds.max.y - bounds.min.y;
        let lines =
            ((height / self.flatness).ceil() as usize).clamp(1, MAX_SHAPE_FACTOR_LINES);
        let dy = height / lines as f64;

        let mut m = Moments::default();
        for i in 0..lines {
            let y = bounds.min.y + (i as f64 + 0.5) * dy;
            for span in scan.fill_spans(y)? {
                m.add_strip(span.start, span.end, y, dy);
            }
        }

        if m.m0 <= 0.0 {
            return Ok(ShapeFactors {
                area: 0.0,
                perimeter,
                elongation: f64::INFINITY,
            });
        }
        Ok(ShapeFactors {
            area: m.m0,
            perimeter,
            elongation: m.elongation(),
        })
    }
}

/// Raw area moments up to second order.
#[derive(Debug, Default)]
struct Moments {
    m0: f64,
    mx: f64,
    my: f64,
    mxx: f64,
    myy: f64,
    mxy: f64,
}

impl Moments {
    /// Adds the rectangle `[a, b] × [y - dy/2, y + dy/2]`.
    fn add_strip(&mut self, a: f64, b: f64, y: f64, dy: f64) {
        let w = b - a;
        let sx = (b * b - a * a) / 2.0;
        self.m0 += w * dy;
        self.mx += sx * dy;
        self.my += w * y * dy;
        self.mxx += (b * b * b - a * a * a) / 3.0 * dy;
        self.myy += w * (y * y * dy + dy * dy * dy / 12.0);
        self.mxy += sx * y * dy;
    }

    fn elongation(&self) -> f64 {
        let cx = self.mx / self.m0;
        let cy = self.my / self.m0;
        let cxx = self.mxx / self.m0 - cx * cx;
        let cyy = self.myy / self.m0 - cy * cy;
        let cxy = self.mxy / self.m0 - cx * cy;
        let eigen = Matrix2::new(cxx, cxy, cxy, cyy).symmetric_eigen();
        let major = eigen.eigenvalues.max();
        let minor = eigen.eigenvalues.min();
        if minor <= major * f64::EPSILON {
            f64::INFINITY
        } else {
            (major / minor).sqrt()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;
    use crate::error::{GeometryError, RoiError};
    use crate::geometry::{Contour, ContourVertex, Region};
    use crate::math::Point2;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
        Region::rectangle(Point2::new(x0, y0), Point2::new(x1, y1)).into()
    }

    #[test]
    fn rectangle_factors() {
        let shape = rect(0.0, 0.0, 4.0, 2.0);
        let f = ComputeShapeFactors::new(&shape).execute().unwrap();
        assert_relative_eq!(f.area, 8.0, epsilon = 1e-9);
        assert_relative_eq!(f.perimeter, 12.0, epsilon = 1e-9);
        assert_relative_eq!(f.elongation, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn disc_from_bulges() {
        let circle = Contour::new(vec![
            ContourVertex::new(-1.0, 0.0, 1.0),
            ContourVertex::new(1.0, 0.0, 1.0),
        ]);
        let shape: Shape = Region::from_contour(circle).into();
        let f = ComputeShapeFactors::new(&shape).execute().unwrap();
        assert_relative_eq!(f.area, PI, epsilon = 1e-2);
        assert_relative_eq!(f.perimeter, 2.0 * PI, epsilon = 1e-2);
        assert_relative_eq!(f.elongation, 1.0, epsilon = 1e-2);
    }

    #[test]
    fn hole_is_excluded_from_area_but_counts_in_perimeter() {
        let shape = Shape::difference(rect(0.0, 0.0, 10.0, 10.0), [rect(3.0, 3.0, 7.0, 7.0)]);
        let f = ComputeShapeFactors::new(&shape)
            .with_flatness(0.01)
            .execute()
            .unwrap();
        assert_relative_eq!(f.area, 84.0, epsilon = 1e-6);
        assert_relative_eq!(f.perimeter, 56.0, epsilon = 1e-9);
        assert_relative_eq!(f.elongation, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn empty_shape() {
        let shape: Shape = Region::default().into();
        let f = ComputeShapeFactors::new(&shape).execute().unwrap();
        assert_eq!(f.area, 0.0);
        assert_eq!(f.perimeter, 0.0);
        assert_eq!(f.elongation, 1.0);
    }

    #[test]
    fn zero_width_shape_is_infinitely_elongated() {
        let sliver: Shape = Region::from_contour(Contour::from_points(&[
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ]))
        .into();
        let f = ComputeShapeFactors::new(&sliver).execute().unwrap();
        assert_eq!(f.area, 0.0);
        assert!(f.elongation.is_infinite());
    }

    #[test]
    fn non_positive_flatness_is_rejected() {
        let shape = rect(0.0, 0.0, 1.0, 1.0);
        for flatness in [0.0, -1.0, f64::NAN] {
            let err = ComputeShapeFactors::new(&shape)
                .with_flatness(flatness)
                .execute()
                .unwrap_err();
            assert!(matches!(err, RoiError::Geometry(GeometryError::InvalidTolerance(_))));
        }
    }
}
