use crate::math::arc_2d::{arc_from_bulge, arc_subdivision_count};
use crate::math::polygon_2d::{ring_length, signed_area, Aabb2};
use crate::math::{points_approx_eq, rotate_about, Point2, Vector2, TOLERANCE};

/// Bulge-encoded boundary vertex.
///
/// `bulge = tan(sweep_angle / 4)` describes the segment to the next vertex:
/// `0` is a straight line, `> 0` a counter-clockwise arc, `< 0` a clockwise arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourVertex {
    pub point: Point2,
    pub bulge: f64,
}

impl ContourVertex {
    /// Creates a new vertex with the given position and bulge.
    #[must_use]
    pub fn new(x: f64, y: f64, bulge: f64) -> Self {
        Self {
            point: Point2::new(x, y),
            bulge,
        }
    }

    /// Creates a line vertex (bulge = 0).
    #[must_use]
    pub fn line(point: Point2) -> Self {
        Self { point, bulge: 0.0 }
    }
}

/// A closed boundary loop. The last vertex connects back to the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    vertices: Vec<ContourVertex>,
}

impl Contour {
    /// A closed contour through `vertices`.
    #[must_use]
    pub fn new(vertices: Vec<ContourVertex>) -> Self {
        Self { vertices }
    }

    /// Creates a straight-edged contour through `points`.
    #[must_use]
    pub fn from_points(points: &[Point2]) -> Self {
        Self {
            vertices: points.iter().copied().map(ContourVertex::line).collect(),
        }
    }

    /// Counter-clockwise rectangle spanning two corners.
    #[must_use]
    pub fn rectangle(a: Point2, b: Point2) -> Self {
        let bounds = Aabb2::from_corners(a, b);
        Self::from_points(&[
            bounds.min,
            Point2::new(bounds.max.x, bounds.min.y),
            bounds.max,
            Point2::new(bounds.min.x, bounds.max.y),
        ])
    }

    /// Vertices in boundary order.
    #[must_use]
    pub fn vertices(&self) -> &[ContourVertex] {
        &self.vertices
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the contour has no vertex.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Approximates the contour by a closed ring of points.
    ///
    /// `tolerance` bounds the deviation between each arc and its chords. The
    /// ring does not repeat its first point.
    #[must_use]
    pub fn flatten(&self, tolerance: f64) -> Vec<Point2> {
        let n = self.vertices.len();
        let mut ring = Vec::with_capacity(n * 2);
        for (i, v0) in self.vertices.iter().enumerate() {
            ring.push(v0.point);
            let v1 = &self.vertices[(i + 1) % n];
            let Some(arc) = arc_from_bulge(&v0.point, &v1.point, v0.bulge) else {
                continue;
            };
            let n_sub = arc_subdivision_count(arc.radius, arc.sweep.abs(), tolerance);
            for j in 1..n_sub {
                ring.push(arc.point_at(f64::from(j) / f64::from(n_sub)));
            }
        }
        ring
    }

    /// Returns the contour traversed in the opposite direction.
    ///
    /// The segment `v[i] → v[i+1]` with bulge `b` becomes `v[i+1] → v[i]` with bulge `-b`.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let m = self.vertices.len();
        let vertices = (0..m)
            .map(|j| {
                let point = self.vertices[m - 1 - j].point;
                // New vertex j starts the reverse of original segment (m-2-j), wrapping
                // to the closing segment for the last vertex.
                let source = (2 * m - 2 - j) % m;
                ContourVertex {
                    point,
                    bulge: -self.vertices[source].bulge,
                }
            })
            .collect();
        Self { vertices }
    }

    /// Rotates every vertex counter-clockwise by `angle` radians about `anchor`.
    ///
    /// Bulges are invariant under rotation.
    #[must_use]
    pub fn rotated(&self, angle: f64, anchor: &Point2) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|v| ContourVertex {
                    point: rotate_about(&v.point, angle, anchor),
                    bulge: v.bulge,
                })
                .collect(),
        }
    }

    /// Conservative bounds: arc segments contribute their full circle box.
    #[must_use]
    pub fn bounds(&self) -> Aabb2 {
        let n = self.vertices.len();
        let mut bounds = Aabb2::empty();
        for (i, v) in self.vertices.iter().enumerate() {
            bounds.include(&v.point);
            let next = &self.vertices[(i + 1) % n];
            if let Some(arc) = arc_from_bulge(&v.point, &next.point, v.bulge) {
                let r = Vector2::new(arc.radius, arc.radius);
                bounds.include(&(arc.center - r));
                bounds.include(&(arc.center + r));
            }
        }
        bounds
    }

    /// Signed area of the flattened contour; positive when counter-clockwise.
    #[must_use]
    pub fn signed_area(&self, tolerance: f64) -> f64 {
        signed_area(&self.flatten(tolerance))
    }

    /// Length of the flattened contour.
    #[must_use]
    pub fn perimeter(&self, tolerance: f64) -> f64 {
        ring_length(&self.flatten(tolerance))
    }

    /// Vertex-wise comparison within [`TOLERANCE`].
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.vertices.len() == other.vertices.len()
            && self
                .vertices
                .iter()
                .zip(&other.vertices)
                .all(|(a, b)| {
                    points_approx_eq(&a.point, &b.point) && (a.bulge - b.bulge).abs() <= TOLERANCE
                })
    }
}
