pub mod arc_2d;
pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 2D rotation type.
pub type Rotation2 = nalgebra::Rotation2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Rotates `point` counter-clockwise by `angle` radians about `anchor`.
#[must_use]
pub fn rotate_about(point: &Point2, angle: f64, anchor: &Point2) -> Point2 {
    anchor + Rotation2::new(angle) * (point - anchor)
}

/// Returns `true` if both points agree within [`TOLERANCE`] on each axis.
#[must_use]
pub fn points_approx_eq(a: &Point2, b: &Point2) -> bool {
    (a.x - b.x).abs() <= TOLERANCE && (a.y - b.y).abs() <= TOLERANCE
}
