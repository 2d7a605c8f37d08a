/// 2D arc/bulge math utilities.
///
/// Bulge convention: `bulge = tan(sweep_angle / 4)`.
/// - `bulge = 0`: straight line
/// - `bulge > 0`: counter-clockwise arc
/// - `bulge < 0`: clockwise arc
/// - `|bulge| = 1`: semicircle
use std::f64::consts::PI;

use super::Point2;

/// A circular arc in center-radius-angle form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParams {
    pub center: Point2,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep: f64,
}

impl ArcParams {
    /// Evaluates the arc at parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        let angle = self.start_angle + self.sweep * t;
        Point2::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }
}

/// Converts a bulge-defined arc segment from `p0` to `p1` to center-radius-angle form.
///
/// Returns `None` for a zero-length chord or a zero bulge (straight segment).
#[must_use]
pub fn arc_from_bulge(p0: &Point2, p1: &Point2, bulge: f64) -> Option<ArcParams> {
    let dx = p1.x - p0.x;
    let dy = p1.y - p0.y;
    let chord_len = (dx * dx + dy * dy).sqrt();

    if chord_len < 1e-12 || bulge.abs() < 1e-12 {
        return None;
    }

    // Distance from chord midpoint to center, in half-chord units.
    let sagitta_ratio = (1.0 - bulge * bulge) / (2.0 * bulge);
    let mx = (p0.x + p1.x) * 0.5;
    let my = (p0.y + p1.y) * 0.5;

    // Unit normal to the chord, left side.
    let nx = -dy / chord_len;
    let ny = dx / chord_len;

    let center = Point2::new(
        mx + sagitta_ratio * (chord_len * 0.5) * nx,
        my + sagitta_ratio * (chord_len * 0.5) * ny,
    );

    // r = d*(1+b²)/(4*|b|)
    let radius = (chord_len * 0.5) * (1.0 + bulge * bulge) / (2.0 * bulge.abs());
    let start_angle = (p0.y - center.y).atan2(p0.x - center.x);

    let sweep = 4.0 * bulge.atan();
    let sweep = sweep.clamp(-2.0 * PI, 2.0 * PI);

    Some(ArcParams {
        center,
        radius,
        start_angle,
        sweep,
    })
}

/// Computes the number of line segments needed to approximate an arc
/// within the given flatness tolerance.
#[must_use]
pub fn arc_subdivision_count(radius: f64, abs_sweep: f64, tolerance: f64) -> u32 {
    if radius < 1e-12 || abs_sweep < 1e-12 || tolerance <= 0.0 {
        return 1;
    }
    // sagitta = r * (1 - cos(θ/2))  =>  θ = 2 * acos(1 - tolerance/r)
    let max_angle = if tolerance >= radius {
        PI
    } else {
        2.0 * (1.0 - tolerance / radius).acos()
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (abs_sweep / max_angle).ceil().min(f64::from(u16::MAX)) as u32;
    n.max(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn semicircle_from_unit_bulge() {
        let arc = arc_from_bulge(&Point2::new(0.0, 0.0), &Point2::new(2.0, 0.0), 1.0).unwrap();
        assert_relative_eq!(arc.center.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(arc.center.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(arc.radius, 1.0, epsilon = 1e-12);
        assert_relative_eq!(arc.sweep, PI, epsilon = 1e-12);
        let end = arc.point_at(1.0);
        assert_relative_eq!(end.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(end.y, 0.0, epsilon = 1e-12);
        // Counter-clockwise from (0,0) to (2,0) passes below the chord.
        assert_relative_eq!(arc.point_at(0.5).y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn straight_segment_has_no_arc() {
        assert!(arc_from_bulge(&Point2::new(0.0, 0.0), &Point2::new(1.0, 0.0), 0.0).is_none());
        assert!(arc_from_bulge(&Point2::new(1.0, 1.0), &Point2::new(1.0, 1.0), 0.5).is_none());
    }

    #[test]
    fn subdivision_count_large_tolerance() {
        assert_eq!(arc_subdivision_count(1.0, PI, 10.0), 1);
    }

    #[test]
    fn subdivision_count_small_tolerance() {
        let n = arc_subdivision_count(1.0, PI, 0.001);
        assert!(n > 10, "expected many subdivisions, got {n}");
    }
}
