//! The red string curve.
//!
//! Each connection renders as a quadratic Bézier whose control point
//! hangs perpendicular to the chord. The offset is a pure function of
//! the two endpoints (a sine over the coordinate sum picks the bow's
//! side and phase), so redrawing an unmoved string reproduces it
//! exactly. Random sag would shimmer during the drag-driven redraw loop.

use kurbo::{Point, QuadBez};

/// Bow magnitude: 8% of the chord length, capped.
const CURVE_SCALE: f64 = 0.08;
const CURVE_MAX: f64 = 25.0;
/// Phase applied to the coordinate sum when picking the bow side.
const CURVE_PHASE: f64 = 0.01;

/// Deterministic string curve between two resolved endpoints.
pub fn string_path(p1: Point, p2: Point) -> QuadBez {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let len = (dx * dx + dy * dy).sqrt();
    let amount = (len * CURVE_SCALE).min(CURVE_MAX);

    let angle = dy.atan2(dx);
    let perp = angle + std::f64::consts::FRAC_PI_2;
    let offset = ((p1.x + p1.y + p2.x + p2.y) * CURVE_PHASE).sin() * amount;

    let mid = Point::new((p1.x + p2.x) / 2.0, (p1.y + p2.y) / 2.0);
    let ctrl = Point::new(mid.x + perp.cos() * offset, mid.y + perp.sin() * offset);
    QuadBez::new(p1, ctrl, p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_endpoints_give_identical_curves() {
        let a = Point::new(200.0, 100.0);
        let b = Point::new(640.0, 480.0);
        let first = string_path(a, b);
        for _ in 0..10 {
            let again = string_path(a, b);
            assert_eq!(first.p1, again.p1);
        }
    }

    #[test]
    fn control_point_offset_is_perpendicular_to_the_chord() {
        let a = Point::new(120.0, 90.0);
        let b = Point::new(500.0, 310.0);
        let curve = string_path(a, b);

        let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        let chord = (b.x - a.x, b.y - a.y);
        let lift = (curve.p1.x - mid.x, curve.p1.y - mid.y);
        let dot = chord.0 * lift.0 + chord.1 * lift.1;
        assert!(dot.abs() < 1e-6, "offset not perpendicular: dot = {dot}");
    }

    #[test]
    fn bow_is_capped_for_long_strings() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(4000.0, 0.0);
        let curve = string_path(a, b);
        let mid_y = 0.0;
        assert!((curve.p1.y - mid_y).abs() <= CURVE_MAX + 1e-9);
    }

    #[test]
    fn short_strings_bow_proportionally() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 0.0);
        let curve = string_path(a, b);
        // 8% of 100 = 8, scaled by |sin(1.0)|
        let expected = 100.0 * CURVE_SCALE * (1.0_f64).sin();
        assert!((curve.p1.y.abs() - expected.abs()).abs() < 1e-9);
    }

    #[test]
    fn endpoints_are_preserved() {
        let a = Point::new(33.0, 44.0);
        let b = Point::new(55.0, 66.0);
        let curve = string_path(a, b);
        assert_eq!(curve.p0, a);
        assert_eq!(curve.p2, b);
    }
}
