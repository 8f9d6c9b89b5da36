//! Shared stroke geometry
//!
//! Width math shared between raster rendering (tiny-skia) and SVG export.

use crate::domain::{StrokeGroup, StrokePoint};

/// Pressure assumed for samples from devices that report none
pub const DEFAULT_PRESSURE: f32 = 0.5;

/// Line width for a pressure value between the group's min and max width
#[inline]
pub fn width_for_pressure(group: &StrokeGroup, pressure: f32) -> f32 {
    let (lo, hi) = ordered(group.min_width, group.max_width);
    lo + (hi - lo) * pressure.clamp(0.0, 1.0)
}

/// Width of the segment between two consecutive samples
#[inline]
pub fn segment_width(group: &StrokeGroup, from: &StrokePoint, to: &StrokePoint) -> f32 {
    let p0 = from.pressure.unwrap_or(DEFAULT_PRESSURE);
    let p1 = to.pressure.unwrap_or(DEFAULT_PRESSURE);
    width_for_pressure(group, (p0 + p1) * 0.5)
}

/// Average width over a whole stroke
pub fn mean_width(group: &StrokeGroup) -> f32 {
    let segments = group.points.windows(2);
    let count = segments.len();
    if count == 0 {
        return dot_radius(group);
    }
    let total: f32 = segments.map(|w| segment_width(group, &w[0], &w[1])).sum();
    total / count as f32
}

/// Radius of a single-sample dot
#[inline]
pub fn dot_radius(group: &StrokeGroup) -> f32 {
    if group.dot_size > 0.0 {
        group.dot_size
    } else {
        (group.min_width + group.max_width) * 0.5
    }
}

#[inline]
fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SignatureOptions;

    fn group(points: Vec<StrokePoint>) -> StrokeGroup {
        StrokeGroup::from_points(&SignatureOptions::default(), points)
    }

    #[test]
    fn test_default_pressure_uses_mid_width() {
        let g = group(vec![StrokePoint::new(0.0, 0.0, 0), StrokePoint::new(1.0, 0.0, 1)]);
        assert_eq!(segment_width(&g, &g.points[0], &g.points[1]), 1.5);
        assert_eq!(mean_width(&g), 1.5);
    }

    #[test]
    fn test_pressure_spans_min_to_max() {
        let g = group(vec![]);
        assert_eq!(width_for_pressure(&g, 0.0), 0.5);
        assert_eq!(width_for_pressure(&g, 1.0), 2.5);
        assert_eq!(width_for_pressure(&g, 4.0), 2.5);
    }

    #[test]
    fn test_dot_radius_falls_back_to_mid_width() {
        let mut g = group(vec![StrokePoint::new(0.0, 0.0, 0)]);
        g.dot_size = 0.0;
        g.min_width = 1.0;
        g.max_width = 3.0;
        assert_eq!(dot_radius(&g), 2.0);
        assert_eq!(mean_width(&g), 2.0);
    }
}
