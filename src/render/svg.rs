//! SVG export of a stroke record

use std::fmt::Write as _;

use super::geometry;
use crate::config::InkColor;
use crate::domain::DrawingRecord;

/// Render the record as an SVG document sized to the logical canvas
pub fn record_to_svg(record: &DrawingRecord, background: InkColor, width: f32, height: f32) -> String {
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}">"#
    );

    if !background.is_transparent() {
        let _ = write!(
            svg,
            r#"<rect width="100%" height="100%" fill="{}" fill-opacity="{}"/>"#,
            background.to_hex(),
            background.opacity()
        );
    }

    for group in record {
        let color = group.pen_color.to_hex();
        let opacity = group.pen_color.opacity();
        match group.points.as_slice() {
            [] => {}
            [dot] => {
                let _ = write!(
                    svg,
                    r#"<circle cx="{}" cy="{}" r="{}" fill="{color}" fill-opacity="{opacity}"/>"#,
                    dot.x,
                    dot.y,
                    geometry::dot_radius(group)
                );
            }
            [first, rest @ ..] => {
                let mut d = format!("M{},{}", first.x, first.y);
                for p in rest {
                    let _ = write!(d, " L{},{}", p.x, p.y);
                }
                let _ = write!(
                    svg,
                    r#"<path d="{d}" fill="none" stroke="{color}" stroke-opacity="{opacity}" stroke-width="{}" stroke-linecap="round" stroke-linejoin="round"/>"#,
                    geometry::mean_width(group)
                );
            }
        }
    }

    svg.push_str("</svg>");
    svg
}
