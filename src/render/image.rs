//! Raster rendering of strokes using tiny-skia

use image::RgbaImage;
use tiny_skia::{
    Color, FillRule, FilterQuality, IntSize, LineCap, LineJoin, Paint, PathBuilder, Pixmap,
    PixmapPaint, Stroke, Transform,
};

use super::geometry;
use crate::config::InkColor;
use crate::domain::{DrawingRecord, StrokeGroup, StrokePoint};

/// Copy a premultiplied pixmap into a straight-alpha image
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let (w, h) = (pixmap.width(), pixmap.height());
    RgbaImage::from_raw(w, h, pixmap.clone().take_demultiplied())
        .unwrap_or_else(|| RgbaImage::new(w, h))
}

/// Premultiply a straight-alpha image into a pixmap
pub fn rgba_to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(img.width(), img.height())?;
    let mut data = img.as_raw().clone();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(data, size)
}

/// Reset every pixel to the background color
pub fn fill_background(pixmap: &mut Pixmap, color: InkColor) {
    let [r, g, b, a] = color.to_rgba_u8();
    pixmap.fill(Color::from_rgba8(r, g, b, a));
}

fn ink_paint(color: InkColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

/// Draw a filled dot for a single-sample stroke
pub fn draw_dot(pixmap: &mut Pixmap, group: &StrokeGroup, point: &StrokePoint, transform: Transform) {
    let Some(path) = PathBuilder::from_circle(point.x, point.y, geometry::dot_radius(group)) else {
        return;
    };
    pixmap.fill_path(&path, &ink_paint(group.pen_color), FillRule::Winding, transform, None);
}

/// Draw one segment between consecutive samples with rounded caps
pub fn draw_segment(
    pixmap: &mut Pixmap,
    group: &StrokeGroup,
    from: &StrokePoint,
    to: &StrokePoint,
    transform: Transform,
) {
    let mut pb = PathBuilder::new();
    pb.move_to(from.x, from.y);
    pb.line_to(to.x, to.y);
    let Some(path) = pb.finish() else {
        return;
    };

    let stroke = Stroke {
        width: geometry::segment_width(group, from, to),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &ink_paint(group.pen_color), &stroke, transform, None);
}

/// Draw a complete stroke: the starting dot, then each segment
pub fn draw_group(pixmap: &mut Pixmap, group: &StrokeGroup, transform: Transform) {
    let Some(first) = group.points.first() else {
        return;
    };
    draw_dot(pixmap, group, first, transform);
    for pair in group.points.windows(2) {
        draw_segment(pixmap, group, &pair[0], &pair[1], transform);
    }
}

/// Draw all strokes in record order
pub fn draw_record(pixmap: &mut Pixmap, record: &DrawingRecord, transform: Transform) {
    for group in record {
        draw_group(pixmap, group, transform);
    }
}

/// Draw an image into the logical rectangle (x, y, width, height)
pub fn draw_image(
    pixmap: &mut Pixmap,
    img: &RgbaImage,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    transform: Transform,
) {
    if img.width() == 0 || img.height() == 0 || width <= 0.0 || height <= 0.0 {
        return;
    }
    let Some(src) = rgba_to_pixmap(img) else {
        return;
    };
    let placement = transform
        .pre_translate(x, y)
        .pre_scale(width / img.width() as f32, height / img.height() as f32);
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..Default::default()
    };
    pixmap.draw_pixmap(0, 0, src.as_ref(), &paint, placement, None);
}
