//! Built-in drawing engine rendering strokes with tiny-skia
//!
//! Every stroke starts with a dot at its first sample, followed by
//! round-capped segments between samples. Live capture paints in the same
//! order as replay, so both produce identical pixels.

use image::RgbaImage;
use tiny_skia::{Pixmap, Transform};

use super::{DataUrlOptions, DrawingEngine};
use crate::codec::{self, EncoderOptions, ImageType, data_url};
use crate::config::{OptionsPatch, SignatureOptions};
use crate::domain::{DrawingRecord, StrokeGroup, StrokePoint};
use crate::error::{Error, Result};
use crate::render::{image as raster, svg};

/// Canvas element default size before the first resize
pub const DEFAULT_WIDTH: u32 = 300;
pub const DEFAULT_HEIGHT: u32 = 150;

fn blank_pixmap(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width.max(1), height.max(1))
        .ok_or_else(|| Error::Config(format!("invalid backing store size {width}x{height}")))
}

pub struct SkiaEngine {
    options: SignatureOptions,
    pixmap: Pixmap,
    /// Context scale from logical to backing store pixels
    scale: f32,
    record: DrawingRecord,
    /// An image was drawn via `from_data_url` since the last clear
    has_image: bool,
    capturing: bool,
    in_stroke: bool,
}

impl SkiaEngine {
    pub fn new(options: SignatureOptions) -> Result<Self> {
        let mut engine = Self {
            options,
            pixmap: blank_pixmap(DEFAULT_WIDTH, DEFAULT_HEIGHT)?,
            scale: 1.0,
            record: DrawingRecord::new(),
            has_image: false,
            capturing: true,
            in_stroke: false,
        };
        engine.clear();
        Ok(engine)
    }

    fn transform(&self) -> Transform {
        Transform::from_scale(self.scale, self.scale)
    }

    /// Canvas size in logical units
    fn logical_size(&self) -> (f32, f32) {
        (
            self.pixmap.width() as f32 / self.scale,
            self.pixmap.height() as f32 / self.scale,
        )
    }

    /// Start a group at `point` and ink its dot
    fn start_group(&mut self, point: StrokePoint) {
        let transform = self.transform();
        let group = StrokeGroup::from_points(&self.options, vec![point]);
        raster::draw_dot(&mut self.pixmap, &group, &point, transform);
        self.record.push(group);
    }
}

impl std::fmt::Debug for SkiaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkiaEngine")
            .field("size", &(self.pixmap.width(), self.pixmap.height()))
            .field("scale", &self.scale)
            .field("strokes", &self.record.len())
            .field("capturing", &self.capturing)
            .finish()
    }
}

impl DrawingEngine for SkiaEngine {
    fn clear(&mut self) {
        raster::fill_background(&mut self.pixmap, self.options.background_color);
        self.record.clear();
        self.has_image = false;
    }

    fn is_empty(&self) -> bool {
        self.record.is_empty() && !self.has_image
    }

    fn to_data(&self) -> DrawingRecord {
        self.record.clone()
    }

    fn from_data(&mut self, record: &DrawingRecord) {
        self.clear();
        let transform = self.transform();
        raster::draw_record(&mut self.pixmap, record, transform);
        self.record = record.clone();
        log::debug!("Replayed {} strokes at scale {}", record.len(), self.scale);
    }

    fn to_data_url(&self, format: ImageType, options: &EncoderOptions) -> Result<String> {
        match format {
            ImageType::Svg => {
                let (width, height) = self.logical_size();
                let doc = svg::record_to_svg(&self.record, self.options.background_color, width, height);
                Ok(data_url::encode(format.mime(), doc.as_bytes()))
            }
            _ => codec::encode_data_url(&self.to_image(), format, options),
        }
    }

    fn from_data_url(&mut self, url: &str, options: &DataUrlOptions) -> Result<()> {
        let decoded = data_url::decode(url)?;
        let img = codec::decode_image(&decoded.data, decoded.is_svg())?;

        let ratio = options.ratio.filter(|r| *r > 0.0).unwrap_or(self.scale);
        let width = options
            .width
            .unwrap_or(self.pixmap.width() as f32 / ratio);
        let height = options
            .height
            .unwrap_or(self.pixmap.height() as f32 / ratio);

        let transform = self.transform();
        raster::draw_image(
            &mut self.pixmap,
            &img,
            options.x_offset,
            options.y_offset,
            width,
            height,
            transform,
        );
        self.has_image = true;
        Ok(())
    }

    fn on(&mut self) {
        self.capturing = true;
    }

    fn off(&mut self) {
        self.stroke_end();
        self.capturing = false;
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn options(&self) -> &SignatureOptions {
        &self.options
    }

    fn apply_options(&mut self, patch: &OptionsPatch) -> Vec<&'static str> {
        self.options.apply(patch)
    }

    fn set_backing_store(&mut self, width: u32, height: u32, scale: f32) -> Result<()> {
        self.pixmap = blank_pixmap(width, height)?;
        self.scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        log::debug!(
            "Backing store set to {}x{} at scale {}",
            self.pixmap.width(),
            self.pixmap.height(),
            self.scale
        );
        Ok(())
    }

    fn backing_store_size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn scale(&self) -> f32 {
        self.scale
    }

    fn stroke_begin(&mut self, point: StrokePoint) -> bool {
        if !self.capturing {
            return false;
        }
        self.stroke_end();
        self.options.on_begin.call();
        self.start_group(point);
        self.in_stroke = true;
        true
    }

    fn stroke_update(&mut self, point: StrokePoint) -> bool {
        if !self.capturing || !self.in_stroke {
            return false;
        }
        let Some(last) = self.record.groups().last().and_then(StrokeGroup::last_point).copied() else {
            // cleared mid-stroke; keep inking into a fresh group
            self.start_group(point);
            return true;
        };
        let throttle = i64::try_from(self.options.throttle).unwrap_or(i64::MAX);
        if point.time.saturating_sub(last.time) < throttle
            || last.distance_to(&point) <= self.options.min_distance
        {
            return false;
        }

        let transform = self.transform();
        let Some(group) = self.record.last_mut() else {
            return false;
        };
        group.points.push(point);
        raster::draw_segment(&mut self.pixmap, group, &last, &point, transform);
        true
    }

    fn stroke_end(&mut self) -> bool {
        if !std::mem::take(&mut self.in_stroke) {
            return false;
        }
        self.options.on_end.call();
        true
    }

    fn to_image(&self) -> RgbaImage {
        raster::pixmap_to_rgba(&self.pixmap)
    }
}
