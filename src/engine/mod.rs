//! Drawing engine seam
//!
//! The pad never touches pixels itself; everything goes through a
//! [`DrawingEngine`]. [`SkiaEngine`] is the built-in implementation.

pub mod skia;

pub use skia::SkiaEngine;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::codec::{EncoderOptions, ImageType};
use crate::config::{OptionsPatch, SignatureOptions};
use crate::domain::{DrawingRecord, StrokePoint};
use crate::error::Result;

/// Placement for an image drawn with [`DrawingEngine::from_data_url`]
///
/// Unset fields default to covering the whole canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataUrlOptions {
    /// Pixel ratio of the source image; defaults to the backing store scale
    pub ratio: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    #[serde(default)]
    pub x_offset: f32,
    #[serde(default)]
    pub y_offset: f32,
}

/// Freehand ink capture engine bound to one canvas
pub trait DrawingEngine {
    /// Clear the canvas to the background color and drop all strokes
    fn clear(&mut self);

    /// True when nothing has been drawn since the last clear
    fn is_empty(&self) -> bool;

    fn to_data(&self) -> DrawingRecord;

    /// Replace the canvas content with a replay of `record`
    fn from_data(&mut self, record: &DrawingRecord);

    fn to_data_url(&self, format: ImageType, options: &EncoderOptions) -> Result<String>;

    /// Draw an encoded image onto the canvas
    fn from_data_url(&mut self, data_url: &str, options: &DataUrlOptions) -> Result<()>;

    /// Enable pointer capture
    fn on(&mut self);

    /// Disable pointer capture; existing strokes stay
    fn off(&mut self);

    fn is_capturing(&self) -> bool;

    fn options(&self) -> &SignatureOptions;

    /// Apply a live option update, returning the keys that changed
    fn apply_options(&mut self, patch: &OptionsPatch) -> Vec<&'static str>;

    /// Reallocate the backing store and set the context scale
    ///
    /// Like resizing a canvas element, this wipes the pixels but keeps the
    /// stroke record until the next [`clear`](Self::clear).
    fn set_backing_store(&mut self, width: u32, height: u32, scale: f32) -> Result<()>;

    fn backing_store_size(&self) -> (u32, u32);

    fn scale(&self) -> f32;

    /// Pointer down; returns false when capture is disabled
    fn stroke_begin(&mut self, point: StrokePoint) -> bool;

    /// Pointer move; returns false when the sample was dropped
    fn stroke_update(&mut self, point: StrokePoint) -> bool;

    /// Pointer up; returns false when no stroke was in progress
    fn stroke_end(&mut self) -> bool;

    /// Current backing store pixels
    fn to_image(&self) -> RgbaImage;
}
