//! Export formats and raster encoders

pub mod data_url;

use std::fmt;
use std::io;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::{RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Canvas default JPEG quality
pub const DEFAULT_JPEG_QUALITY: f32 = 0.92;

/// Supported export encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageType {
    #[default]
    Png,
    Jpeg,
    Svg,
}

impl ImageType {
    /// Whitelist in declaration order; the first entry is the default
    pub const SUPPORTED: [ImageType; 3] = [ImageType::Png, ImageType::Jpeg, ImageType::Svg];

    pub fn mime(self) -> &'static str {
        match self {
            ImageType::Png => "image/png",
            ImageType::Jpeg => "image/jpeg",
            ImageType::Svg => "image/svg+xml",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageType::Png => "png",
            ImageType::Jpeg => "jpg",
            ImageType::Svg => "svg",
        }
    }

    /// Comma separated MIME list used in error messages
    pub fn supported_list() -> String {
        Self::SUPPORTED
            .iter()
            .map(|t| t.mime())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for ImageType {
    type Err = Error;

    /// Accepts a MIME type or a short name
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image/png" | "png" => Ok(ImageType::Png),
            "image/jpeg" | "jpeg" | "jpg" => Ok(ImageType::Jpeg),
            "image/svg+xml" | "svg" => Ok(ImageType::Svg),
            _ => Err(Error::UnsupportedFormat {
                requested: s.to_string(),
                supported: Self::supported_list(),
            }),
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Encoder options passed alongside the export format
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EncoderOptions {
    /// JPEG quality in 0.0-1.0; ignored by other formats
    #[serde(default)]
    pub quality: Option<f32>,
}

impl EncoderOptions {
    pub fn with_quality(quality: f32) -> Self {
        Self {
            quality: Some(quality),
        }
    }

    /// Quality mapped to the 1-100 scale of the JPEG encoder
    ///
    /// Out-of-range values fall back to the default, as canvas export does.
    pub fn jpeg_quality(&self) -> u8 {
        let quality = match self.quality {
            Some(q) if (0.0..=1.0).contains(&q) => q,
            _ => DEFAULT_JPEG_QUALITY,
        };
        ((quality * 100.0).round() as u8).max(1)
    }
}

/// Encode raster pixels in the given format
pub fn encode_raster(image: &RgbaImage, format: ImageType, options: &EncoderOptions) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    match format {
        ImageType::Png => write_png(&mut buffer, image)?,
        ImageType::Jpeg => write_jpeg(&mut buffer, image, options.jpeg_quality())?,
        ImageType::Svg => {
            return Err(Error::Encode(
                "SVG output is produced from stroke data, not pixels".into(),
            ));
        }
    }
    Ok(buffer)
}

/// Encode raster pixels as a data URI
pub fn encode_data_url(image: &RgbaImage, format: ImageType, options: &EncoderOptions) -> Result<String> {
    let bytes = encode_raster(image, format, options)?;
    Ok(data_url::encode(format.mime(), &bytes))
}

/// Decode raster bytes, or rasterize an SVG document at its intrinsic size
pub fn decode_image(data: &[u8], is_svg: bool) -> Result<RgbaImage> {
    if is_svg {
        return rasterize_svg(data);
    }
    image::load_from_memory(data)
        .map(|img| img.to_rgba8())
        .map_err(|e| Error::Decode(e.to_string()))
}

fn rasterize_svg(data: &[u8]) -> Result<RgbaImage> {
    let tree = resvg::usvg::Tree::from_data(data, &resvg::usvg::Options::default())
        .map_err(|e| Error::Decode(format!("invalid SVG: {e}")))?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| Error::Decode(format!("SVG has unusable size {size:?}")))?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
    Ok(crate::render::image::pixmap_to_rgba(&pixmap))
}

fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> std::result::Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

/// JPEG has no alpha channel; pixels are flattened onto black like a canvas export
fn write_jpeg<W: io::Write>(mut w: W, image: &RgbaImage, quality: u8) -> Result<()> {
    let rgb = RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let over_black = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        image::Rgb([over_black(r), over_black(g), over_black(b)])
    });
    JpegEncoder::new_with_quality(&mut w, quality)
        .encode_image(&rgb)
        .map_err(|e| Error::Encode(e.to_string()))
}
