//! Loading layer sources
//!
//! A source is a data URI, a `file://` URL or a plain path. Remote URLs are
//! rejected; callers fetch them and pass a data URI instead.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use url::Url;

use crate::codec::{self, data_url};
use crate::error::{Error, Result};

/// Where a layer's bytes come from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayerSource {
    DataUrl(String),
    File(PathBuf),
}

impl LayerSource {
    pub fn parse(src: &str) -> Result<Self> {
        let trimmed = src.trim();
        if trimmed.starts_with("data:") {
            return Ok(LayerSource::DataUrl(trimmed.to_string()));
        }
        match Url::parse(trimmed) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(LayerSource::File)
                .map_err(|_| Error::Composition(format!("invalid file URL {trimmed:?}"))),
            // Windows drive letters parse as a one-letter scheme
            Ok(url) if url.scheme().len() > 1 => Err(Error::Composition(format!(
                "unsupported URL scheme {:?} in {trimmed:?}",
                url.scheme()
            ))),
            _ => Ok(LayerSource::File(PathBuf::from(trimmed))),
        }
    }
}

fn is_svg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
}

/// Load and decode one layer source
pub fn load(src: &str) -> Result<RgbaImage> {
    match LayerSource::parse(src)? {
        LayerSource::DataUrl(url) => {
            let decoded = data_url::decode(&url)?;
            codec::decode_image(&decoded.data, decoded.is_svg())
        }
        LayerSource::File(path) => {
            let bytes = std::fs::read(&path)?;
            log::debug!("Loaded layer {} ({} bytes)", path.display(), bytes.len());
            codec::decode_image(&bytes, is_svg_path(&path))
        }
    }
}
