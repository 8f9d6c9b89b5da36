//! Image layers for composition

use serde::{Deserialize, Serialize};

/// 1x1 transparent PNG used as the signature placeholder
pub const TRANSPARENT_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// A single compositable image positioned at (x, y)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageLayer {
    /// Data URI, `file://` URL or local path
    pub src: String,
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
}

impl ImageLayer {
    pub fn new(src: impl Into<String>) -> Self {
        Self::at(src, 0, 0)
    }

    pub fn at(src: impl Into<String>, x: i64, y: i64) -> Self {
        Self {
            src: src.into(),
            x,
            y,
        }
    }

    /// The empty signature placeholder
    pub fn transparent() -> Self {
        Self::new(TRANSPARENT_PNG)
    }

    pub fn is_placeholder(&self) -> bool {
        self.src == TRANSPARENT_PNG
    }
}

impl From<&str> for ImageLayer {
    fn from(src: &str) -> Self {
        Self::new(src)
    }
}

impl From<String> for ImageLayer {
    fn from(src: String) -> Self {
        Self::new(src)
    }
}
