//! Layer bookkeeping for composition
//!
//! Holds the configured background images, the runtime cache images and the
//! last exported signature. The cache only changes through explicit
//! append/clear calls.

use crate::domain::ImageLayer;

#[derive(Clone, Debug)]
pub struct LayerState {
    backgrounds: Vec<ImageLayer>,
    cache: Vec<ImageLayer>,
    signature: ImageLayer,
}

impl Default for LayerState {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl LayerState {
    pub fn new(backgrounds: Vec<ImageLayer>) -> Self {
        Self {
            backgrounds,
            cache: Vec::new(),
            signature: ImageLayer::transparent(),
        }
    }

    pub fn backgrounds(&self) -> &[ImageLayer] {
        &self.backgrounds
    }

    pub fn set_backgrounds(&mut self, backgrounds: Vec<ImageLayer>) {
        self.backgrounds = backgrounds;
    }

    pub fn cache(&self) -> &[ImageLayer] {
        &self.cache
    }

    pub fn append_cache(&mut self, images: impl IntoIterator<Item = ImageLayer>) {
        self.cache.extend(images);
    }

    pub fn clear_cache(&mut self) -> &[ImageLayer] {
        self.cache.clear();
        &self.cache
    }

    /// Last exported signature, or the transparent placeholder
    pub fn signature(&self) -> &ImageLayer {
        &self.signature
    }

    pub fn set_signature(&mut self, signature: ImageLayer) {
        self.signature = signature;
    }

    pub fn reset_signature(&mut self) {
        self.signature = ImageLayer::transparent();
    }

    /// Detached copy of backgrounds followed by cache images
    pub fn background_and_cache(&self) -> Vec<ImageLayer> {
        self.backgrounds
            .iter()
            .chain(self.cache.iter())
            .cloned()
            .collect()
    }

    /// Full paint order: backgrounds, cache, then `top` or the signature
    pub fn composition(&self, top: Option<ImageLayer>) -> Vec<ImageLayer> {
        let mut layers = self.background_and_cache();
        layers.push(top.unwrap_or_else(|| self.signature.clone()));
        layers
    }
}
