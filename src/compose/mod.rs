//! Layered image composition
//!
//! Layers are decoded in parallel on the blocking pool and then painted in
//! the order they were given, each over the previous ones at its offset.

pub mod source;

use futures::future::{BoxFuture, try_join_all};
use image::RgbaImage;

use crate::domain::{ImageLayer, Rect};
use crate::error::{Error, Result};

/// Flattens an ordered list of layers into one image
pub trait Compositor {
    fn compose<'a>(&'a self, layers: Vec<ImageLayer>) -> BoxFuture<'a, Result<RgbaImage>>;
}

/// Default compositor backed by the `image` crate
///
/// Must be polled inside a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCompositor;

impl Compositor for ImageCompositor {
    fn compose<'a>(&'a self, layers: Vec<ImageLayer>) -> BoxFuture<'a, Result<RgbaImage>> {
        Box::pin(async move {
            let decoded = decode_all(layers).await?;
            flatten(&decoded)
        })
    }
}

/// A decoded layer ready to paint
#[derive(Clone, Debug)]
pub struct DecodedLayer {
    pub image: RgbaImage,
    pub x: i64,
    pub y: i64,
}

impl DecodedLayer {
    fn bounds(&self) -> Rect {
        Rect::placed(self.x, self.y, self.image.width(), self.image.height())
    }
}

/// Decode every layer concurrently; output order matches input order
pub async fn decode_all(layers: Vec<ImageLayer>) -> Result<Vec<DecodedLayer>> {
    let tasks = layers.into_iter().enumerate().map(|(index, layer)| async move {
        let ImageLayer { src, x, y } = layer;
        let image = tokio::task::spawn_blocking(move || source::load(&src))
            .await
            .map_err(|e| Error::Composition(format!("layer {index} decode task failed: {e}")))?
            .map_err(|e| Error::Composition(format!("layer {index}: {e}")))?;
        Ok::<_, Error>(DecodedLayer { image, x, y })
    });
    try_join_all(tasks).await
}

/// Paint layers in order onto a canvas covering the origin and every layer
pub fn flatten(layers: &[DecodedLayer]) -> Result<RgbaImage> {
    let union = layers
        .iter()
        .fold(Rect::default(), |acc, layer| acc.union(layer.bounds()));
    let dims = Rect::new(0, 0, union.right, union.bottom)
        .dimensions()
        .ok_or_else(|| Error::Composition("nothing to compose".into()))?;

    let mut canvas = RgbaImage::new(dims.width(), dims.height());
    for layer in layers {
        image::imageops::overlay(&mut canvas, &layer.image, layer.x, layer.y);
    }
    log::debug!(
        "Composed {} layers into {}x{}",
        layers.len(),
        canvas.width(),
        canvas.height()
    );
    Ok(canvas)
}
