//! The signature pad component
//!
//! [`SignaturePad`] binds a drawing engine to a host surface, keeps the
//! drawing stable across resizes and exports it, optionally flattened with
//! background and cache images.
//!
//! A resize always resets the exported signature to the transparent
//! placeholder, even though the strokes survive. Call [`SignaturePad::save`]
//! again after a resize before composing.

pub mod state;

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;

use crate::codec::{self, EncoderOptions, ImageType};
use crate::compose::{Compositor, ImageCompositor};
use crate::config::{OptionsPatch, PadConfig};
use crate::domain::{DrawingRecord, ImageLayer, StrokePoint};
use crate::engine::{DataUrlOptions, DrawingEngine, SkiaEngine};
use crate::error::{Error, Result};
use crate::surface::{ResizeEvents, ResizeSubscription, Surface, effective_ratio};
use state::LayerState;

/// Replacement for the built-in resize procedure
pub type ResizeHandler = Box<dyn FnMut(&mut dyn DrawingEngine, &dyn Surface) -> Result<()>>;

/// Outcome of [`SignaturePad::save`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStatus {
    pub is_empty: bool,
    pub data: Option<String>,
}

pub struct SignaturePad {
    config: PadConfig,
    layers: LayerState,
    engine: Option<Box<dyn DrawingEngine>>,
    surface: Option<Rc<dyn Surface>>,
    subscription: Option<ResizeSubscription>,
    resize_handler: Option<ResizeHandler>,
    compositor: Box<dyn Compositor>,
}

impl std::fmt::Debug for SignaturePad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignaturePad")
            .field("config", &self.config)
            .field("layers", &self.layers)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

impl SignaturePad {
    pub fn new(config: PadConfig) -> Self {
        let layers = LayerState::new(config.images.clone());
        Self {
            config,
            layers,
            engine: None,
            surface: None,
            subscription: None,
            resize_handler: None,
            compositor: Box::new(ImageCompositor),
        }
    }

    pub fn with_compositor(mut self, compositor: impl Compositor + 'static) -> Self {
        self.compositor = Box::new(compositor);
        self
    }

    /// Replace the default resize procedure
    pub fn with_resize_handler(
        mut self,
        handler: impl FnMut(&mut dyn DrawingEngine, &dyn Surface) -> Result<()> + 'static,
    ) -> Self {
        self.resize_handler = Some(Box::new(handler));
        self
    }

    pub fn config(&self) -> &PadConfig {
        &self.config
    }

    /// Inline style for the element hosting the canvas
    pub fn container_style(&self) -> BTreeMap<String, String> {
        self.config.container_style()
    }

    pub fn is_mounted(&self) -> bool {
        self.engine.is_some()
    }

    /// Bind the built-in engine and start listening for resizes
    pub fn mount(&mut self, surface: Rc<dyn Surface>, events: &Rc<ResizeEvents>) -> Result<()> {
        let engine = SkiaEngine::new(self.config.options.clone())?;
        self.mount_with(Box::new(engine), surface, events)
    }

    /// Bind a custom engine and start listening for resizes
    pub fn mount_with(
        &mut self,
        engine: Box<dyn DrawingEngine>,
        surface: Rc<dyn Surface>,
        events: &Rc<ResizeEvents>,
    ) -> Result<()> {
        if self.subscription.take().is_some() {
            log::warn!("Signature pad mounted twice; replacing previous binding");
        }
        self.engine = Some(engine);
        self.surface = Some(surface);
        self.subscription = Some(events.subscribe());
        if let Err(err) = self.resize() {
            self.unmount();
            return Err(err);
        }
        log::info!("Signature pad mounted");
        Ok(())
    }

    /// Remove the resize listener and release the engine
    pub fn unmount(&mut self) {
        if self.subscription.take().is_some() {
            log::info!("Signature pad unmounted");
        }
        self.engine = None;
        self.surface = None;
    }

    /// Run a resize if the host announced one since the last call
    pub fn handle_resize_events(&mut self) -> Result<bool> {
        let pending = self
            .subscription
            .as_ref()
            .is_some_and(ResizeSubscription::take_pending);
        if pending {
            self.resize()?;
        }
        Ok(pending)
    }

    /// Match the backing store to the surface and replay the strokes
    pub fn resize(&mut self) -> Result<()> {
        let Self {
            engine,
            surface,
            resize_handler,
            layers,
            ..
        } = self;
        let engine = engine.as_deref_mut().ok_or(Error::NotInitialized)?;
        let surface = surface.as_deref().ok_or(Error::NotInitialized)?;

        if let Some(handler) = resize_handler.as_mut() {
            return handler(engine, surface);
        }

        let record = engine.to_data();
        let ratio = effective_ratio(surface.device_pixel_ratio());
        let (width, height) = surface.display_size();
        engine.set_backing_store((width * ratio) as u32, (height * ratio) as u32, ratio)?;
        engine.clear();
        layers.reset_signature();
        engine.from_data(&record);
        log::debug!(
            "Resized to {}x{} at ratio {} with {} strokes",
            width,
            height,
            ratio,
            record.len()
        );
        Ok(())
    }

    fn engine(&self) -> Result<&(dyn DrawingEngine + 'static)> {
        self.engine.as_deref().ok_or(Error::NotInitialized)
    }

    /// Direct access to the bound engine
    pub fn engine_mut(&mut self) -> Result<&mut (dyn DrawingEngine + 'static)> {
        self.engine.as_deref_mut().ok_or(Error::NotInitialized)
    }

    /// Export the canvas; `None` selects the first supported format
    pub fn save(&mut self, format: Option<&str>, options: &EncoderOptions) -> Result<SaveStatus> {
        let format = match format {
            Some(requested) => requested.parse::<ImageType>()?,
            None => ImageType::default(),
        };
        let engine = self.engine()?;
        if engine.is_empty() {
            return Ok(SaveStatus {
                is_empty: true,
                data: None,
            });
        }
        let data = engine.to_data_url(format, options)?;
        self.layers.set_signature(ImageLayer::new(data.clone()));
        log::debug!("Saved signature as {format}");
        Ok(SaveStatus {
            is_empty: false,
            data: Some(data),
        })
    }

    /// Remove the last stroke; returns false when there was nothing to undo
    pub fn undo(&mut self) -> Result<bool> {
        let engine = self.engine_mut()?;
        let mut record = engine.to_data();
        if record.pop_last().is_none() {
            return Ok(false);
        }
        engine.from_data(&record);
        Ok(true)
    }

    /// Compose backgrounds, cache images and `top` (or the current signature)
    ///
    /// The default compositor decodes on the tokio blocking pool, so the
    /// future must be polled inside a tokio runtime; it panics otherwise.
    pub async fn export_flattened_image(&self, top: Option<ImageLayer>) -> Result<String> {
        let layers = self.layers.composition(top);
        let image = self.compositor.compose(layers).await?;
        codec::encode_data_url(&image, ImageType::Png, &EncoderOptions::default())
    }

    /// Use `custom` as the signature and compose it over the other layers
    ///
    /// Needs a tokio runtime, see [`SignaturePad::export_flattened_image`].
    pub async fn merge_with_signature(&mut self, custom: ImageLayer) -> Result<String> {
        self.layers.set_signature(custom);
        self.export_flattened_image(None).await
    }

    /// Append cache images and compose everything with the current signature
    ///
    /// Needs a tokio runtime, see [`SignaturePad::export_flattened_image`].
    pub async fn add_images(&mut self, images: Vec<ImageLayer>) -> Result<String> {
        self.layers.append_cache(images);
        self.export_flattened_image(None).await
    }

    pub fn from_data_url(&mut self, data_url: &str, options: &DataUrlOptions) -> Result<()> {
        self.engine_mut()?.from_data_url(data_url, options)
    }

    pub fn from_data(&mut self, record: &DrawingRecord) -> Result<()> {
        self.engine_mut()?.from_data(record);
        Ok(())
    }

    pub fn to_data(&self) -> Result<DrawingRecord> {
        Ok(self.engine()?.to_data())
    }

    pub fn lock(&mut self) -> Result<()> {
        self.engine_mut()?.off();
        Ok(())
    }

    pub fn unlock(&mut self) -> Result<()> {
        self.engine_mut()?.on();
        Ok(())
    }

    pub fn is_locked(&self) -> Result<bool> {
        Ok(!self.engine()?.is_capturing())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.engine()?.is_empty())
    }

    pub fn background_and_cache_images(&self) -> Vec<ImageLayer> {
        self.layers.background_and_cache()
    }

    pub fn clear_cache_images(&mut self) -> &[ImageLayer] {
        self.layers.clear_cache()
    }

    pub fn clear_drawing(&mut self) -> Result<()> {
        self.engine_mut()?.clear();
        Ok(())
    }

    /// Last exported signature layer
    pub fn signature(&self) -> &ImageLayer {
        self.layers.signature()
    }

    pub fn set_background_images(&mut self, images: Vec<ImageLayer>) {
        self.config.images = images.clone();
        self.layers.set_backgrounds(images);
    }

    /// Apply recognized option keys to the config and the bound engine
    pub fn update_options(&mut self, patch: &OptionsPatch) -> Vec<&'static str> {
        let applied = self.config.options.apply(patch);
        if let Some(engine) = self.engine.as_deref_mut() {
            engine.apply_options(patch);
        }
        if !applied.is_empty() {
            log::debug!("Updated options: {}", applied.join(", "));
        }
        applied
    }

    pub fn stroke_begin(&mut self, point: StrokePoint) -> Result<bool> {
        Ok(self.engine_mut()?.stroke_begin(point))
    }

    pub fn stroke_update(&mut self, point: StrokePoint) -> Result<bool> {
        Ok(self.engine_mut()?.stroke_update(point))
    }

    pub fn stroke_end(&mut self) -> Result<bool> {
        Ok(self.engine_mut()?.stroke_end())
    }
}

#[cfg(test)]
mod tests;
