//! Signature capture pad
//!
//! Captures freehand ink strokes, keeps them stable across backing-store
//! resizes and exports them as PNG, JPEG or SVG, optionally composited with
//! background and cache image layers.

pub mod codec;
pub mod compose;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod install;
pub mod pad;
pub mod render;
pub mod surface;

pub use codec::{EncoderOptions, ImageType};
pub use config::{InkColor, OptionsPatch, PadConfig, SignatureOptions};
pub use domain::{DrawingRecord, ImageLayer, StrokeGroup, StrokePoint};
pub use engine::{DataUrlOptions, DrawingEngine, SkiaEngine};
pub use error::{Error, Result};
pub use install::install;
pub use pad::{SaveStatus, SignaturePad};
pub use surface::{ContainerSurface, ResizeEvents, Surface};
