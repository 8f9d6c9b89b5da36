//! Pure domain types with minimal dependencies
//!
//! This module contains the stroke record and layer types shared by the
//! engine, the compositor and the pad.

pub mod geometry;
pub mod layer;
pub mod stroke;

pub use geometry::*;
pub use layer::*;
pub use stroke::*;
