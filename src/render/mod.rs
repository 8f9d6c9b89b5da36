//! Stroke rendering module
//!
//! This module contains:
//! - Width math shared between raster and vector output
//! - Raster rendering using tiny-skia
//! - SVG export of stroke records

pub mod geometry;
pub mod image;
pub mod svg;
