//! Stroke types captured from pointer input
//!
//! All coordinates are display (logical) coordinates. The backing store
//! scale is applied at render time, so a record never changes when the
//! canvas resolution does.

use serde::{Deserialize, Serialize};

use crate::config::{InkColor, SignatureOptions};

/// One sample of a pointer movement
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
    /// Milliseconds since the Unix epoch
    pub time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f32>,
}

impl StrokePoint {
    pub fn new(x: f32, y: f32, time: i64) -> Self {
        Self {
            x,
            y,
            time,
            pressure: None,
        }
    }

    /// Sample stamped with the current wall-clock time
    pub fn now(x: f32, y: f32) -> Self {
        Self::new(x, y, chrono::Utc::now().timestamp_millis())
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = Some(pressure.clamp(0.0, 1.0));
        self
    }

    pub fn distance_to(&self, other: &StrokePoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One continuous pen-down to pen-up stroke
///
/// The pen settings active when the stroke was drawn travel with it,
/// so replay does not depend on the engine's current options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeGroup {
    #[serde(default, alias = "color")]
    pub pen_color: InkColor,
    #[serde(default = "default_dot_size")]
    pub dot_size: f32,
    #[serde(default = "default_min_width")]
    pub min_width: f32,
    #[serde(default = "default_max_width")]
    pub max_width: f32,
    pub points: Vec<StrokePoint>,
}

fn default_dot_size() -> f32 {
    SignatureOptions::default().dot_size
}

fn default_min_width() -> f32 {
    SignatureOptions::default().min_width
}

fn default_max_width() -> f32 {
    SignatureOptions::default().max_width
}

impl StrokeGroup {
    /// Empty stroke carrying the pen settings from `options`
    pub fn with_options(options: &SignatureOptions) -> Self {
        Self {
            pen_color: options.pen_color,
            dot_size: options.dot_size,
            min_width: options.min_width,
            max_width: options.max_width,
            points: Vec::new(),
        }
    }

    pub fn from_points(options: &SignatureOptions, points: Vec<StrokePoint>) -> Self {
        Self {
            points,
            ..Self::with_options(options)
        }
    }

    /// A stroke with a single sample renders as a dot
    pub fn is_dot(&self) -> bool {
        self.points.len() == 1
    }

    pub fn last_point(&self) -> Option<&StrokePoint> {
        self.points.last()
    }
}

/// Full ordered set of strokes; replay order is stacking order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrawingRecord(Vec<StrokeGroup>);

impl DrawingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[StrokeGroup] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, group: StrokeGroup) {
        self.0.push(group);
    }

    /// Remove the most recent stroke
    pub fn pop_last(&mut self) -> Option<StrokeGroup> {
        self.0.pop()
    }

    pub fn last_mut(&mut self) -> Option<&mut StrokeGroup> {
        self.0.last_mut()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StrokeGroup> {
        self.0.iter()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl From<Vec<StrokeGroup>> for DrawingRecord {
    fn from(groups: Vec<StrokeGroup>) -> Self {
        Self(groups)
    }
}

impl<'a> IntoIterator for &'a DrawingRecord {
    type Item = &'a StrokeGroup;
    type IntoIter = std::slice::Iter<'a, StrokeGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
