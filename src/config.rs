//! Configuration for the signature pad and its drawing engine

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::ImageLayer;
use crate::error::{Error, Result};

/// RGBA ink color, serialized as a CSS color string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InkColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl InkColor {
    pub const BLACK: InkColor = InkColor::rgba(0, 0, 0, 255);
    pub const TRANSPARENT: InkColor = InkColor::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Alpha as a 0.0-1.0 opacity, rounded to three decimals
    pub fn opacity(self) -> f32 {
        (self.a as f32 / 255.0 * 1000.0).round() / 1000.0
    }

    /// `#rrggbb` without alpha, for SVG paint attributes
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for InkColor {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Accepts any CSS color: names, hex, `rgb()`/`rgba()` in comma or space
/// syntax, `hsl()`, `hwb()` and percentage alpha
impl FromStr for InkColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parsed = csscolorparser::parse(s).map_err(|e| Error::InvalidColor {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        let [r, g, b, a] = parsed.to_rgba8();
        Ok(Self::rgba(r, g, b, a))
    }
}

impl fmt::Display for InkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({},{},{},{})",
            self.r,
            self.g,
            self.b,
            self.opacity()
        )
    }
}

impl TryFrom<String> for InkColor {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<InkColor> for String {
    fn from(color: InkColor) -> Self {
        color.to_string()
    }
}

/// Callback fired when a stroke begins or ends
#[derive(Clone)]
pub struct StrokeHook(Rc<dyn Fn()>);

impl StrokeHook {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl Default for StrokeHook {
    fn default() -> Self {
        Self::new(|| {})
    }
}

impl fmt::Debug for StrokeHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StrokeHook")
    }
}

/// Options forwarded to the drawing engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureOptions {
    /// Radius of a single-point stroke
    #[serde(default = "default_dot_size")]
    pub dot_size: f32,
    #[serde(default = "default_min_width")]
    pub min_width: f32,
    #[serde(default = "default_max_width")]
    pub max_width: f32,
    /// Minimum milliseconds between two captured points of a stroke
    #[serde(default = "default_throttle")]
    pub throttle: u64,
    /// Minimum distance between two captured points of a stroke
    #[serde(default = "default_min_distance")]
    pub min_distance: f32,
    #[serde(default = "default_background_color")]
    pub background_color: InkColor,
    #[serde(default)]
    pub pen_color: InkColor,
    #[serde(default = "default_velocity_filter_weight")]
    pub velocity_filter_weight: f32,
    #[serde(skip)]
    pub on_begin: StrokeHook,
    #[serde(skip)]
    pub on_end: StrokeHook,
}

fn default_dot_size() -> f32 {
    (default_min_width() + default_max_width()) / 2.0
}

fn default_min_width() -> f32 {
    0.5
}

fn default_max_width() -> f32 {
    2.5
}

fn default_throttle() -> u64 {
    16
}

fn default_min_distance() -> f32 {
    5.0
}

fn default_background_color() -> InkColor {
    InkColor::TRANSPARENT
}

fn default_velocity_filter_weight() -> f32 {
    0.7
}

impl Default for SignatureOptions {
    fn default() -> Self {
        Self {
            dot_size: default_dot_size(),
            min_width: default_min_width(),
            max_width: default_max_width(),
            throttle: default_throttle(),
            min_distance: default_min_distance(),
            background_color: default_background_color(),
            pen_color: InkColor::BLACK,
            velocity_filter_weight: default_velocity_filter_weight(),
            on_begin: StrokeHook::default(),
            on_end: StrokeHook::default(),
        }
    }
}

impl SignatureOptions {
    /// Parse options from JSON, ignoring unrecognized keys
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Location of the user's default options file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sigpad").join("options.json"))
    }

    /// Load options from disk, or return defaults if unavailable
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json_str(&json) {
                Ok(options) => options,
                Err(err) => {
                    log::warn!("Error loading options from {}, using defaults: {}", path.display(), err);
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("Could not read options file {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Save options to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply a partial update, returning the keys that were changed
    pub fn apply(&mut self, patch: &OptionsPatch) -> Vec<&'static str> {
        let mut applied = Vec::new();
        macro_rules! take {
            ($field:ident, $key:literal) => {
                if let Some(value) = &patch.$field {
                    self.$field = value.clone();
                    applied.push($key);
                }
            };
        }
        take!(dot_size, "dotSize");
        take!(min_width, "minWidth");
        take!(max_width, "maxWidth");
        take!(throttle, "throttle");
        take!(min_distance, "minDistance");
        take!(background_color, "backgroundColor");
        take!(pen_color, "penColor");
        take!(velocity_filter_weight, "velocityFilterWeight");
        take!(on_begin, "onBegin");
        take!(on_end, "onEnd");
        applied
    }
}

/// Partial options update; only keys the engine recognizes exist here
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsPatch {
    pub dot_size: Option<f32>,
    pub min_width: Option<f32>,
    pub max_width: Option<f32>,
    pub throttle: Option<u64>,
    pub min_distance: Option<f32>,
    pub background_color: Option<InkColor>,
    pub pen_color: Option<InkColor>,
    pub velocity_filter_weight: Option<f32>,
    #[serde(skip)]
    pub on_begin: Option<StrokeHook>,
    #[serde(skip)]
    pub on_end: Option<StrokeHook>,
}

impl OptionsPatch {
    pub const KNOWN_KEYS: [&'static str; 10] = [
        "dotSize",
        "minWidth",
        "maxWidth",
        "throttle",
        "minDistance",
        "backgroundColor",
        "penColor",
        "velocityFilterWeight",
        "onBegin",
        "onEnd",
    ];

    /// Build a patch from a JSON object; unknown keys are dropped
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(Error::Config("options patch must be a JSON object".into()));
        };
        for key in object.keys() {
            if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                log::debug!("Ignoring unrecognized option {key:?}");
            }
        }
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// CSS-like length used for the pad container
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Length {
    Px(f32),
    Percent(f32),
}

impl Length {
    /// Resolve against the parent extent
    pub fn resolve(self, parent: f32) -> f32 {
        match self {
            Length::Px(px) => px,
            Length::Percent(pct) => parent * pct / 100.0,
        }
    }
}

impl Default for Length {
    fn default() -> Self {
        Length::Percent(100.0)
    }
}

impl FromStr for Length {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        let invalid = || Error::Config(format!("invalid length {s:?}"));
        if let Some(pct) = value.strip_suffix('%') {
            pct.trim().parse().map(Length::Percent).map_err(|_| invalid())
        } else {
            let px = value.strip_suffix("px").unwrap_or(value);
            px.trim().parse().map(Length::Px).map_err(|_| invalid())
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(px) => write!(f, "{px}px"),
            Length::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

impl TryFrom<String> for Length {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Length> for String {
    fn from(length: Length) -> Self {
        length.to_string()
    }
}

/// Properties of a pad instance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PadConfig {
    #[serde(default)]
    pub width: Length,
    #[serde(default)]
    pub height: Length,
    /// Extra style entries for the container; they override width/height
    #[serde(default)]
    pub custom_style: BTreeMap<String, String>,
    #[serde(default)]
    pub options: SignatureOptions,
    /// Background layers painted beneath every composite
    #[serde(default)]
    pub images: Vec<ImageLayer>,
}

impl PadConfig {
    /// Inline style for the pad container
    pub fn container_style(&self) -> BTreeMap<String, String> {
        let mut style = BTreeMap::new();
        style.insert("width".to_string(), self.width.to_string());
        style.insert("height".to_string(), self.height.to_string());
        style.extend(self.custom_style.clone());
        style
    }
}
