//! Construction options.
//!
//! Recognized keys use the camelCase names hosts already pass around
//! (`backSrc`, `maskSrc`, `penWidth`, ...). Zero and unset numeric values are
//! treated alike and fall back to the defaults below, except `penBlur` where
//! zero turns feathering off.

use crate::error::ScratchError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CLEAR_DURATION: f64 = 2.0;
pub const DEFAULT_PEN_WIDTH: f64 = 100.0;
pub const DEFAULT_PEN_BLUR: f64 = 50.0;

/// Stroke end cap style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

impl LineCap {
    /// The Canvas2D `lineCap` keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

/// Effective stroke styling used to erase the cover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub width: f64,
    pub cap: LineCap,
    /// Feather radius of the soft edge around the stroke.
    pub blur: f64,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            width: DEFAULT_PEN_WIDTH,
            cap: LineCap::Round,
            blur: DEFAULT_PEN_BLUR,
        }
    }
}

/// Immutable configuration captured at construction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScratcherOptions {
    /// Reward image revealed underneath.
    pub back_src: String,
    /// Cover image that gets scratched away.
    pub mask_src: String,
    /// Explicit surface width; disables responsive resizing.
    pub width: Option<u32>,
    /// Explicit surface height; disables responsive resizing.
    pub height: Option<u32>,
    /// Coverage fraction below which the cover fades out on its own.
    #[serde(alias = "clearThrehold")]
    pub clear_threshold: Option<f64>,
    /// Fade-out duration in seconds.
    pub clear_duration: Option<f64>,
    pub line_cap: Option<LineCap>,
    pub pen_width: Option<f64>,
    pub pen_blur: Option<f64>,
}

impl ScratcherOptions {
    pub fn new(mask_src: impl Into<String>, back_src: impl Into<String>) -> Self {
        Self {
            mask_src: mask_src.into(),
            back_src: back_src.into(),
            ..Default::default()
        }
    }

    /// Parse options from a JSON object.
    pub fn from_json(json: &str) -> Result<Self, ScratchError> {
        serde_json::from_str(json).map_err(|e| ScratchError::Options(e.to_string()))
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_clear(mut self, threshold: f64, duration: f64) -> Self {
        self.clear_threshold = Some(threshold);
        self.clear_duration = Some(duration);
        self
    }

    pub fn with_pen(mut self, width: f64, blur: f64, cap: LineCap) -> Self {
        self.pen_width = Some(width);
        self.pen_blur = Some(blur);
        self.line_cap = Some(cap);
        self
    }

    pub fn width(&self) -> Option<u32> {
        self.width.filter(|w| *w > 0)
    }

    pub fn height(&self) -> Option<u32> {
        self.height.filter(|h| *h > 0)
    }

    /// Threshold for auto-clear; `0.0` means auto-clear never fires.
    pub fn clear_threshold(&self) -> f64 {
        positive(self.clear_threshold).unwrap_or(0.0)
    }

    pub fn clear_duration(&self) -> f64 {
        positive(self.clear_duration).unwrap_or(DEFAULT_CLEAR_DURATION)
    }

    pub fn pen(&self) -> Pen {
        Pen {
            width: positive(self.pen_width).unwrap_or(DEFAULT_PEN_WIDTH),
            cap: self.line_cap.unwrap_or_default(),
            blur: self
                .pen_blur
                .filter(|b| b.is_finite() && *b >= 0.0)
                .unwrap_or(DEFAULT_PEN_BLUR),
        }
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}
