//! Abstract filter descriptors handed to the renderer.

use serde::{Deserialize, Serialize};

/// A single image filter, in renderer-neutral form.
///
/// Values follow the CSS filter convention: `Brightness(1.0)` and
/// `Contrast(1.0)` are identity, `HueRotate` is in whole degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FilterDesc {
    Brightness(f32),
    Contrast(f32),
    Saturate(f32),
    HueRotate(i32),
    Grayscale,
    Invert,
}

impl FilterDesc {
    /// CSS-style name, e.g. for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Brightness(_) => "brightness",
            Self::Contrast(_) => "contrast",
            Self::Saturate(_) => "saturate",
            Self::HueRotate(_) => "hue-rotate",
            Self::Grayscale => "grayscale",
            Self::Invert => "invert",
        }
    }
}

/// Axis mirrored by a flip filter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

impl FlipAxis {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Some(Self::Horizontal),
            "vertical" => Some(Self::Vertical),
            _ => None,
        }
    }
}
