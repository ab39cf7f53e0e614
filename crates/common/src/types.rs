//! Core types with newtype pattern for type safety.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Time code in seconds (f64 precision).
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeCode(pub f64);

impl TimeCode {
    pub const ZERO: Self = Self(0.0);

    pub fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    pub fn as_secs(self) -> f64 {
        self.0
    }

}

impl Add for TimeCode {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TimeCode {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

/// Rational number for frame rates (e.g., 30000/1001 for 29.97fps).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    pub num: u32,
    pub den: u32,
}

impl Rational {
    pub const FPS_24: Self = Self { num: 24, den: 1 };
    pub const FPS_25: Self = Self { num: 25, den: 1 };
    pub const FPS_30: Self = Self { num: 30, den: 1 };
    pub const FPS_60: Self = Self { num: 60, den: 1 };

    pub fn new(num: u32, den: u32) -> Self {
        assert!(den > 0, "Rational denominator must be > 0");
        Self { num, den }
    }

    /// Duration of a single frame.
    pub fn frame_duration(self) -> TimeCode {
        TimeCode(self.den as f64 / self.num.max(1) as f64)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// Canvas or media resolution in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Portrait 1080x1920, the default preview canvas.
    pub const PORTRAIT_HD: Self = Self {
        width: 1080,
        height: 1920,
    };
    pub const HD: Self = Self {
        width: 1920,
        height: 1080,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Size as `[width, height]` in floating point pixels.
    pub fn as_size(self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::PORTRAIT_HD
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Identifier of a timeline element (visual segment or audio segment).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to media bytes (file path or URL) resolved by the external loader.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(pub String);

impl MediaRef {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty reference is treated the same as a missing one.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timecode_arithmetic() {
        let a = TimeCode::from_secs(2.5);
        let b = TimeCode::from_secs(1.0);
        assert!(((a - b).as_secs() - 1.5).abs() < 1e-12);
        assert!(((a + b).as_secs() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn rational_display() {
        assert_eq!(Rational::FPS_30.to_string(), "30");
        assert_eq!(Rational::new(30000, 1001).to_string(), "30000/1001");
    }

    #[test]
    fn frame_duration_at_25fps() {
        assert!((Rational::FPS_25.frame_duration().as_secs() - 0.04).abs() < 1e-12);
    }

    #[test]
    fn default_resolution_is_portrait() {
        let res = Resolution::default();
        assert_eq!(res.to_string(), "1080x1920");
        assert_eq!(res.as_size(), [1080.0, 1920.0]);
    }

    #[test]
    fn media_ref_blank_is_empty() {
        assert!(MediaRef::new("  ").is_empty());
        assert!(!MediaRef::new("videos/a.mp4").is_empty());
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&ElementId::new("seg-1")).unwrap();
        assert_eq!(json, "\"seg-1\"");
        let tc: TimeCode = serde_json::from_str("1.25").unwrap();
        assert_eq!(tc, TimeCode::from_secs(1.25));
    }
}
