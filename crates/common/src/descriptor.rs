//! Render descriptor — interface between timeline-eval and the external renderer.

use serde::{Deserialize, Serialize};

use crate::filter::FilterDesc;
use crate::types::{ElementId, MediaRef, TimeCode};

/// 2D transform applied to an element box.
///
/// The renderer centres the element box on the canvas, then translates by
/// `position`, and scales/rotates around `anchor`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    /// Translation in canvas pixels, relative to the centred placement.
    pub position: [f32; 2],
    /// Scale factors (1.0 = intrinsic size; negative = mirrored).
    pub scale: [f32; 2],
    /// Rotation in degrees, clockwise.
    pub rotation: f32,
    /// Anchor point in box-relative coordinates (0.5, 0.5 = center).
    pub anchor: [f32; 2],
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0],
            scale: [1.0, 1.0],
            rotation: 0.0,
            anchor: [0.5, 0.5],
        }
    }
}

/// Rectangular inset, each side a fraction (0..1) of the element box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InsetRect {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl InsetRect {
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Intersection of two inset regions: the larger inset wins on every side.
    pub fn intersect(&self, other: &InsetRect) -> InsetRect {
        InsetRect {
            top: self.top.max(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
            left: self.left.max(other.left),
        }
    }

    /// True when nothing of the box remains visible.
    pub fn is_fully_clipped(&self) -> bool {
        self.left + self.right >= 1.0 || self.top + self.bottom >= 1.0
    }
}

/// Ordered list of insets; the visible area is their intersection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipRegion {
    pub insets: Vec<InsetRect>,
}

impl ClipRegion {
    pub fn push(&mut self, inset: InsetRect) {
        self.insets.push(inset);
    }

    pub fn is_empty(&self) -> bool {
        self.insets.is_empty()
    }

    /// Collapse the list into a single inset, or `None` when unclipped.
    pub fn effective(&self) -> Option<InsetRect> {
        let mut iter = self.insets.iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, inset| acc.intersect(inset)))
    }
}

/// Horizontal text alignment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Text styling forwarded untouched to the renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub font_family: String,
    /// CSS-style color string.
    pub font_color: String,
    pub alignment: TextAlign,
    pub background_color: Option<String>,
    pub background_opacity: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_color: "#FFFFFF".to_string(),
            alignment: TextAlign::Center,
            background_color: None,
            background_opacity: 1.0,
        }
    }
}

/// What the renderer should draw for an element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DrawSource {
    Video {
        media: MediaRef,
        /// Position inside the source media to present.
        source_time: TimeCode,
    },
    Image {
        media: MediaRef,
    },
    Text {
        text: String,
        style: TextStyle,
        font_size: f32,
        line_height: f32,
    },
}

/// Complete description of an element to draw at the current tick.
/// Produced by timeline-eval, consumed by the renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderDescriptor {
    pub element_id: ElementId,
    /// Layer index; lower = behind, painted first.
    pub z_order: i32,
    pub source: DrawSource,
    /// Unscaled box size in pixels.
    pub size: [f32; 2],
    pub transform: Transform2D,
    /// Opacity (0..1).
    pub opacity: f32,
    pub clip: ClipRegion,
    /// Filters, in application order.
    pub filters: Vec<FilterDesc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_transform_is_identity() {
        let t = Transform2D::default();
        assert_eq!(t.position, [0.0, 0.0]);
        assert_eq!(t.scale, [1.0, 1.0]);
        assert_eq!(t.rotation, 0.0);
        assert_eq!(t.anchor, [0.5, 0.5]);
    }

    #[test]
    fn empty_clip_region_has_no_effective_inset() {
        assert!(ClipRegion::default().effective().is_none());
    }

    #[test]
    fn clip_region_intersects_insets() {
        let mut clip = ClipRegion::default();
        clip.push(InsetRect::new(0.1, 0.0, 0.0, 0.2));
        clip.push(InsetRect::new(0.0, 0.5, 0.0, 0.1));
        let eff = clip.effective().unwrap();
        assert_eq!(eff, InsetRect::new(0.1, 0.5, 0.0, 0.2));
        assert!(!eff.is_fully_clipped());
    }

    #[test]
    fn fully_clipped_inset() {
        assert!(InsetRect::new(0.0, 0.6, 0.0, 0.4).is_fully_clipped());
        assert!(!InsetRect::new(0.2, 0.0, 0.2, 0.0).is_fully_clipped());
    }

    #[test]
    fn draw_source_is_tagged() {
        let src = DrawSource::Image {
            media: MediaRef::new("photos/a.png"),
        };
        let json = serde_json::to_string(&src).unwrap();
        assert!(json.contains("\"type\":\"image\""));
    }
}
