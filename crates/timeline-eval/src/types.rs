//! Timeline data model types: Layer, Segment, Keyframe, Transition.
//!
//! These are the Rust-native timeline types supplied fresh each tick by the
//! document model. The evaluator consumes them to produce
//! [`RenderDescriptor`](rv_common::RenderDescriptor)s for the renderer.

use rv_common::{ElementId, MediaRef, Resolution, TextStyle, TimeCode};
use serde::{Deserialize, Serialize};

/// The visual part of a composition: stacked layers plus the transitions bound to them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Timeline {
    /// Canvas size; transition extents are measured against it. Documents
    /// without one use the configured canvas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas: Option<Resolution>,
    /// Ordered list of layers (index 0 = bottom-most in the stack).
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

impl Timeline {
    pub fn new(canvas: Resolution) -> Self {
        Self {
            canvas: Some(canvas),
            layers: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// The document's own canvas, or `fallback` when it declares none.
    pub fn canvas_or(&self, fallback: Resolution) -> Resolution {
        self.canvas.unwrap_or(fallback)
    }

    /// Add a layer on top of the stack and return a mutable reference to it.
    pub fn add_layer(&mut self) -> &mut Layer {
        self.layers.push(Layer::default());
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }

    /// Every visual segment that references media, with its reference.
    pub fn media_refs(&self) -> impl Iterator<Item = (&Segment, &MediaRef)> {
        self.layers
            .iter()
            .flat_map(|layer| layer.segments.iter())
            .filter_map(|segment| segment.media().map(|media| (segment, media)))
    }
}

/// A single layer containing segments in declaration order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl Layer {
    /// Add a segment to this layer. Does NOT sort; declaration order is kept.
    pub fn add_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }
}

/// A timed visual element placed on a layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Segment {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Where this segment starts on the timeline.
    pub timeline_start: TimeCode,
    /// Length on the timeline; must be positive.
    pub duration: TimeCode,
    #[serde(default)]
    pub props: BaseProps,
    /// Keyframe tracks, keyed by property. Times are relative to `timeline_start`.
    #[serde(default)]
    pub keyframes: Vec<KeyframeTrack>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

impl Segment {
    pub fn new(
        id: impl Into<String>,
        kind: ElementKind,
        timeline_start: TimeCode,
        duration: TimeCode,
    ) -> Self {
        Self {
            id: ElementId::new(id),
            kind,
            timeline_start,
            duration,
            props: BaseProps::default(),
            keyframes: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn timeline_end(&self) -> TimeCode {
        self.timeline_start + self.duration
    }

    pub fn has_valid_duration(&self) -> bool {
        self.duration.as_secs() > 0.0
    }

    /// Returns `true` if this segment is visible at the given time: `[start, start + duration)`.
    pub fn is_active_at(&self, time: TimeCode) -> bool {
        let t = time.as_secs();
        t >= self.timeline_start.as_secs() && t < self.timeline_end().as_secs()
    }

    /// Elapsed time since the segment's start.
    pub fn local_time(&self, time: TimeCode) -> TimeCode {
        time - self.timeline_start
    }

    /// Media reference for video/image segments; blank references count as missing.
    pub fn media(&self) -> Option<&MediaRef> {
        let media = match &self.kind {
            ElementKind::Video(video) => video.media.as_ref(),
            ElementKind::Image(image) => image.media.as_ref(),
            ElementKind::Text(_) => None,
        };
        media.filter(|m| !m.is_empty())
    }
}

/// Element shape, dispatched exhaustively by the assembler.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Video(VideoSource),
    Image(ImageSource),
    Text(TextContent),
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Video(_) => "video",
            Self::Image(_) => "image",
            Self::Text(_) => "text",
        }
    }

    pub fn needs_media(&self) -> bool {
        !matches!(self, Self::Text(_))
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VideoSource {
    pub media: Option<MediaRef>,
    /// Offset into the source media at which the segment starts.
    #[serde(default)]
    pub start_within_video: TimeCode,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ImageSource {
    pub media: Option<MediaRef>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
    #[serde(default)]
    pub style: TextStyle,
}

/// Static (non-keyframed) properties of a segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseProps {
    pub position_x: f32,
    pub position_y: f32,
    pub scale: f32,
    pub opacity: f32,
    pub crop: Crop,
}

impl Default for BaseProps {
    fn default() -> Self {
        Self {
            position_x: 0.0,
            position_y: 0.0,
            scale: 1.0,
            opacity: 1.0,
            crop: Crop::default(),
        }
    }
}

/// Crop percentages (0..=100) per side.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Crop {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// A named filter with a numeric or textual value, e.g. `brightness: 0.2`, `flip: "horizontal"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub name: String,
    pub value: FilterValue,
}

impl FilterSpec {
    pub fn new(name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(f32),
    Text(String),
}

impl FilterValue {
    /// Numeric view of the value; numeric strings are accepted.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl From<f32> for FilterValue {
    fn from(v: f32) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// A track of keyframes for animating a single property.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyframeTrack {
    pub property: AnimatableProperty,
    /// Keyframes, nominally sorted by time (relative to segment start).
    pub keyframes: Vec<Keyframe>,
}

/// Properties that can be animated with keyframes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimatableProperty {
    PositionX,
    PositionY,
    Scale,
    Opacity,
}

/// A single keyframe: value at a time. Interpolation is always linear.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: TimeCode,
    pub value: f32,
}

impl Keyframe {
    pub fn new(time: f64, value: f32) -> Self {
        Self {
            time: TimeCode::from_secs(time),
            value,
        }
    }
}

/// A time-bounded effect bound to one segment on one layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transition {
    pub segment_id: ElementId,
    pub layer: usize,
    pub kind: TransitionKind,
    pub role: TransitionRole,
    pub timeline_start: TimeCode,
    pub duration: TimeCode,
    #[serde(default)]
    pub parameters: TransitionParams,
}

impl Transition {
    pub fn new(
        segment_id: impl Into<String>,
        layer: usize,
        kind: TransitionKind,
        role: TransitionRole,
        timeline_start: TimeCode,
        duration: TimeCode,
    ) -> Self {
        Self {
            segment_id: ElementId::new(segment_id),
            layer,
            kind,
            role,
            timeline_start,
            duration,
            parameters: TransitionParams::default(),
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.parameters.direction = Some(direction);
        self
    }

    pub fn timeline_end(&self) -> TimeCode {
        self.timeline_start + self.duration
    }

    pub fn applies_to(&self, segment_id: &ElementId, layer: usize) -> bool {
        self.layer == layer && &self.segment_id == segment_id
    }

    /// Returns `true` if the window `[start, start + duration]` contains the time.
    pub fn is_active_at(&self, time: TimeCode) -> bool {
        let t = time.as_secs();
        t >= self.timeline_start.as_secs() && t <= self.timeline_end().as_secs()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Fade,
    Slide,
    Wipe,
    Zoom,
    Rotate,
    Push,
}

/// Whether the transition brings its segment in or takes it out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionRole {
    Incoming,
    Outgoing,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionParams {
    pub direction: Option<Direction>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Top,
    Bottom,
    In,
    Out,
    Clockwise,
    CounterClockwise,
}
