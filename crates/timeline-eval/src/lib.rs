//! `rv-timeline-eval` — Timeline evaluation for the reelview preview core.
//!
//! This crate evaluates a timeline at a clock snapshot and produces a list of
//! [`RenderDescriptor`](rv_common::RenderDescriptor)s for the renderer. It handles:
//!
//! - **Visibility**: which segment of each layer is on screen at time T
//! - **Keyframe interpolation**: linear, with clamping and defensive sorting
//! - **Transitions**: fade, slide, push, wipe, zoom and rotate, folded last-writer-wins
//! - **Crop, filters, layout**: inset clips, filter descriptors, element box sizes
//!
//! # Usage
//!
//! ```rust
//! use rv_timeline_eval::{evaluate_frame, Timeline};
//! use rv_common::{AlwaysReady, ClockSnapshot, PreviewConfig, Resolution};
//!
//! let timeline = Timeline::new(Resolution::PORTRAIT_HD);
//! let frame = evaluate_frame(
//!     &timeline,
//!     &ClockSnapshot::playing(5.0),
//!     &AlwaysReady,
//!     &PreviewConfig::default(),
//! );
//! assert!(frame.descriptors.is_empty());
//! ```

pub mod crop;
pub mod error;
pub mod evaluator;
pub mod filter;
pub mod keyframe;
pub mod layout;
pub mod transition;
pub mod types;
pub mod visibility;

// Re-export primary API
pub use crop::crop_region;
pub use error::{EvalResult, TimelineEvalError};
pub use evaluator::{box_origin, evaluate_frame, FrameEvaluation};
pub use filter::{map_filters, MappedFilters};
pub use keyframe::{apply_keyframes, evaluate, evaluate_track, lerp, KeyframeValues};
pub use transition::{
    active_transitions, compute_progress, evaluate_transition, fold_effects, EffectDelta,
};
pub use types::{
    AnimatableProperty, BaseProps, Crop, Direction, ElementKind, FilterSpec, FilterValue,
    ImageSource, Keyframe, KeyframeTrack, Layer, Segment, TextContent, Timeline, Transition,
    TransitionKind, TransitionParams, TransitionRole, VideoSource,
};
pub use visibility::{resolve_visible, VisibleElement};
