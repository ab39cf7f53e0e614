//! Core frame evaluation: `evaluate_frame()` takes a timeline and a clock
//! snapshot and produces the render descriptors for the renderer.
//!
//! The evaluation process:
//! 1. Resolve the visible segments (one per layer, bottom-to-top).
//! 2. Apply keyframe interpolation to get current property values.
//! 3. Fold the active transitions into one effect delta.
//! 4. Validate the crop and combine it with the transition clip.
//! 5. Map filters and lay out the element box.
//! 6. Produce `Vec<RenderDescriptor>` in paint order.
//!
//! Failures are isolated per element: a bad crop drops the crop, a missing
//! media reference drops the element, and everything else still renders.

use rv_common::{
    ClipRegion, ClockSnapshot, DrawSource, ElementId, PreviewConfig, ReadinessGate,
    RenderDescriptor, Resolution, Transform2D,
};
use tracing::{debug, warn};

use crate::crop::crop_region;
use crate::error::TimelineEvalError;
use crate::filter::{map_filters, MappedFilters};
use crate::keyframe::{apply_keyframes, KeyframeValues};
use crate::layout::{image_size, text_metrics, video_size};
use crate::transition::{fold_effects, EffectDelta};
use crate::types::{ElementKind, Timeline};
use crate::visibility::{resolve_visible, VisibleElement};

/// Everything one tick of evaluation produced.
#[derive(Clone, Debug, Default)]
pub struct FrameEvaluation {
    /// Descriptors in paint order (ascending `z_order`).
    pub descriptors: Vec<RenderDescriptor>,
    /// Visible elements whose media is not resident yet; not drawn this tick.
    pub pending: Vec<ElementId>,
    /// Non-fatal problems encountered this tick.
    pub warnings: Vec<TimelineEvalError>,
}

/// Evaluate the timeline at the clock position.
///
/// This is the main entry point for timeline evaluation. It resolves
/// visibility, keyframes, transitions, crop and filters for every visible
/// segment. Media-backed elements are only emitted once `gate` reports them
/// ready.
pub fn evaluate_frame(
    timeline: &Timeline,
    clock: &ClockSnapshot,
    gate: &impl ReadinessGate,
    config: &PreviewConfig,
) -> FrameEvaluation {
    let mut frame = FrameEvaluation::default();
    let canvas = timeline.canvas_or(config.canvas);

    for (layer_index, layer) in timeline.layers.iter().enumerate() {
        for segment in layer.segments.iter().filter(|s| !s.has_valid_duration()) {
            let err = TimelineEvalError::InvalidTimeline {
                reason: format!(
                    "segment {} on layer {} has non-positive duration {}",
                    segment.id, layer_index, segment.duration
                ),
            };
            warn!(element = %segment.id, "{err}");
            frame.warnings.push(err);
        }
    }

    let visible = resolve_visible(&timeline.layers, clock.current_time);
    for element in &visible {
        match evaluate_element(timeline, canvas, element, clock, config, &mut frame.warnings) {
            Ok(descriptor) => {
                if element.segment.kind.needs_media() && !gate.is_ready(&element.segment.id) {
                    debug!(element = %element.segment.id, "Media not ready, draw deferred");
                    frame.pending.push(element.segment.id.clone());
                } else {
                    frame.descriptors.push(descriptor);
                }
            }
            Err(err) => {
                warn!(element = %element.segment.id, "{err}");
                frame.warnings.push(err);
            }
        }
    }

    frame
}

/// Evaluate a single visible element, producing its `RenderDescriptor`.
///
/// Crop problems are pushed to `warnings` and evaluation continues unclipped;
/// a missing media reference is returned as the error.
fn evaluate_element(
    timeline: &Timeline,
    canvas: Resolution,
    element: &VisibleElement<'_>,
    clock: &ClockSnapshot,
    config: &PreviewConfig,
    warnings: &mut Vec<TimelineEvalError>,
) -> Result<RenderDescriptor, TimelineEvalError> {
    let segment = element.segment;
    let local_time = element.local_time;

    let (source, size) = match &segment.kind {
        ElementKind::Video(video) => {
            let media = segment.media().ok_or_else(|| missing_media(segment.id.clone(), "video"))?;
            (
                DrawSource::Video {
                    media: media.clone(),
                    source_time: local_time + video.start_within_video,
                },
                video_size(video),
            )
        }
        ElementKind::Image(image) => {
            let media = segment.media().ok_or_else(|| missing_media(segment.id.clone(), "image"))?;
            (
                DrawSource::Image {
                    media: media.clone(),
                },
                image_size(image, canvas),
            )
        }
        ElementKind::Text(text) => {
            let metrics = text_metrics(text, &config.text);
            (
                DrawSource::Text {
                    text: text.text.clone(),
                    style: text.style.clone(),
                    font_size: metrics.font_size,
                    line_height: metrics.line_height,
                },
                metrics.size,
            )
        }
    };

    let kf_values = apply_keyframes(&segment.keyframes, local_time, &segment.props);
    let delta = fold_effects(
        &timeline.transitions,
        &segment.id,
        element.layer_index,
        clock.current_time,
        canvas,
    );

    let mut clip = ClipRegion::default();
    match crop_region(&segment.id, &segment.props.crop) {
        Ok(Some(inset)) => clip.push(inset),
        Ok(None) => {}
        Err(err) => {
            warn!(element = %segment.id, "{err}");
            warnings.push(err);
        }
    }
    if let Some(inset) = delta.clip {
        clip.push(inset);
    }

    let mapped = map_filters(&segment.filters);
    let transform = build_transform(&kf_values, &delta, &mapped);
    let opacity = delta.opacity.unwrap_or(kf_values.opacity).clamp(0.0, 1.0);

    Ok(RenderDescriptor {
        element_id: segment.id.clone(),
        z_order: element.layer_index as i32,
        source,
        size,
        transform,
        opacity,
        clip,
        filters: mapped.filters,
    })
}

fn missing_media(element_id: ElementId, kind: &'static str) -> TimelineEvalError {
    TimelineEvalError::MissingMediaReference { element_id, kind }
}

/// Compose keyframed values, the transition delta and transform filters.
fn build_transform(kf: &KeyframeValues, delta: &EffectDelta, filters: &MappedFilters) -> Transform2D {
    let scale = kf.scale * delta.scale.unwrap_or(1.0);
    let [flip_x, flip_y] = filters.flip_scale();
    Transform2D {
        position: [
            kf.position_x + delta.dx.unwrap_or(0.0),
            kf.position_y + delta.dy.unwrap_or(0.0),
        ],
        scale: [scale * flip_x, scale * flip_y],
        rotation: filters.rotation.unwrap_or(0.0) + delta.rotate.unwrap_or(0.0),
        ..Transform2D::default()
    }
}

/// Canvas-space top-left corner of a descriptor's (unscaled) box.
pub fn box_origin(descriptor: &RenderDescriptor, canvas: Resolution) -> [f32; 2] {
    let [cw, ch] = canvas.as_size();
    [
        cw / 2.0 - descriptor.size[0] / 2.0 + descriptor.transform.position[0],
        ch / 2.0 - descriptor.size[1] / 2.0 + descriptor.transform.position[1],
    ]
}
