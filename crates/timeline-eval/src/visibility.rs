//! Visibility resolution: which segments are on screen at a given time.

use rv_common::TimeCode;
use tracing::debug;

use crate::types::{Layer, Segment};

/// A segment that is visible at the evaluated time.
#[derive(Clone, Debug)]
pub struct VisibleElement<'a> {
    pub segment: &'a Segment,
    pub layer_index: usize,
    /// `clock - segment.timeline_start`.
    pub local_time: TimeCode,
}

/// Resolve the visible segments at `clock`, in paint order (ascending layer index).
///
/// A layer contributes at most one element. When several segments of the same
/// layer cover `clock`, the one declared last wins; the others are shadowed.
pub fn resolve_visible(layers: &[Layer], clock: TimeCode) -> Vec<VisibleElement<'_>> {
    let mut visible = Vec::with_capacity(layers.len());

    for (layer_index, layer) in layers.iter().enumerate() {
        let mut winner: Option<&Segment> = None;
        for segment in &layer.segments {
            if !segment.is_active_at(clock) {
                continue;
            }
            if let Some(shadowed) = winner.replace(segment) {
                debug!(
                    layer = layer_index,
                    shadowed = %shadowed.id,
                    winner = %segment.id,
                    "Overlapping segments on one layer, last declared wins"
                );
            }
        }

        if let Some(segment) = winner {
            visible.push(VisibleElement {
                segment,
                layer_index,
                local_time: segment.local_time(clock),
            });
        }
    }

    visible
}
