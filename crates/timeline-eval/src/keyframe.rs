//! Keyframe interpolation.
//!
//! Given a list of keyframes and a time value, this module computes the
//! linearly interpolated property value, clamping outside the keyed range.

use std::borrow::Cow;
use std::cmp::Ordering;

use rv_common::TimeCode;

use crate::types::{AnimatableProperty, BaseProps, Keyframe, KeyframeTrack};

/// Linear interpolation with `t` clamped to `[0, 1]`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Evaluate a list of keyframes at a given time.
///
/// - empty list: `default`
/// - at or before the first keyframe: first value
/// - at or after the last keyframe: last value
/// - otherwise linear interpolation between the bracketing pair
///
/// Keyframes need not be sorted; an unsorted list is stably sorted into a
/// scratch copy. With duplicate timestamps the first bracketing pair in that
/// order is used.
pub fn evaluate(keyframes: &[Keyframe], time: TimeCode, default: f32) -> f32 {
    if keyframes.is_empty() {
        return default;
    }

    let sorted = sorted_keyframes(keyframes);
    let t = time.as_secs();

    let first = &sorted[0];
    if t <= first.time.as_secs() {
        return first.value;
    }
    let last = &sorted[sorted.len() - 1];
    if t >= last.time.as_secs() {
        return last.value;
    }

    for pair in sorted.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let (t_a, t_b) = (a.time.as_secs(), b.time.as_secs());
        if t >= t_a && t <= t_b {
            let span = t_b - t_a;
            if span <= 0.0 {
                return a.value;
            }
            return lerp(a.value, b.value, ((t - t_a) / span) as f32);
        }
    }

    // Unreachable for ordered tracks; NaN times end up here.
    default
}

/// Evaluate a keyframe track at a given time (relative to segment start).
pub fn evaluate_track(track: &KeyframeTrack, time: TimeCode, default: f32) -> f32 {
    evaluate(&track.keyframes, time, default)
}

fn sorted_keyframes(keyframes: &[Keyframe]) -> Cow<'_, [Keyframe]> {
    let in_order = keyframes
        .windows(2)
        .all(|w| w[0].time.as_secs() <= w[1].time.as_secs());
    if in_order {
        return Cow::Borrowed(keyframes);
    }
    let mut owned = keyframes.to_vec();
    // `sort_by` is stable: equal timestamps keep declaration order.
    owned.sort_by(|a, b| {
        a.time
            .as_secs()
            .partial_cmp(&b.time.as_secs())
            .unwrap_or(Ordering::Equal)
    });
    Cow::Owned(owned)
}

/// Interpolated animatable properties for a segment at a given time.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeValues {
    pub position_x: f32,
    pub position_y: f32,
    pub scale: f32,
    pub opacity: f32,
}

/// Apply keyframe animation to segment properties.
///
/// Each property defaults to its base value when it has no track. When a
/// property has more than one track, the last one wins.
/// `local_time` should be relative to the segment's `timeline_start`.
pub fn apply_keyframes(
    tracks: &[KeyframeTrack],
    local_time: TimeCode,
    props: &BaseProps,
) -> KeyframeValues {
    let mut values = KeyframeValues {
        position_x: props.position_x,
        position_y: props.position_y,
        scale: props.scale,
        opacity: props.opacity,
    };

    for track in tracks {
        match track.property {
            AnimatableProperty::PositionX => {
                values.position_x = evaluate_track(track, local_time, props.position_x)
            }
            AnimatableProperty::PositionY => {
                values.position_y = evaluate_track(track, local_time, props.position_y)
            }
            AnimatableProperty::Scale => {
                values.scale = evaluate_track(track, local_time, props.scale)
            }
            AnimatableProperty::Opacity => {
                values.opacity = evaluate_track(track, local_time, props.opacity)
            }
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(times_values: &[(f64, f32)]) -> Vec<Keyframe> {
        times_values
            .iter()
            .map(|&(t, v)| Keyframe::new(t, v))
            .collect()
    }

    fn at(secs: f64) -> TimeCode {
        TimeCode::from_secs(secs)
    }

    #[test]
    fn empty_track_returns_default() {
        assert!((evaluate(&[], at(1.0), 0.42) - 0.42).abs() < 1e-6);
        assert!((evaluate(&[], at(-3.0), -7.0) + 7.0).abs() < 1e-6);
    }

    #[test]
    fn single_keyframe_returns_value() {
        let kfs = track(&[(2.0, 0.75)]);
        assert!((evaluate(&kfs, at(0.0), 0.0) - 0.75).abs() < 1e-6);
        assert!((evaluate(&kfs, at(5.0), 0.0) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn linear_interpolation_midpoint() {
        let kfs = track(&[(0.0, 0.0), (10.0, 100.0)]);
        assert!((evaluate(&kfs, at(5.0), -1.0) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn clamps_before_first_and_after_last() {
        let kfs = track(&[(1.0, 5.0), (2.0, 10.0)]);
        assert!((evaluate(&kfs, at(0.0), 0.0) - 5.0).abs() < 1e-6);
        assert!((evaluate(&kfs, at(1.0), 0.0) - 5.0).abs() < 1e-6);
        assert!((evaluate(&kfs, at(2.0), 0.0) - 10.0).abs() < 1e-6);
        assert!((evaluate(&kfs, at(99.0), 0.0) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn multi_segment_linear() {
        let kfs = track(&[(0.0, 0.0), (1.0, 10.0), (2.0, 5.0)]);
        assert!((evaluate(&kfs, at(0.5), 0.0) - 5.0).abs() < 1e-5);
        assert!((evaluate(&kfs, at(1.5), 0.0) - 7.5).abs() < 1e-5);
    }

    #[test]
    fn unsorted_track_is_sorted_before_evaluation() {
        let kfs = track(&[(10.0, 100.0), (0.0, 0.0)]);
        assert!((evaluate(&kfs, at(5.0), -1.0) - 50.0).abs() < 1e-4);
        assert!((evaluate(&kfs, at(-1.0), -1.0)).abs() < 1e-6);
    }

    #[test]
    fn duplicate_timestamps_use_first_bracketing_pair() {
        let kfs = track(&[(0.0, 0.0), (1.0, 5.0), (1.0, 10.0), (2.0, 20.0)]);
        assert!((evaluate(&kfs, at(1.0), 0.0) - 5.0).abs() < 1e-6);
        assert!((evaluate(&kfs, at(1.5), 0.0) - 15.0).abs() < 1e-5);
    }

    #[test]
    fn lerp_clamps_t() {
        assert!((lerp(0.0, 10.0, -1.0)).abs() < 1e-6);
        assert!((lerp(0.0, 10.0, 2.0) - 10.0).abs() < 1e-6);
        assert!((lerp(1.0, 0.0, 0.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn apply_keyframes_falls_back_to_base_props() {
        let props = BaseProps {
            position_x: 30.0,
            position_y: -10.0,
            scale: 2.0,
            opacity: 0.9,
            ..Default::default()
        };
        let tracks = vec![
            KeyframeTrack {
                property: AnimatableProperty::Opacity,
                keyframes: track(&[(0.0, 0.0), (1.0, 1.0)]),
            },
            KeyframeTrack {
                property: AnimatableProperty::PositionX,
                keyframes: track(&[(0.0, 100.0), (1.0, 200.0)]),
            },
            KeyframeTrack {
                property: AnimatableProperty::Scale,
                keyframes: vec![],
            },
        ];

        let values = apply_keyframes(&tracks, at(0.5), &props);
        assert!((values.opacity - 0.5).abs() < 1e-6);
        assert!((values.position_x - 150.0).abs() < 1e-4);
        assert!((values.position_y + 10.0).abs() < 1e-6);
        assert!((values.scale - 2.0).abs() < 1e-6);
    }
}
