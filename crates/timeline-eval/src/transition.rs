//! Transition evaluation for segments.
//!
//! Every transition bound to a visible segment whose window contains the
//! current time produces an [`EffectDelta`]. Deltas are folded in declaration
//! order with last-writer-wins semantics: a field set by a later transition
//! replaces the earlier value, and nothing is blended or summed.

use rv_common::{ElementId, InsetRect, Resolution, TimeCode};

use crate::keyframe::lerp;
use crate::types::{Direction, Transition, TransitionKind, TransitionRole};

/// Property overrides produced by transitions for one element at one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectDelta {
    /// Replaces the keyframed opacity.
    pub opacity: Option<f32>,
    /// Added to the keyframed position (canvas pixels).
    pub dx: Option<f32>,
    pub dy: Option<f32>,
    /// Inset clip, fractions of the element box.
    pub clip: Option<InsetRect>,
    /// Multiplies the keyframed scale.
    pub scale: Option<f32>,
    /// Rotation in degrees.
    pub rotate: Option<f32>,
}

impl EffectDelta {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Combine with a later delta: every field `later` sets wins.
    pub fn overwrite_with(self, later: EffectDelta) -> EffectDelta {
        EffectDelta {
            opacity: later.opacity.or(self.opacity),
            dx: later.dx.or(self.dx),
            dy: later.dy.or(self.dy),
            clip: later.clip.or(self.clip),
            scale: later.scale.or(self.scale),
            rotate: later.rotate.or(self.rotate),
        }
    }
}

/// Compute the transition progress at `time`.
///
/// Returns a value in [0.0, 1.0]; a non-positive duration yields 1.0.
pub fn compute_progress(transition: &Transition, time: TimeCode) -> f32 {
    let elapsed = time.as_secs() - transition.timeline_start.as_secs();
    let duration = transition.duration.as_secs();

    if duration <= 0.0 {
        return 1.0;
    }

    (elapsed / duration).clamp(0.0, 1.0) as f32
}

/// Transitions bound to `segment_id` on `layer` whose window contains `time`, in declaration order.
pub fn active_transitions<'a>(
    transitions: &'a [Transition],
    segment_id: &'a ElementId,
    layer: usize,
    time: TimeCode,
) -> impl Iterator<Item = &'a Transition> + 'a {
    transitions
        .iter()
        .filter(move |t| t.applies_to(segment_id, layer) && t.is_active_at(time))
}

/// Evaluate one transition at the given progress against the canvas extents.
pub fn evaluate_transition(
    transition: &Transition,
    progress: f32,
    canvas: Resolution,
) -> EffectDelta {
    let p = progress.clamp(0.0, 1.0);
    let incoming = transition.role == TransitionRole::Incoming;
    let direction = transition.parameters.direction;
    let [width, height] = canvas.as_size();

    match transition.kind {
        TransitionKind::Fade => EffectDelta {
            opacity: Some(if incoming {
                lerp(0.0, 1.0, p)
            } else {
                lerp(1.0, 0.0, p)
            }),
            ..Default::default()
        },
        TransitionKind::Slide => {
            let direction = direction.unwrap_or(Direction::Right);
            // Incoming enters from the side opposite its travel; outgoing leaves the other way.
            let (axis, extent, from_sign) = match direction {
                Direction::Right => (Axis::X, width, 1.0),
                Direction::Left => (Axis::X, width, -1.0),
                Direction::Top => (Axis::Y, height, -1.0),
                Direction::Bottom => (Axis::Y, height, 1.0),
                _ => return EffectDelta::default(),
            };
            let offset = if incoming {
                lerp(from_sign * extent, 0.0, p)
            } else {
                lerp(0.0, -from_sign * extent, p)
            };
            axis.delta(offset)
        }
        TransitionKind::Push => {
            let direction = direction.unwrap_or(Direction::Right);
            // Both roles travel the same net way: in from -sign, out towards +sign.
            let (axis, extent, sign) = match direction {
                Direction::Right => (Axis::X, width, 1.0),
                Direction::Left => (Axis::X, width, -1.0),
                Direction::Top => (Axis::Y, height, -1.0),
                Direction::Bottom => (Axis::Y, height, 1.0),
                _ => return EffectDelta::default(),
            };
            let offset = if incoming {
                lerp(-sign * extent, 0.0, p)
            } else {
                lerp(0.0, sign * extent, p)
            };
            axis.delta(offset)
        }
        TransitionKind::Wipe => {
            let amount = if incoming { 1.0 - p } else { p };
            let inset = match direction.unwrap_or(Direction::Left) {
                Direction::Left => InsetRect::new(0.0, amount, 0.0, 0.0),
                Direction::Right => InsetRect::new(0.0, 0.0, 0.0, amount),
                Direction::Top => InsetRect::new(amount, 0.0, 0.0, 0.0),
                Direction::Bottom => InsetRect::new(0.0, 0.0, amount, 0.0),
                _ => return EffectDelta::default(),
            };
            EffectDelta {
                clip: Some(inset),
                ..Default::default()
            }
        }
        TransitionKind::Zoom => {
            let zoom_in = direction.unwrap_or(Direction::In) == Direction::In;
            let scale = match (incoming, zoom_in) {
                (true, true) => lerp(0.1, 1.0, p),
                (true, false) => lerp(2.0, 1.0, p),
                (false, true) => lerp(1.0, 0.1, p),
                (false, false) => lerp(1.0, 2.0, p),
            };
            EffectDelta {
                scale: Some(scale),
                ..Default::default()
            }
        }
        TransitionKind::Rotate => {
            let speed = match direction.unwrap_or(Direction::Clockwise) {
                Direction::Clockwise => ROTATION_DEG_PER_SEC,
                _ => -ROTATION_DEG_PER_SEC,
            };
            let angle = speed * transition.duration.as_secs() as f32;
            EffectDelta {
                rotate: Some(if incoming {
                    lerp(angle, 0.0, p)
                } else {
                    lerp(0.0, angle, p)
                }),
                ..Default::default()
            }
        }
    }
}

/// Degrees per second of transition duration for `Rotate`.
const ROTATION_DEG_PER_SEC: f32 = 720.0;

#[derive(Copy, Clone)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn delta(self, offset: f32) -> EffectDelta {
        match self {
            Axis::X => EffectDelta {
                dx: Some(offset),
                ..Default::default()
            },
            Axis::Y => EffectDelta {
                dy: Some(offset),
                ..Default::default()
            },
        }
    }
}

/// Fold every active transition of one element into a single delta.
pub fn fold_effects(
    transitions: &[Transition],
    segment_id: &ElementId,
    layer: usize,
    time: TimeCode,
    canvas: Resolution,
) -> EffectDelta {
    active_transitions(transitions, segment_id, layer, time).fold(
        EffectDelta::default(),
        |acc, transition| {
            let progress = compute_progress(transition, time);
            acc.overwrite_with(evaluate_transition(transition, progress, canvas))
        },
    )
}
