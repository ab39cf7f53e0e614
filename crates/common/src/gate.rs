//! Readiness predicate shared by the evaluator and the resource cache.

use crate::types::ElementId;

/// Answers whether an element's decoded media is resident.
///
/// Draw and playback of media-backed elements are gated on this.
pub trait ReadinessGate {
    fn is_ready(&self, id: &ElementId) -> bool;
}

/// Gate that treats every element as ready (offline evaluation, tests).
#[derive(Copy, Clone, Debug, Default)]
pub struct AlwaysReady;

impl ReadinessGate for AlwaysReady {
    fn is_ready(&self, _id: &ElementId) -> bool {
        true
    }
}

impl<F> ReadinessGate for F
where
    F: Fn(&ElementId) -> bool,
{
    fn is_ready(&self, id: &ElementId) -> bool {
        self(id)
    }
}
