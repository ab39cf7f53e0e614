//! Error types for timeline evaluation.
//!
//! None of these abort a tick: they are collected per element in
//! [`FrameEvaluation::warnings`](crate::FrameEvaluation) and the element
//! (or the offending property) is skipped.

use rv_common::ElementId;
use thiserror::Error;

/// Errors that can occur during timeline evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineEvalError {
    #[error("Invalid crop on {element_id}: {reason}")]
    InvalidCropSpec {
        element_id: ElementId,
        reason: String,
    },

    #[error("Missing media reference for {kind} segment {element_id}")]
    MissingMediaReference {
        element_id: ElementId,
        kind: &'static str,
    },

    #[error("Invalid timeline: {reason}")]
    InvalidTimeline { reason: String },
}

pub type EvalResult<T> = Result<T, TimelineEvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TimelineEvalError::MissingMediaReference {
            element_id: ElementId::new("v1"),
            kind: "video",
        };
        assert_eq!(err.to_string(), "Missing media reference for video segment v1");

        let err = TimelineEvalError::InvalidTimeline {
            reason: "segment s has non-positive duration".into(),
        };
        assert!(err.to_string().contains("non-positive"));
    }
}
