//! Audio error types (thiserror-based).

use rv_common::ElementId;
use rv_media::LoadError;
use thiserror::Error;

/// Audio synchronization error, reported per segment in a tick's
/// [`SyncReport`](crate::SyncReport). None of these abort the tick.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    /// Playback was rejected by a user-gesture/autoplay policy.
    /// The caller must stop the clock; playback is not retried.
    #[error("Audio playback blocked for {element}: {reason}")]
    PlaybackBlocked { element: ElementId, reason: String },

    /// Any other playback rejection.
    #[error("Audio playback failed for {element}: {reason}")]
    PlaybackFailed { element: ElementId, reason: String },

    /// The segment's media could not be loaded or opened.
    #[error("Audio resource for {element} failed to load: {source}")]
    ResourceLoadFailure {
        element: ElementId,
        #[source]
        source: LoadError,
    },

    #[error("Audio segment {element} has no media reference")]
    MissingMediaReference { element: ElementId },
}

impl AudioError {
    pub fn element(&self) -> &ElementId {
        match self {
            Self::PlaybackBlocked { element, .. }
            | Self::PlaybackFailed { element, .. }
            | Self::ResourceLoadFailure { element, .. }
            | Self::MissingMediaReference { element } => element,
        }
    }

    /// Whether the playback session must end (clock forced to paused).
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::PlaybackBlocked { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = AudioError::PlaybackBlocked {
            element: ElementId::new("music"),
            reason: "NotAllowed".to_string(),
        };
        assert_eq!(err.to_string(), "Audio playback blocked for music: NotAllowed");
        assert!(err.is_fatal());
    }

    #[test]
    fn load_failure_keeps_source() {
        let err = AudioError::ResourceLoadFailure {
            element: ElementId::new("vo"),
            source: LoadError::NotFound {
                media: "vo.mp3".into(),
            },
        };
        assert!(err.to_string().contains("vo.mp3"));
        assert_eq!(err.element().as_str(), "vo");
        assert!(!err.is_fatal());
        assert!(std::error::Error::source(&err).is_some());
    }
}
