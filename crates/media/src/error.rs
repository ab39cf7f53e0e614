//! Error types for media loading (thiserror-based).

use thiserror::Error;

/// Errors a [`MediaLoader`](crate::MediaLoader) can report for one load.
///
/// Cloneable: a failed cache entry keeps its error until the caller retries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The media reference does not resolve to anything.
    #[error("Media not found: {media}")]
    NotFound { media: String },

    /// Reading the media bytes failed.
    #[error("IO error loading {media}: {message}")]
    Io { media: String, message: String },

    /// The bytes were read but could not be turned into a usable resource.
    #[error("Failed to decode {media}: {reason}")]
    Decode { media: String, reason: String },

    /// The loader cannot handle this reference or resource kind.
    #[error("Unsupported media {media}: {reason}")]
    Unsupported { media: String, reason: String },

    /// The load was abandoned before it produced a resource.
    #[error("Load cancelled: {media}")]
    Cancelled { media: String },
}

impl LoadError {
    pub fn io(media: impl Into<String>, err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound {
                media: media.into(),
            };
        }
        Self::Io {
            media: media.into(),
            message: err.to_string(),
        }
    }
}

/// Convenience Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(
            LoadError::io("a.mp4", &err),
            LoadError::NotFound {
                media: "a.mp4".into()
            }
        );
    }

    #[test]
    fn error_display_messages() {
        let err = LoadError::Decode {
            media: "b.png".into(),
            reason: "truncated header".into(),
        };
        assert!(err.to_string().contains("truncated header"));

        let err = LoadError::io(
            "c.wav",
            &std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("c.wav"));
    }
}
