//! Error types for the preview crate (thiserror-based).

use thiserror::Error;

/// Errors that can occur while loading preview inputs.
#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input file path does not exist or is not a file.
    #[error("File not found: {path}")]
    NotFound { path: String },

    /// The document parsed but is structurally unusable.
    #[error("Invalid timeline document: {reason}")]
    InvalidDocument { reason: String },

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },
}

/// Convenience Result type for preview operations.
pub type PreviewResult<T> = Result<T, PreviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = PreviewError::NotFound {
            path: "/tmp/missing.json".into(),
        };
        assert_eq!(err.to_string(), "File not found: /tmp/missing.json");

        let err = PreviewError::InvalidDocument {
            reason: "duplicate element id clip-1".into(),
        };
        assert!(err.to_string().contains("clip-1"));
    }

    #[test]
    fn json_error_converts() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{ nope");
        let err: PreviewError = parse.unwrap_err().into();
        assert!(matches!(err, PreviewError::Json(_)));
        assert!(err.to_string().starts_with("JSON error:"));
    }
}
