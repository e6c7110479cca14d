use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for safari operations
#[derive(Error, Diagnostic, Debug)]
pub enum SafariError {
    #[error("IO error: {0}")]
    #[diagnostic(code(safari::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(safari::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(safari::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A user-supplied image could not be decoded. The caller may retry
    /// with a different image.
    #[error("Could not decode {source_name}: {message}")]
    #[diagnostic(
        code(safari::decode),
        help("Try another photo; JPEG, PNG, WebP and GIF are supported")
    )]
    Decode {
        source_name: String,
        message: String,
    },

    /// The frame overlay or the configuration is unusable; the photo
    /// feature cannot run until it is fixed.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(safari::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Network error: {message}")]
    #[diagnostic(
        code(safari::network),
        help("There was a problem sending your confirmation. Please try again.")
    )]
    Network { message: String },

    #[error("Timed out after {ms}ms waiting for {what}", ms = .after.as_millis())]
    #[diagnostic(code(safari::timeout), help("Try again; the image may be too large"))]
    Timeout { what: String, after: Duration },

    #[error("Validation error: {message}")]
    #[diagnostic(code(safari::validate))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Encode error: {message}")]
    #[diagnostic(code(safari::encode))]
    Encode { message: String },

    #[error("A capture is already in progress")]
    #[diagnostic(
        code(safari::busy),
        help("Wait for the current photo to finish or choose retake")
    )]
    Busy,

    #[error("{feature} is disabled")]
    #[diagnostic(code(safari::disabled))]
    Disabled {
        feature: String,
        #[help]
        help: Option<String>,
    },

    #[error("{action} requires admin mode")]
    #[diagnostic(
        code(safari::forbidden),
        help("Enable it with `safari settings set admin true`")
    )]
    Forbidden { action: String },
}

impl SafariError {
    /// Whether the user can reasonably retry the action that failed.
    ///
    /// Configuration problems are excluded: repeating the action cannot
    /// succeed until the configuration changes.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SafariError::Decode { .. }
                | SafariError::Network { .. }
                | SafariError::Timeout { .. }
                | SafariError::Busy
        )
    }
}

pub type Result<T> = std::result::Result<T, SafariError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let decode = SafariError::Decode {
            source_name: "photo.jpg".to_string(),
            message: "bad header".to_string(),
        };
        let config = SafariError::Config {
            message: "frame missing".to_string(),
            help: None,
        };
        let network = SafariError::Network {
            message: "connection refused".to_string(),
        };
        let timeout = SafariError::Timeout {
            what: "images".to_string(),
            after: Duration::from_millis(10),
        };

        assert!(decode.is_retryable());
        assert!(network.is_retryable());
        assert!(timeout.is_retryable());
        assert!(!config.is_retryable());
    }

    #[test]
    fn test_timeout_message() {
        let err = SafariError::Timeout {
            what: "source and overlay".to_string(),
            after: Duration::from_millis(1500),
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 1500ms waiting for source and overlay"
        );
    }
}
