//! Error types for the satchel crate.

use thiserror::Error;

/// Result type alias using the satchel error type.
pub type Result<T> = std::result::Result<T, SatchelError>;

/// Main error type for the crate.
///
/// The three request error kinds (`Timeout`, `HttpStatus`, `Transport`) are
/// deliberately separate variants so callers can match on the kind without
/// inspecting message strings.
#[derive(Error, Debug)]
pub enum SatchelError {
    /// The deadline elapsed before the underlying call settled.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The call completed but reported a non-success HTTP status.
    #[error("HTTP error! status: {status} {status_text}")]
    HttpStatus { status: u16, status_text: String },

    /// The call failed before completing (network unreachable, bad URL, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// General error from anyhow
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SatchelError {
    /// Returns true if this error is a deadline timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SatchelError::Timeout { .. })
    }

    /// Returns the HTTP status code, if this is an HTTP status error.
    pub fn status(&self) -> Option<u16> {
        match self {
            SatchelError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SatchelError {
    fn from(err: reqwest::Error) -> Self {
        SatchelError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinguishable() {
        let timeout = SatchelError::Timeout { timeout_ms: 50 };
        let http = SatchelError::HttpStatus {
            status: 404,
            status_text: "Not Found".to_string(),
        };
        let transport = SatchelError::Transport("connection refused".to_string());

        assert!(timeout.is_timeout());
        assert!(!http.is_timeout());
        assert_eq!(http.status(), Some(404));
        assert_eq!(timeout.status(), None);
        assert_eq!(transport.status(), None);
    }

    #[test]
    fn test_error_messages() {
        let timeout = SatchelError::Timeout { timeout_ms: 10000 };
        assert_eq!(timeout.to_string(), "request timed out after 10000ms");

        let http = SatchelError::HttpStatus {
            status: 503,
            status_text: "Service Unavailable".to_string(),
        };
        assert_eq!(
            http.to_string(),
            "HTTP error! status: 503 Service Unavailable"
        );
    }
}
