//! Error types for backend calls.

use thiserror::Error;

/// Notification text for any transport-level failure.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your connection and try again.";
/// Notification text when the backend rejects a request without a reason.
pub const REJECTED_FALLBACK_MESSAGE: &str = "The request could not be completed.";

/// Errors that can occur while talking to the task backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection, timeout, or other transport failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-success HTTP status.
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// The response body was not the expected JSON envelope.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The backend answered `success: false`.
    #[error("Backend rejected request: {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        /// Reason supplied by the backend, if any.
        message: Option<String>,
    },

    /// The configured endpoint is not a usable URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl BackendError {
    /// True for failures that never reached a backend decision.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status(_) | Self::Decode(_))
    }

    /// Convert the error into a message suitable for end-users.
    #[must_use]
    pub fn describe_user_facing(&self) -> String {
        match self {
            Self::Rejected { message } => message
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .unwrap_or(REJECTED_FALLBACK_MESSAGE)
                .to_owned(),
            Self::InvalidEndpoint(detail) => format!("Invalid backend endpoint: {detail}"),
            Self::Network(_) | Self::Status(_) | Self::Decode(_) => {
                NETWORK_ERROR_MESSAGE.to_owned()
            }
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<url::ParseError> for BackendError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_share_generic_message() {
        for err in [
            BackendError::Network("refused".into()),
            BackendError::Status(502),
            BackendError::Decode("eof".into()),
        ] {
            assert!(err.is_transport());
            assert_eq!(err.describe_user_facing(), NETWORK_ERROR_MESSAGE);
        }
    }

    #[test]
    fn rejection_prefers_backend_message() {
        let err = BackendError::Rejected {
            message: Some("Tag already exists".into()),
        };
        assert!(!err.is_transport());
        assert_eq!(err.describe_user_facing(), "Tag already exists");

        let blank = BackendError::Rejected {
            message: Some("  ".into()),
        };
        assert_eq!(blank.describe_user_facing(), REJECTED_FALLBACK_MESSAGE);
        let missing = BackendError::Rejected { message: None };
        assert_eq!(missing.describe_user_facing(), REJECTED_FALLBACK_MESSAGE);
        assert_eq!(missing.to_string(), "Backend rejected request: no message");
    }
}
