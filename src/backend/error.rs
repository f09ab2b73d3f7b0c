//! Error types for backend API operations.

use thiserror::Error;

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors that can occur while talking to one backend environment.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Session login failed or no session is established.
    #[error("authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The named resource does not exist in the backend.
    #[error("resource '{name}' of kind '{kind}' not found")]
    NotFound { kind: String, name: String },

    /// A record returned by the backend does not have the shape the
    /// plugin requires. This is a data-integrity failure, not a
    /// filtering edge case.
    #[error("malformed {kind} record: {reason}")]
    MalformedRecord { kind: String, reason: String },

    /// The backend reported an API-level error.
    #[error("backend returned error {code}: {message}")]
    Api { code: i64, message: String },

    /// Transport-level failure (connection, TLS, unexpected status).
    #[error("request failed: {message}")]
    Transport { message: String },

    /// The lookup did not complete within the per-call deadline.
    #[error("lookup timed out after {}ms", timeout.as_millis())]
    Timeout { timeout: std::time::Duration },
}

impl BackendError {
    /// Create an authentication failure.
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed { message: message.into() }
    }

    /// Create a not-found error for a resource kind and name.
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound { kind: kind.into(), name: name.into() }
    }

    /// Create a malformed-record error.
    pub fn malformed_record(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord { kind: kind.into(), reason: reason.into() }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport { message: error.to_string() }
    }
}
