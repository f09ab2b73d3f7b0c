//! # Error Handling
//!
//! Crate-level error types for the certmeta plugin, defined with
//! `thiserror`. Backend lookup errors have their own type in
//! [`crate::backend::BackendError`]; the variants here cover everything
//! that can fail an Initialize call or the plugin transport itself.

/// Custom result type for certmeta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the certmeta plugin
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The top-level `environments` config value has the wrong shape.
    /// Fatal to Initialize.
    #[error("invalid 'environments' config: {0}")]
    Environments(String),

    /// Configuration errors (decode failure, missing required field).
    /// Fatal to Initialize; carries the environment the config belongs to.
    #[error("invalid config for environment '{environment}': {message}")]
    Config { environment: String, message: String },

    /// Session login against a backend environment failed. Fatal to
    /// Initialize: the whole registry build is aborted.
    #[error("failed to create backend client for environment '{environment}': {message}")]
    ClientSetup { environment: String, message: String },

    /// Serialization/deserialization errors on the plugin wire
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors on the plugin transport
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error scoped to one environment
    pub fn config<E: Into<String>, M: Into<String>>(environment: E, message: M) -> Self {
        Self::Config { environment: environment.into(), message: message.into() }
    }

    /// Create a client setup error scoped to one environment
    pub fn client_setup<E: Into<String>, M: Into<String>>(environment: E, message: M) -> Self {
        Self::ClientSetup { environment: environment.into(), message: message.into() }
    }
}
