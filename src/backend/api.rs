//! Core backend API capability trait and types.

use async_trait::async_trait;

use super::error::Result;

/// One resource as returned by the backend API: an opaque mapping of
/// field name to value. Nothing is normalized or reshaped beyond key-name
/// prefixing.
pub type ResourceRecord = serde_json::Map<String, serde_json::Value>;

/// Resource kind holding SSL certificate-key bindings.
pub const SSL_CERT_KEY: &str = "sslcertkey";

/// Capability consumed from one backend environment's API.
///
/// Implementations own the wire protocol and the authentication flow;
/// callers only see resource kinds, names, and records. The trait is the
/// abstraction boundary that lets the environment registry and the
/// certificate client run against a substitute backend in tests.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Establish an authenticated session.
    ///
    /// # Errors
    ///
    /// Returns [`super::BackendError::AuthenticationFailed`] when the
    /// backend rejects the credentials.
    async fn login(&self) -> Result<()>;

    /// Look up a single resource of `kind` by `name`.
    ///
    /// # Errors
    ///
    /// Returns [`super::BackendError::NotFound`] when no such resource
    /// exists, or a transport/API error for any other failure.
    async fn find_resource(&self, kind: &str, name: &str) -> Result<ResourceRecord>;

    /// List all resources of `kind`.
    async fn find_all_resources(&self, kind: &str) -> Result<Vec<ResourceRecord>>;
}
