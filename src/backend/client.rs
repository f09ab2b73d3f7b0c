//! Certificate lookup against one authenticated backend environment.

use std::sync::Arc;

use super::api::{BackendApi, ResourceRecord, SSL_CERT_KEY};
use super::error::{BackendError, Result};

/// One environment's certificate client: an authenticated session handle
/// plus the namespace prefix scoping all logical certificate names.
///
/// Created during registry build and never re-authenticated; safe for
/// concurrent read-only use across independent lookups.
#[derive(Clone)]
pub struct CertificateClient {
    api: Arc<dyn BackendApi>,
    prefix: String,
}

impl std::fmt::Debug for CertificateClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateClient")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl CertificateClient {
    /// Authenticate eagerly against the backend and return a ready
    /// client. A login failure fails construction: the environment is
    /// unusable.
    pub async fn connect(api: Arc<dyn BackendApi>, prefix: impl Into<String>) -> Result<Self> {
        api.login().await?;
        Ok(Self { api, prefix: prefix.into() })
    }

    /// The namespace prefix this client scopes lookups to.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Look up the certificate stored under `prefix + name`.
    ///
    /// The prefix is a pure string concatenation; an empty prefix looks
    /// up the logical name unchanged. Errors are returned as-is, never
    /// retried.
    pub async fn get_certificate(&self, name: &str) -> Result<ResourceRecord> {
        self.api.find_resource(SSL_CERT_KEY, &format!("{}{}", self.prefix, name)).await
    }

    /// List all certificates whose key name starts with this client's
    /// prefix, preserving the original record shape.
    ///
    /// Every candidate record must expose its name under a string
    /// `certkey` field; a record violating that aborts the whole listing
    /// rather than being skipped.
    pub async fn get_all_certificates(&self) -> Result<Vec<ResourceRecord>> {
        let all = self.api.find_all_resources(SSL_CERT_KEY).await?;

        let mut certs = Vec::new();
        for cert in all {
            let name = match cert.get("certkey") {
                Some(serde_json::Value::String(name)) => name,
                Some(other) => {
                    return Err(BackendError::malformed_record(
                        SSL_CERT_KEY,
                        format!("certificate key name is not a string: {}", other),
                    ))
                }
                None => {
                    return Err(BackendError::malformed_record(
                        SSL_CERT_KEY,
                        "certificate record is missing the 'certkey' field",
                    ))
                }
            };
            if name.starts_with(&self.prefix) {
                certs.push(cert);
            }
        }

        Ok(certs)
    }
}
