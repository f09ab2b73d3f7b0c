//! # Metadata Aggregation
//!
//! Answers one per-domain metadata query by fanning the certificate
//! lookup out to every registered environment concurrently and merging
//! the results. One environment's failure never prevents the others from
//! being queried: failures become per-environment error records in the
//! same mapping as the successes, so the caller always keeps best-effort
//! visibility across all environments.

use std::collections::BTreeMap;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::backend::{BackendError, CertificateClient};
use crate::registry::EnvironmentRegistry;

/// Default per-environment deadline for one certificate lookup.
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-environment results of one metadata query: either the certificate
/// record or an `{"error": ...}` record, keyed by environment name.
/// Built fresh on every query, never cached.
pub type AggregatedMetadata = BTreeMap<String, serde_json::Value>;

/// Fan-out/aggregation service over a built environment registry.
pub struct MetadataService {
    registry: EnvironmentRegistry,
    lookup_timeout: Duration,
}

impl MetadataService {
    /// Create a service over a fully built registry.
    pub fn new(registry: EnvironmentRegistry) -> Self {
        Self { registry, lookup_timeout: DEFAULT_LOOKUP_TIMEOUT }
    }

    /// Override the per-environment lookup deadline.
    pub fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    /// Resolve certificate metadata for `domain` in every registered
    /// environment.
    ///
    /// A non-empty `alias` overrides the domain as the logical lookup
    /// name. Lookups run concurrently, each bounded by the per-call
    /// deadline; a failure or timeout in one environment is recorded as
    /// an error record under that environment's name. With zero
    /// registered environments the result is an empty mapping.
    pub async fn get_metadata(&self, domain: &str, alias: &str) -> AggregatedMetadata {
        let name = lookup_name(domain, alias);
        debug!(domain = %domain, lookup_name = %name, environments = self.registry.len(),
            "Resolving certificate metadata");

        let lookups = self.registry.iter().map(|(environment, client)| {
            self.lookup_environment(environment, client, domain, name)
        });

        join_all(lookups).await.into_iter().collect()
    }

    async fn lookup_environment(
        &self,
        environment: &str,
        client: &CertificateClient,
        domain: &str,
        name: &str,
    ) -> (String, serde_json::Value) {
        let result = timeout(self.lookup_timeout, client.get_certificate(name))
            .await
            .unwrap_or(Err(BackendError::Timeout { timeout: self.lookup_timeout }));

        let value = match result {
            Ok(record) => serde_json::Value::Object(record),
            Err(error) => {
                warn!(environment = %environment, domain = %domain, error = %error,
                    "Certificate lookup failed");
                error_record(environment, domain, &error)
            }
        };

        (environment.to_string(), value)
    }
}

/// Alias overrides domain when non-empty.
fn lookup_name<'a>(domain: &'a str, alias: &'a str) -> &'a str {
    if alias.is_empty() {
        domain
    } else {
        alias
    }
}

fn error_record(environment: &str, domain: &str, error: &BackendError) -> serde_json::Value {
    serde_json::json!({
        "error": format!(
            "failed to get certificate metadata for domain '{}' from environment '{}': {}",
            domain, environment, error
        )
    })
}
