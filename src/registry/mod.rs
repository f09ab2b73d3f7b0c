//! # Environment Registry
//!
//! Builds and owns one [`CertificateClient`] per configured backend
//! environment. Construction is all-or-nothing: any environment failing
//! config resolution or client setup aborts the whole build, and no
//! partial registry is ever exposed. Once built, the registry is
//! read-only for the remainder of the process lifetime.
//!
//! The [`BackendConnector`] trait is the seam through which the concrete
//! backend implementation is injected; production uses
//! [`NitroConnector`], tests substitute their own.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::backend::{self, BackendApi, CertificateClient, NitroApi};
use crate::config::{ConfigValue, EnvironmentConfig};
use crate::errors::{Error, Result};

/// Constructs the backend API handle for one environment.
///
/// Login is not part of this step; [`CertificateClient::connect`]
/// authenticates eagerly right after construction.
#[async_trait]
pub trait BackendConnector: Send + Sync {
    /// Build an unauthenticated API handle from a validated config.
    async fn connect(
        &self,
        environment: &str,
        config: &EnvironmentConfig,
    ) -> backend::Result<Arc<dyn BackendApi>>;
}

/// Production connector creating NITRO REST clients.
pub struct NitroConnector;

#[async_trait]
impl BackendConnector for NitroConnector {
    async fn connect(
        &self,
        _environment: &str,
        config: &EnvironmentConfig,
    ) -> backend::Result<Arc<dyn BackendApi>> {
        Ok(Arc::new(NitroApi::new(config)?))
    }
}

/// Mapping from environment name to its authenticated certificate
/// client. The only authorized source of clients for metadata queries.
pub struct EnvironmentRegistry {
    clients: BTreeMap<String, CertificateClient>,
}

impl std::fmt::Debug for EnvironmentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentRegistry")
            .field("clients", &self.clients)
            .finish()
    }
}

impl EnvironmentRegistry {
    /// Build a registry from the host's generic `environments` value.
    ///
    /// Every entry is resolved into an [`EnvironmentConfig`] first, then
    /// a client is connected and authenticated per environment. The
    /// first failure aborts the entire build with an error naming the
    /// environment and the failing step. Repeating a failed build is
    /// safe: opening a session is the only external side effect.
    pub async fn build(
        environments: &ConfigValue,
        connector: &dyn BackendConnector,
    ) -> Result<Self> {
        let entries = environments.as_record().ok_or_else(|| {
            Error::Environments(format!("expected a record, got {}", environments.type_name()))
        })?;

        // Resolve and validate every config before opening any session.
        let mut configs = BTreeMap::new();
        for (environment, value) in entries {
            debug!(environment = %environment, "Resolving environment config");
            let config = EnvironmentConfig::resolve(environment, value)?;
            configs.insert(environment.clone(), config);
        }

        let mut clients = BTreeMap::new();
        for (environment, config) in configs {
            let api = connector
                .connect(&environment, &config)
                .await
                .map_err(|e| Error::client_setup(&environment, e.to_string()))?;

            let client = CertificateClient::connect(api, config.prefix.clone())
                .await
                .map_err(|e| Error::client_setup(&environment, e.to_string()))?;

            info!(
                environment = %environment,
                endpoint = %config.endpoint,
                prefix = %config.prefix,
                "Connected backend environment"
            );
            clients.insert(environment, client);
        }

        Ok(Self { clients })
    }

    /// Look up one environment's client by name.
    pub fn get(&self, environment: &str) -> Option<&CertificateClient> {
        self.clients.get(environment)
    }

    /// Iterate over all registered environments and their clients.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CertificateClient)> {
        self.clients.iter().map(|(name, client)| (name.as_str(), client))
    }

    /// Number of registered environments.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether the registry holds no environments.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
