//! # Certmeta
//!
//! Certmeta is a metadata-provider plugin for certificate-lifecycle
//! orchestrators. It resolves TLS certificate metadata for a domain (or
//! alias) across a set of independently configured ADC backend
//! environments and aggregates the per-environment results into a single
//! response, tolerating partial failures.
//!
//! ## Architecture
//!
//! The host process drives the plugin over a line-delimited JSON-RPC
//! transport on stdin/stdout:
//!
//! ```text
//! Host orchestrator → Plugin transport → Metadata service
//!                                              ↓
//!                                     Environment registry
//!                                              ↓
//!                                  Certificate clients (NITRO API)
//! ```
//!
//! ## Core Components
//!
//! - **Environment registry**: validates per-environment configuration and
//!   builds one authenticated backend client per environment, all or
//!   nothing ([`registry`])
//! - **Certificate client**: certificate lookups under a configurable
//!   key-prefix namespace ([`backend`])
//! - **Metadata service**: concurrent per-environment fan-out and
//!   aggregation of successes and error records ([`metadata`])
//! - **Plugin transport**: stdio JSON-RPC wiring for the host's
//!   Initialize/GetMetadata/Close contract ([`plugin`])

pub mod backend;
pub mod config;
pub mod errors;
pub mod metadata;
pub mod observability;
pub mod plugin;
pub mod registry;

// Re-export commonly used types
pub use config::{ConfigValue, EnvironmentConfig};
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_available() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "certmeta");
    }
}
