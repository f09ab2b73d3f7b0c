//! Backend ADC API abstraction and certificate lookup.
//!
//! This module owns everything that talks to one backend environment:
//!
//! - [`BackendApi`]: the capability trait the rest of the plugin programs
//!   against (`login`, `find_resource`, `find_all_resources`). Keeping
//!   this a first-class seam means the registry and the certificate
//!   client are testable against a substitute backend.
//! - [`NitroApi`]: the production implementation speaking the NITRO v1
//!   REST protocol over HTTPS.
//! - [`CertificateClient`]: one authenticated session plus the namespace
//!   prefix, exposing certificate lookup by logical name.

pub mod api;
pub mod client;
pub mod error;
pub mod nitro;

pub use api::{BackendApi, ResourceRecord, SSL_CERT_KEY};
pub use client::CertificateClient;
pub use error::{BackendError, Result};
pub use nitro::NitroApi;
