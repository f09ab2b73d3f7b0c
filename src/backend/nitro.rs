//! NITRO v1 REST implementation of the backend API capability.
//!
//! Speaks the slice of the NITRO configuration protocol the plugin
//! needs: session login (`POST /nitro/v1/config/login`), single-resource
//! lookup (`GET /nitro/v1/config/{kind}/{name}`) and resource listing
//! (`GET /nitro/v1/config/{kind}`). The session id returned by login is
//! carried on subsequent requests as the `NITRO_AUTH_TOKEN` cookie.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::EnvironmentConfig;

use super::api::{BackendApi, ResourceRecord};
use super::error::{BackendError, Result};

/// Per-request deadline for backend round trips.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// NITRO errorcode for a resource that does not exist. Some appliances
/// pair it with HTTP 404, others return it in a 200 body.
const ERRORCODE_NO_SUCH_RESOURCE: i64 = 258;

/// NITRO REST client for one backend environment.
///
/// Holds the HTTP client, the connection parameters, and the session id
/// established by [`BackendApi::login`]. The session is never refreshed
/// automatically; it lives for the process lifetime.
pub struct NitroApi {
    http: reqwest::Client,
    endpoint: String,
    username: String,
    password: String,
    session: RwLock<Option<String>>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    login: LoginCredentials<'a>,
}

#[derive(Serialize)]
struct LoginCredentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    errorcode: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    sessionid: Option<String>,
}

impl NitroApi {
    /// Build a NITRO client from a validated environment configuration.
    ///
    /// When `ssl_verify` is false the backend's TLS certificate is not
    /// validated; ADC appliances commonly serve self-signed management
    /// certificates.
    pub fn new(config: &EnvironmentConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(!config.ssl_verify)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            session: RwLock::new(None),
        })
    }

    fn config_url(&self, path: &str) -> String {
        format!("{}/nitro/v1/config/{}", self.endpoint, path)
    }

    async fn session_cookie(&self) -> Result<String> {
        let session = self.session.read().await;
        session
            .as_ref()
            .map(|id| format!("NITRO_AUTH_TOKEN={}", id))
            .ok_or_else(|| BackendError::authentication_failed("no active session"))
    }

    async fn get_config(&self, path: &str) -> Result<reqwest::Response> {
        let cookie = self.session_cookie().await?;
        let response = self
            .http
            .get(self.config_url(path))
            .header(reqwest::header::COOKIE, cookie)
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl BackendApi for NitroApi {
    async fn login(&self) -> Result<()> {
        let request =
            LoginRequest { login: LoginCredentials { username: &self.username, password: &self.password } };

        let response = self.http.post(self.config_url("login")).json(&request).send().await?;
        let status = response.status();

        let body: LoginResponse = response.json().await.map_err(|e| {
            BackendError::authentication_failed(format!(
                "unexpected login response (status {}): {}",
                status, e
            ))
        })?;

        if body.errorcode != 0 || !status.is_success() {
            return Err(BackendError::authentication_failed(
                body.message.unwrap_or_else(|| format!("login rejected with status {}", status)),
            ));
        }

        let session_id = body.sessionid.ok_or_else(|| {
            BackendError::authentication_failed("login response carried no session id")
        })?;

        debug!(endpoint = %self.endpoint, "NITRO session established");
        *self.session.write().await = Some(session_id);
        Ok(())
    }

    async fn find_resource(&self, kind: &str, name: &str) -> Result<ResourceRecord> {
        let response = self.get_config(&format!("{}/{}", kind, name)).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::not_found(kind, name));
        }
        let body = match checked_body(response).await {
            Err(BackendError::Api { code: ERRORCODE_NO_SUCH_RESOURCE, .. }) => {
                return Err(BackendError::not_found(kind, name))
            }
            other => other?,
        };

        records_from_body(kind, body)?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::not_found(kind, name))
    }

    async fn find_all_resources(&self, kind: &str) -> Result<Vec<ResourceRecord>> {
        let response = self.get_config(kind).await?;
        let body = checked_body(response).await?;
        records_from_body(kind, body)
    }
}

/// Decode a NITRO response body, surfacing HTTP and API-level errors.
async fn checked_body(response: reqwest::Response) -> Result<serde_json::Value> {
    let status = response.status();
    if !status.is_success() {
        return Err(BackendError::transport(format!("backend returned status {}", status)));
    }

    let body: serde_json::Value = response.json().await?;
    let errorcode = body.get("errorcode").and_then(serde_json::Value::as_i64).unwrap_or(0);
    if errorcode != 0 {
        let message = body
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown backend error")
            .to_string();
        return Err(BackendError::Api { code: errorcode, message });
    }

    Ok(body)
}

/// Extract the resource records held under the `kind` field of a NITRO
/// response. A missing field means zero resources.
fn records_from_body(kind: &str, body: serde_json::Value) -> Result<Vec<ResourceRecord>> {
    match body.get(kind) {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_object().cloned().ok_or_else(|| {
                    BackendError::malformed_record(kind, format!("expected a record, got {}", item))
                })
            })
            .collect(),
        Some(serde_json::Value::Object(record)) => Ok(vec![record.clone()]),
        Some(other) => {
            Err(BackendError::malformed_record(kind, format!("expected a record list, got {}", other)))
        }
    }
}
