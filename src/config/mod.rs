//! # Configuration Management
//!
//! The host hands the plugin a generic, untyped configuration value at
//! Initialize time. This module models that value as an explicit tagged
//! variant ([`ConfigValue`]) and provides the decode-and-validate step
//! that turns one environment's entry into a typed
//! [`EnvironmentConfig`].
//!
//! Validation is fail-fast: the first missing required field aborts with
//! an error identifying the environment and the field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// A generic configuration value as received from the host.
///
/// Mirrors the JSON data model; decodes transparently from any JSON
/// document. Field access goes through the typed accessors rather than
/// scattered runtime assertions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// JSON null
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// String value
    String(String),
    /// Ordered list of values
    Array(Vec<ConfigValue>),
    /// String-keyed record of values
    Record(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Interpret this value as a record, if it is one.
    pub fn as_record(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            Self::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Interpret this value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a field on a record value. Returns `None` for non-records.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_record().and_then(|fields| fields.get(key))
    }

    /// Human-readable name of this value's shape, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Record(_) => "record",
        }
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(fields) => {
                Self::Record(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// Validated connection parameters for one backend environment.
///
/// Immutable once resolved; resolution and validation happen exactly once
/// while the environment registry is built.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentConfig {
    /// Base URL of the backend NITRO API
    pub endpoint: String,
    /// Username for session establishment
    pub username: String,
    /// Password for session establishment
    pub password: String,
    /// Namespace prefix prepended to all logical certificate names
    pub prefix: String,
    /// Whether to validate the backend's TLS certificate
    pub ssl_verify: bool,
}

impl EnvironmentConfig {
    /// Decode and validate one environment's configuration value.
    ///
    /// The value must be a record; unknown fields are ignored and
    /// missing optional fields take their defaults (`prefix` empty,
    /// `sslVerify` false). Required fields are checked in order
    /// (`endpoint`, `username`, `password`) and the first missing one
    /// aborts resolution.
    pub fn resolve(environment: &str, value: &ConfigValue) -> Result<Self> {
        let record = value.as_record().ok_or_else(|| {
            Error::config(
                environment,
                format!("expected a record of connection settings, got {}", value.type_name()),
            )
        })?;

        let endpoint = string_field(environment, record, "endpoint")?;
        let username = string_field(environment, record, "username")?;
        let password = string_field(environment, record, "password")?;
        let prefix = string_field(environment, record, "prefix")?.unwrap_or_default();
        let ssl_verify = bool_field(environment, record, "sslVerify")?.unwrap_or(false);

        let config = Self {
            endpoint: required(environment, "endpoint", endpoint)?,
            username: required(environment, "username", username)?,
            password: required(environment, "password", password)?,
            prefix,
            ssl_verify,
        };

        Ok(config)
    }
}

fn string_field(
    environment: &str,
    record: &BTreeMap<String, ConfigValue>,
    key: &str,
) -> Result<Option<String>> {
    match record.get(key) {
        None | Some(ConfigValue::Null) => Ok(None),
        Some(ConfigValue::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::config(
            environment,
            format!("field '{}' must be a string, got {}", key, other.type_name()),
        )),
    }
}

fn bool_field(
    environment: &str,
    record: &BTreeMap<String, ConfigValue>,
    key: &str,
) -> Result<Option<bool>> {
    match record.get(key) {
        None | Some(ConfigValue::Null) => Ok(None),
        Some(ConfigValue::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(Error::config(
            environment,
            format!("field '{}' must be a boolean, got {}", key, other.type_name()),
        )),
    }
}

/// A required field that is absent or empty aborts resolution.
fn required(environment: &str, key: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(Error::config(environment, format!("missing required field '{}'", key))),
    }
}
