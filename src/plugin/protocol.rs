//! Plugin Protocol Types
//!
//! Line-delimited JSON-RPC 2.0 messages exchanged with the host
//! orchestrator over stdin/stdout.

use serde::{Deserialize, Serialize};

use crate::config::ConfigValue;

/// JSON-RPC protocol version carried on every message.
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginRequest {
    pub jsonrpc: String,
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginResponse {
    pub jsonrpc: String,
    pub id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PluginError>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// JSON-RPC error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Method names of the host contract
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const GET_METADATA: &str = "get_metadata";
    pub const CLOSE: &str = "close";
}

/// Parameters of the `initialize` call: the host's generic plugin
/// configuration, expected to carry an `environments` record.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeParams {
    pub config: ConfigValue,
}

/// Parameters of the `get_metadata` call.
#[derive(Debug, Clone, Deserialize)]
pub struct GetMetadataParams {
    pub domain: String,
    /// Alias overriding the domain as the lookup name, when non-empty.
    #[serde(default)]
    pub alias: String,
}

impl PluginResponse {
    /// Build a success response.
    pub fn success(id: Option<RequestId>, result: serde_json::Value) -> Self {
        Self { jsonrpc: JSONRPC_VERSION.to_string(), id, result: Some(result), error: None }
    }

    /// Build an error response.
    pub fn error(id: Option<RequestId>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(PluginError { code, message: message.into(), data: None }),
        }
    }
}
