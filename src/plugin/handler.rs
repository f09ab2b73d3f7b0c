//! Dispatch of the host contract onto the core services.
//!
//! Enforces the call lifecycle: `initialize` exactly once before any
//! `get_metadata`, and `close` as a terminal acknowledgement.

use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::Error;
use crate::metadata::MetadataService;
use crate::registry::{BackendConnector, EnvironmentRegistry, NitroConnector};

use super::protocol::{
    error_codes, methods, GetMetadataParams, InitializeParams, PluginRequest, PluginResponse,
};

/// Stateful handler for one plugin session.
pub struct PluginHandler {
    connector: Arc<dyn BackendConnector>,
    service: Option<MetadataService>,
    closed: bool,
}

impl PluginHandler {
    /// Create a handler using the production NITRO backend.
    pub fn new() -> Self {
        Self::with_connector(Arc::new(NitroConnector))
    }

    /// Create a handler with an injected backend connector.
    pub fn with_connector(connector: Arc<dyn BackendConnector>) -> Self {
        Self { connector, service: None, closed: false }
    }

    /// Whether `close` has been acknowledged; the transport loop stops
    /// reading once this turns true.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Dispatch one request to the matching operation.
    pub async fn handle_request(&mut self, request: PluginRequest) -> PluginResponse {
        debug!(method = %request.method, "Handling plugin request");

        match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(request).await,
            methods::GET_METADATA => self.handle_get_metadata(request).await,
            methods::CLOSE => self.handle_close(request),
            other => PluginResponse::error(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("unknown method '{}'", other),
            ),
        }
    }

    async fn handle_initialize(&mut self, request: PluginRequest) -> PluginResponse {
        if self.service.is_some() {
            return PluginResponse::error(
                request.id,
                error_codes::INVALID_REQUEST,
                "plugin is already initialized",
            );
        }

        let params: InitializeParams = match serde_json::from_value(request.params) {
            Ok(params) => params,
            Err(e) => {
                return PluginResponse::error(
                    request.id,
                    error_codes::INVALID_PARAMS,
                    format!("invalid initialize params: {}", e),
                )
            }
        };

        let Some(environments) = params.config.get("environments") else {
            return PluginResponse::error(
                request.id,
                error_codes::INVALID_PARAMS,
                "config is missing the 'environments' field",
            );
        };

        match EnvironmentRegistry::build(environments, self.connector.as_ref()).await {
            Ok(registry) => {
                info!(environments = registry.len(), "Plugin initialized");
                self.service = Some(MetadataService::new(registry));
                PluginResponse::success(request.id, serde_json::json!({}))
            }
            Err(error) => {
                let code = match error {
                    Error::Environments(_) | Error::Config { .. } => error_codes::INVALID_PARAMS,
                    _ => error_codes::INTERNAL_ERROR,
                };
                PluginResponse::error(request.id, code, error.to_string())
            }
        }
    }

    async fn handle_get_metadata(&mut self, request: PluginRequest) -> PluginResponse {
        let Some(service) = &self.service else {
            return PluginResponse::error(
                request.id,
                error_codes::INVALID_REQUEST,
                "plugin is not initialized",
            );
        };

        let params: GetMetadataParams = match serde_json::from_value(request.params) {
            Ok(params) => params,
            Err(e) => {
                return PluginResponse::error(
                    request.id,
                    error_codes::INVALID_PARAMS,
                    format!("invalid get_metadata params: {}", e),
                )
            }
        };

        let metadata = service.get_metadata(&params.domain, &params.alias).await;

        // The call itself only fails when the response envelope cannot
        // be built; per-environment failures are already embedded.
        match serde_json::to_value(metadata) {
            Ok(result) => PluginResponse::success(request.id, result),
            Err(e) => PluginResponse::error(
                request.id,
                error_codes::INTERNAL_ERROR,
                format!("failed to encode metadata response: {}", e),
            ),
        }
    }

    /// Sessions are not explicitly logged out; close is a plain
    /// acknowledgement that ends the session loop.
    fn handle_close(&mut self, request: PluginRequest) -> PluginResponse {
        info!("Plugin close requested");
        self.closed = true;
        PluginResponse::success(request.id, serde_json::json!({}))
    }
}

impl Default for PluginHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{self, BackendApi, BackendError, ResourceRecord};
    use crate::config::EnvironmentConfig;
    use crate::plugin::protocol::RequestId;
    use async_trait::async_trait;

    struct StaticApi;

    #[async_trait]
    impl BackendApi for StaticApi {
        async fn login(&self) -> backend::Result<()> {
            Ok(())
        }

        async fn find_resource(&self, _kind: &str, name: &str) -> backend::Result<ResourceRecord> {
            let mut record = ResourceRecord::new();
            record.insert("certkey".into(), serde_json::Value::String(name.to_string()));
            Ok(record)
        }

        async fn find_all_resources(&self, _kind: &str) -> backend::Result<Vec<ResourceRecord>> {
            Ok(Vec::new())
        }
    }

    struct StaticConnector;

    #[async_trait]
    impl BackendConnector for StaticConnector {
        async fn connect(
            &self,
            _environment: &str,
            _config: &EnvironmentConfig,
        ) -> backend::Result<Arc<dyn BackendApi>> {
            Ok(Arc::new(StaticApi))
        }
    }

    struct RejectingConnector;

    #[async_trait]
    impl BackendConnector for RejectingConnector {
        async fn connect(
            &self,
            _environment: &str,
            _config: &EnvironmentConfig,
        ) -> backend::Result<Arc<dyn BackendApi>> {
            Err(BackendError::transport("connection refused"))
        }
    }

    fn request(id: i64, method: &str, params: serde_json::Value) -> PluginRequest {
        PluginRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(RequestId::Number(id)),
            method: method.to_string(),
            params,
        }
    }

    fn initialize_params() -> serde_json::Value {
        serde_json::json!({
            "config": {
                "environments": {
                    "prod": {
                        "endpoint": "https://adc.example.com",
                        "username": "admin",
                        "password": "secret",
                        "prefix": "prod-"
                    }
                }
            }
        })
    }

    async fn initialized_handler() -> PluginHandler {
        let mut handler = PluginHandler::with_connector(Arc::new(StaticConnector));
        let response =
            handler.handle_request(request(1, methods::INITIALIZE, initialize_params())).await;
        assert!(response.error.is_none());
        handler
    }

    #[tokio::test]
    async fn test_initialize_then_get_metadata() {
        let mut handler = initialized_handler().await;

        let response = handler
            .handle_request(request(
                2,
                methods::GET_METADATA,
                serde_json::json!({ "domain": "example.com" }),
            ))
            .await;

        let result = response.result.unwrap();
        assert_eq!(result["prod"]["certkey"], "prod-example.com");
    }

    #[tokio::test]
    async fn test_get_metadata_before_initialize_is_rejected() {
        let mut handler = PluginHandler::with_connector(Arc::new(StaticConnector));

        let response = handler
            .handle_request(request(
                1,
                methods::GET_METADATA,
                serde_json::json!({ "domain": "example.com" }),
            ))
            .await;

        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::INVALID_REQUEST);
        assert!(error.message.contains("not initialized"));
    }

    #[tokio::test]
    async fn test_initialize_twice_is_rejected() {
        let mut handler = initialized_handler().await;

        let response =
            handler.handle_request(request(2, methods::INITIALIZE, initialize_params())).await;

        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::INVALID_REQUEST);
        assert!(error.message.contains("already initialized"));
    }

    #[tokio::test]
    async fn test_initialize_with_invalid_environment_fails() {
        let mut handler = PluginHandler::with_connector(Arc::new(StaticConnector));

        let response = handler
            .handle_request(request(
                1,
                methods::INITIALIZE,
                serde_json::json!({
                    "config": {
                        "environments": {
                            "prod": { "username": "admin", "password": "secret" }
                        }
                    }
                }),
            ))
            .await;

        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::INVALID_PARAMS);
        assert!(error.message.contains("missing required field 'endpoint'"));

        // No partial registry: queries keep failing as uninitialized.
        let follow_up = handler
            .handle_request(request(
                2,
                methods::GET_METADATA,
                serde_json::json!({ "domain": "example.com" }),
            ))
            .await;
        assert_eq!(follow_up.error.unwrap().code, error_codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_initialize_connector_failure_is_internal_error() {
        let mut handler = PluginHandler::with_connector(Arc::new(RejectingConnector));

        let response =
            handler.handle_request(request(1, methods::INITIALIZE, initialize_params())).await;

        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::INTERNAL_ERROR);
        assert!(error.message.contains("prod"));
    }

    #[tokio::test]
    async fn test_initialize_without_environments_field() {
        let mut handler = PluginHandler::with_connector(Arc::new(StaticConnector));

        let response = handler
            .handle_request(request(1, methods::INITIALIZE, serde_json::json!({ "config": {} })))
            .await;

        let error = response.error.unwrap();
        assert_eq!(error.code, error_codes::INVALID_PARAMS);
        assert!(error.message.contains("environments"));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let mut handler = PluginHandler::with_connector(Arc::new(StaticConnector));

        let response =
            handler.handle_request(request(1, "renew_certificate", serde_json::json!({}))).await;

        assert_eq!(response.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_close_acknowledges_and_marks_closed() {
        let mut handler = initialized_handler().await;
        assert!(!handler.is_closed());

        let response =
            handler.handle_request(request(2, methods::CLOSE, serde_json::json!({}))).await;

        assert!(response.error.is_none());
        assert!(handler.is_closed());
    }
}
