//! NITRO wire-protocol tests against a mock HTTP backend.

use std::sync::Arc;

use certmeta::backend::{BackendApi, BackendError, CertificateClient, NitroApi, SSL_CERT_KEY};
use certmeta::config::EnvironmentConfig;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> EnvironmentConfig {
    EnvironmentConfig {
        endpoint: server.uri(),
        username: "admin".to_string(),
        password: "secret".to_string(),
        prefix: "prod-".to_string(),
        ssl_verify: false,
    }
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/nitro/v1/config/login"))
        .and(body_json(serde_json::json!({
            "login": { "username": "admin", "password": "secret" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "errorcode": 0,
            "message": "Done",
            "sessionid": "abc123"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_establishes_session() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let api = NitroApi::new(&config_for(&server)).unwrap();
    api.login().await.unwrap();
}

#[tokio::test]
async fn login_rejection_is_authentication_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nitro/v1/config/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "errorcode": 354,
            "message": "Invalid username or password"
        })))
        .mount(&server)
        .await;

    let api = NitroApi::new(&config_for(&server)).unwrap();
    let err = api.login().await.unwrap_err();

    assert!(matches!(err, BackendError::AuthenticationFailed { .. }));
    assert!(err.to_string().contains("Invalid username or password"));
}

#[tokio::test]
async fn login_without_session_id_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nitro/v1/config/login"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "errorcode": 0,
            "message": "Done"
        })))
        .mount(&server)
        .await;

    let api = NitroApi::new(&config_for(&server)).unwrap();
    let err = api.login().await.unwrap_err();

    assert!(err.to_string().contains("no session id"));
}

#[tokio::test]
async fn lookup_without_login_fails() {
    let server = MockServer::start().await;
    let api = NitroApi::new(&config_for(&server)).unwrap();

    let err = api.find_resource(SSL_CERT_KEY, "prod-example.com").await.unwrap_err();
    assert!(err.to_string().contains("no active session"));
}

#[tokio::test]
async fn find_resource_sends_session_cookie() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/nitro/v1/config/sslcertkey/prod-example.com"))
        .and(header("cookie", "NITRO_AUTH_TOKEN=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errorcode": 0,
            "message": "Done",
            "sslcertkey": [{
                "certkey": "prod-example.com",
                "cert": "/nsconfig/ssl/prod-example.com.crt",
                "status": "Valid"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = NitroApi::new(&config_for(&server)).unwrap();
    api.login().await.unwrap();

    let record = api.find_resource(SSL_CERT_KEY, "prod-example.com").await.unwrap();
    assert_eq!(record["certkey"], "prod-example.com");
    assert_eq!(record["status"], "Valid");
}

#[tokio::test]
async fn find_resource_maps_404_to_not_found() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/nitro/v1/config/sslcertkey/prod-missing.example.com"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "errorcode": 258,
            "message": "No such resource"
        })))
        .mount(&server)
        .await;

    let api = NitroApi::new(&config_for(&server)).unwrap();
    api.login().await.unwrap();

    let err = api.find_resource(SSL_CERT_KEY, "prod-missing.example.com").await.unwrap_err();
    assert!(matches!(err, BackendError::NotFound { .. }));
}

#[tokio::test]
async fn find_resource_maps_not_found_errorcode_to_not_found() {
    // Some appliances report a missing resource with errorcode 258 in a
    // 200 body instead of an HTTP 404.
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/nitro/v1/config/sslcertkey/prod-missing.example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errorcode": 258,
            "message": "No such resource"
        })))
        .mount(&server)
        .await;

    let api = NitroApi::new(&config_for(&server)).unwrap();
    api.login().await.unwrap();

    let err = api.find_resource(SSL_CERT_KEY, "prod-missing.example.com").await.unwrap_err();
    assert!(matches!(err, BackendError::NotFound { .. }));
}

#[tokio::test]
async fn find_all_resources_returns_listing() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/nitro/v1/config/sslcertkey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errorcode": 0,
            "sslcertkey": [
                { "certkey": "prod-cert1" },
                { "certkey": "other-cert" },
                { "certkey": "prod-cert2" }
            ]
        })))
        .mount(&server)
        .await;

    let api = NitroApi::new(&config_for(&server)).unwrap();
    api.login().await.unwrap();

    let all = api.find_all_resources(SSL_CERT_KEY).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn find_all_resources_empty_listing() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/nitro/v1/config/sslcertkey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errorcode": 0,
            "message": "Done"
        })))
        .mount(&server)
        .await;

    let api = NitroApi::new(&config_for(&server)).unwrap();
    api.login().await.unwrap();

    assert!(api.find_all_resources(SSL_CERT_KEY).await.unwrap().is_empty());
}

#[tokio::test]
async fn certificate_client_filters_listing_over_the_wire() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/nitro/v1/config/sslcertkey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errorcode": 0,
            "sslcertkey": [
                { "certkey": "prod-cert1" },
                { "certkey": "other-cert" },
                { "certkey": "prod-cert2" }
            ]
        })))
        .mount(&server)
        .await;

    let api = Arc::new(NitroApi::new(&config_for(&server)).unwrap());
    let client = CertificateClient::connect(api, "prod-").await.unwrap();

    let certs = client.get_all_certificates().await.unwrap();
    assert_eq!(certs.len(), 2);
    assert_eq!(certs[0]["certkey"], "prod-cert1");
    assert_eq!(certs[1]["certkey"], "prod-cert2");
}
