//! HTTP behavior tests for [`ApiClient`] against a mock Commissaire
//! server: authentication headers, retry policy, and outcome
//! classification.

use serde_json::json;
use wiremock::matchers::{bearer_token, body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use commctl_client::{ApiClient, ApiError, ClusterSpec, ClusterStatus, HostStatus};
use commctl_config::{AuthMode, SessionConfig};

fn token_client(server_url: &str) -> ApiClient {
    let config = SessionConfig::new(
        server_url,
        AuthMode::Token("sekrit".to_string()),
        true,
        5,
    )
    .expect("config");
    ApiClient::new(&config).expect("client")
}

#[tokio::test]
async fn list_hosts_parses_response_and_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/hosts"))
        .and(bearer_token("sekrit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"address": "10.0.0.1", "status": "available", "cluster": "prod"},
            {"address": "10.0.0.2", "status": "failed"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let hosts = token_client(&server.uri())
        .list_hosts()
        .await
        .expect("list hosts");
    assert_eq!(hosts.len(), 2);
    assert_eq!(hosts[0].address, "10.0.0.1");
    assert_eq!(hosts[0].status, HostStatus::Available);
    assert_eq!(hosts[0].cluster.as_deref(), Some("prod"));
    assert_eq!(hosts[1].status, HostStatus::Failed);
}

#[tokio::test]
async fn list_hosts_treats_no_content_as_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/hosts"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let hosts = token_client(&server.uri())
        .list_hosts()
        .await
        .expect("list hosts");
    assert!(hosts.is_empty());
}

#[tokio::test]
async fn basic_auth_attaches_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/hosts"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = SessionConfig::new(
        &server.uri(),
        AuthMode::Basic {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        },
        true,
        5,
    )
    .expect("config");
    let hosts = ApiClient::new(&config)
        .expect("client")
        .list_hosts()
        .await
        .expect("list hosts");
    assert!(hosts.is_empty());
}

#[tokio::test]
async fn transient_5xx_is_retried_until_success() {
    let server = MockServer::start().await;
    // First two attempts fail, the third lands on the healthy mock.
    Mock::given(method("GET"))
        .and(path("/api/v0/hosts"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v0/hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let hosts = token_client(&server.uri())
        .list_hosts()
        .await
        .expect("list hosts");
    assert!(hosts.is_empty());
}

#[tokio::test]
async fn persistent_5xx_fails_after_three_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/hosts"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&server)
        .await;

    let err = token_client(&server.uri())
        .list_hosts()
        .await
        .expect_err("should fail");
    match err {
        ApiError::Server { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn client_4xx_is_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/host/10.0.0.9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such host"))
        .expect(1)
        .mount(&server)
        .await;

    let err = token_client(&server.uri())
        .get_host("10.0.0.9")
        .await
        .expect_err("should fail");
    match err {
        ApiError::Client { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such host");
        }
        other => panic!("expected client error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_reported_after_retries() {
    // Nothing listens on the discard port.
    let config = SessionConfig::new(
        "http://127.0.0.1:9",
        AuthMode::Token("sekrit".to_string()),
        true,
        1,
    )
    .expect("config");
    let err = ApiClient::new(&config)
        .expect("client")
        .list_hosts()
        .await
        .expect_err("should fail");
    assert!(matches!(err, ApiError::Unreachable { .. }));
    assert!(err.to_string().contains("unreachable"));
}

#[tokio::test]
async fn get_cluster_merges_name_into_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/cluster/prod"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "degraded",
            "hosts": {"total": 5, "available": 3, "unavailable": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cluster = token_client(&server.uri())
        .get_cluster("prod")
        .await
        .expect("get cluster");
    assert_eq!(cluster.name, "prod");
    assert_eq!(cluster.host_count, 5);
    assert_eq!(cluster.status, ClusterStatus::Degraded);
}

#[tokio::test]
async fn create_cluster_puts_spec_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v0/cluster/prod"))
        .and(body_json(json!({"type": "kubernetes", "network": "default"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let spec: ClusterSpec = serde_json::from_value(json!({"name": "prod"})).expect("spec");
    token_client(&server.uri())
        .create_cluster(&spec)
        .await
        .expect("create cluster");
}

#[tokio::test]
async fn delete_host_issues_delete_to_host_path() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v0/host/10.0.0.1"))
        .and(bearer_token("sekrit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    token_client(&server.uri())
        .delete_host("10.0.0.1")
        .await
        .expect("delete host");
}

#[tokio::test]
async fn delete_cluster_propagates_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v0/cluster/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such cluster"))
        .expect(1)
        .mount(&server)
        .await;

    let err = token_client(&server.uri())
        .delete_cluster("ghost")
        .await
        .expect_err("should fail");
    match err {
        ApiError::Client { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such cluster");
        }
        other => panic!("expected client error, got {other:?}"),
    }
}

#[tokio::test]
async fn list_cluster_hosts_returns_addresses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/cluster/prod/hosts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!(["10.0.0.1", "10.0.0.2"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let addresses = token_client(&server.uri())
        .list_cluster_hosts("prod")
        .await
        .expect("list cluster hosts");
    assert_eq!(addresses, vec!["10.0.0.1", "10.0.0.2"]);
}
