#![allow(clippy::unwrap_used)]
// Integration tests for `HttpTransport` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tripdesk_api::{
    ApiRequest, AuthScope, Credential, CredentialStore, Error, FilePart, FormPayload,
    HttpTransport, Method, RequestBody, Role, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, HttpTransport, CredentialStore) {
    setup_with_timeout(Duration::from_secs(10)).await
}

async fn setup_with_timeout(timeout: Duration) -> (MockServer, HttpTransport, CredentialStore) {
    let server = MockServer::start().await;
    let credentials = CredentialStore::new();
    let config = TransportConfig::new(Url::parse(&server.uri()).unwrap()).with_timeout(timeout);
    let transport = HttpTransport::new(&config, credentials.clone()).unwrap();
    (server, transport, credentials)
}

// ── Auth header ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_attaches_admin_bearer_token() {
    let (server, transport, credentials) = setup().await;
    credentials.set(Credential::new("user-jwt", Role::User));
    credentials.set(Credential::new("admin-jwt", Role::Admin));

    Mock::given(method("GET"))
        .and(path("/community/get"))
        .and(header("authorization", "Bearer admin-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = transport
        .send(ApiRequest::get("/community/get").with_auth(AuthScope::Shared))
        .await
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({ "success": true, "data": [] }));
}

#[tokio::test]
async fn test_no_header_without_live_credential() {
    let (server, transport, credentials) = setup().await;
    let past = chrono::Utc::now() - chrono::Duration::hours(1);
    credentials.set(Credential::new("expired", Role::Admin).expiring_at(past));

    Mock::given(method("GET"))
        .and(path("/trip/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    transport
        .send(ApiRequest::get("/trip/get").with_auth(AuthScope::Admin))
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("authorization").is_none());
}

// ── Bodies & query ──────────────────────────────────────────────────

#[tokio::test]
async fn test_json_body_and_query() {
    let (server, transport, _) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/reservation/status/r1"))
        .and(body_json(json!({ "status": "confirmed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reservation": {} })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/response/get"))
        .and(query_param("questionId", "q7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "responses": [] })))
        .expect(1)
        .mount(&server)
        .await;

    transport
        .send(
            ApiRequest::new(Method::Put, "/reservation/status/r1")
                .with_body(RequestBody::Json(json!({ "status": "confirmed" }))),
        )
        .await
        .unwrap();
    transport
        .send(ApiRequest::get("/response/get").with_query("questionId", "q7"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_multipart_body() {
    let (server, transport, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/trip/add"))
        .and(body_string_contains("name=\"destination\""))
        .and(body_string_contains("Tozeur"))
        .and(body_string_contains("filename=\"cover.png\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let form = FormPayload::new()
        .text("destination", "Tozeur")
        .file("image", FilePart::new("cover.png", "image/png", vec![0x89, 0x50]));
    let resp = transport
        .send(ApiRequest::new(Method::Post, "/trip/add").with_body(RequestBody::Multipart(form)))
        .await
        .unwrap();
    assert_eq!(resp.status, 201);
}

#[tokio::test]
async fn test_non_json_body_is_preserved() {
    let (server, transport, _) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/user/delete/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User deleted"))
        .mount(&server)
        .await;

    let resp = transport
        .send(ApiRequest::new(Method::Delete, "/user/delete/u1"))
        .await
        .unwrap();
    assert_eq!(resp.body, json!("User deleted"));
}

// ── Failure modes ───────────────────────────────────────────────────

#[tokio::test]
async fn test_http_error_carries_status_body_and_message() {
    let (server, transport, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/trip/get/missing-id"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "success": false, "message": "Trip not found" })),
        )
        .mount(&server)
        .await;

    let err = transport
        .send(ApiRequest::get("/trip/get/missing-id"))
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "expected 404, got: {err:?}");
    match err {
        Error::Http {
            status,
            body,
            message,
        } => {
            assert_eq!(status, 404);
            assert!(body.contains("Trip not found"));
            assert_eq!(message.as_deref(), Some("Trip not found"));
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_fires_while_connection_is_open() {
    let (server, transport, _) = setup_with_timeout(Duration::from_millis(200)).await;

    Mock::given(method("GET"))
        .and(path("/dashboard/user-stats"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let err = transport
        .send(ApiRequest::get("/dashboard/user-stats"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Timeout { timeout_ms: 200 }),
        "expected Timeout, got: {err:?}"
    );
}

#[tokio::test]
async fn test_unreachable_backend() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = TransportConfig::new(Url::parse(&format!("http://127.0.0.1:{port}")).unwrap());
    let transport = HttpTransport::new(&config, CredentialStore::new()).unwrap();

    let err = transport.send(ApiRequest::get("/trip/get")).await.unwrap_err();
    assert!(
        matches!(err, Error::NetworkUnavailable { .. }),
        "expected NetworkUnavailable, got: {err:?}"
    );
    assert_eq!(err.user_message(), "The server is unreachable.");
}
