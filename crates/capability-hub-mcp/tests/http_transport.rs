//! HTTP transports and REST routes, driven through the router without a socket.

#![cfg(feature = "http")]

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use std::time::Duration;

use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use capability_hub_mcp::config::Transport;
use capability_hub_mcp::transport::{HttpTransport, SessionStore, SESSION_HEADER};
use capability_hub_mcp::types::{error_codes, mcp_error_codes};

use common::fixtures::{initialize_params, request, TestServer};

fn app(server: &TestServer, transport: Transport) -> Router {
    HttpTransport::new(server.handler.clone(), transport)
        .expect("HTTP transport")
        .router()
}

fn post(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_stdio_is_not_an_http_transport() {
    let server = TestServer::new();
    assert!(HttpTransport::new(server.handler.clone(), Transport::Stdio).is_err());
}

#[tokio::test]
async fn test_stateless_post_needs_no_handshake() {
    let server = TestServer::with_transport(Transport::Http);
    let app = app(&server, Transport::Http);

    let body = request(1, "tools/call", json!({"name": "add", "arguments": {"a": 1, "b": 2}}));
    let response = app.oneshot(post("/mcp", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reply = body_json(response).await;
    assert_eq!(reply["id"], 1);
    assert_eq!(reply["result"]["content"][0]["text"], "3.0");
}

#[tokio::test]
async fn test_stateless_notification_is_accepted() {
    let server = TestServer::with_transport(Transport::Http);
    let app = app(&server, Transport::Http);

    let body = json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string();
    let response = app.oneshot(post("/mcp", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_stateless_parse_error() {
    let server = TestServer::with_transport(Transport::Http);
    let app = app(&server, Transport::Http);

    let response = app.oneshot(post("/mcp", "{oops".to_string())).await.unwrap();
    let reply = body_json(response).await;
    assert_eq!(reply["error"]["code"], error_codes::PARSE_ERROR);
}

#[tokio::test]
async fn test_streamable_session_lifecycle() {
    let server = TestServer::with_transport(Transport::StreamableHttp);
    let app = app(&server, Transport::StreamableHttp);

    // Without a session, only initialize is allowed.
    let response = app
        .clone()
        .oneshot(post("/mcp", request(1, "tools/list", json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(post("/mcp", request(1, "initialize", initialize_params())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let session = response
        .headers()
        .get(SESSION_HEADER)
        .expect("session header")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(session.len(), 36);
    let reply = body_json(response).await;
    assert_eq!(reply["result"]["serverInfo"]["name"], "Capability Hub");

    let mut list = post("/mcp", request(2, "tools/list", json!({})));
    list.headers_mut()
        .insert(SESSION_HEADER, session.parse().unwrap());
    let response = app.clone().oneshot(list).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[SESSION_HEADER], session.as_str());
    let reply = body_json(response).await;
    assert!(!reply["result"]["tools"].as_array().unwrap().is_empty());

    let delete = Request::builder()
        .method("DELETE")
        .uri("/mcp")
        .header(SESSION_HEADER, &session)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(delete).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let mut list = post("/mcp", request(3, "tools/list", json!({})));
    list.headers_mut()
        .insert(SESSION_HEADER, session.parse().unwrap());
    let response = app.oneshot(list).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let reply = body_json(response).await;
    assert_eq!(reply["error"]["code"], mcp_error_codes::SESSION_NOT_FOUND);
    assert_eq!(reply["id"], 3);
}

#[tokio::test]
async fn test_streamable_replies_as_sse_when_accepted() {
    let server = TestServer::with_transport(Transport::StreamableHttp);
    let app = app(&server, Transport::StreamableHttp);

    let mut init = post("/mcp", request(1, "initialize", initialize_params()));
    init.headers_mut().insert(
        header::ACCEPT,
        "application/json, text/event-stream".parse().unwrap(),
    );
    let response = app.oneshot(init).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));

    let text = body_text(response).await;
    assert!(text.starts_with("event: message\n"));
    let data = text
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .expect("data line");
    let reply: Value = serde_json::from_str(data).unwrap();
    assert_eq!(reply["result"]["protocolVersion"], "2024-11-05");
}

fn session_of(response: &axum::response::Response) -> String {
    response.headers()[SESSION_HEADER]
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_abandoned_sessions_are_capped() {
    let server = TestServer::with_config(Transport::StreamableHttp, |config| {
        config.max_sessions = 5;
    });
    let transport = HttpTransport::new(server.handler.clone(), Transport::StreamableHttp).unwrap();
    let app = transport.router();

    let mut opened = Vec::new();
    for id in 0..50 {
        let response = app
            .clone()
            .oneshot(post("/mcp", request(id, "initialize", initialize_params())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        opened.push(session_of(&response));
    }
    assert_eq!(transport.state().sessions.len().await, 5);

    // The oldest sessions made room; the newest still serve.
    let mut list = post("/mcp", request(100, "tools/list", json!({})));
    list.headers_mut()
        .insert(SESSION_HEADER, opened[0].parse().unwrap());
    let response = app.clone().oneshot(list).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let mut list = post("/mcp", request(101, "tools/list", json!({})));
    list.headers_mut()
        .insert(SESSION_HEADER, opened[49].parse().unwrap());
    let response = app.oneshot(list).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_initialize_notification_opens_no_session() {
    let server = TestServer::with_transport(Transport::StreamableHttp);
    let transport = HttpTransport::new(server.handler.clone(), Transport::StreamableHttp).unwrap();

    let body = json!({"jsonrpc": "2.0", "method": "initialize", "params": initialize_params()});
    let response = transport
        .router()
        .oneshot(post("/mcp", body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(SESSION_HEADER).is_none());
    assert!(transport.state().sessions.is_empty().await);
}

#[tokio::test]
async fn test_idle_sessions_expire() {
    let server = TestServer::with_transport(Transport::StreamableHttp);
    let store = SessionStore::new(Duration::from_millis(50), 10);

    let (idle, _) = store.create(&server.handler).await;
    let (swept, _) = store.create(&server.handler).await;
    assert_eq!(store.len().await, 2);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(store.get(&idle).await.is_none());
    assert_eq!(store.len().await, 1);

    assert_eq!(store.sweep().await, 1);
    assert!(store.get(&swept).await.is_none());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_unknown_session_delete() {
    let server = TestServer::with_transport(Transport::StreamableHttp);
    let app = app(&server, Transport::StreamableHttp);

    let delete = Request::builder()
        .method("DELETE")
        .uri("/mcp")
        .header(SESSION_HEADER, "no-such-session")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(delete).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let delete = Request::builder()
        .method("DELETE")
        .uri("/mcp")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(delete).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_and_info() {
    let server = TestServer::with_transport(Transport::Http);
    let app = app(&server, Transport::Http);

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["environment"], "testing");
    assert_eq!(health["transport"], "http");

    let info = body_json(app.oneshot(get("/info")).await.unwrap()).await;
    assert_eq!(info["protocol_version"], "2024-11-05");
    assert_eq!(info["capabilities"]["tools"], true);
}

#[tokio::test]
async fn test_rest_listings_come_from_the_registry() {
    let server = TestServer::with_transport(Transport::Http);
    let app = app(&server, Transport::Http);

    let tools = body_json(app.clone().oneshot(get("/api/v1/tools")).await.unwrap()).await;
    assert_eq!(tools["count"], tools["tools"].as_array().unwrap().len());
    assert!(tools["timestamp"].is_string());

    let resources = body_json(app.clone().oneshot(get("/api/v1/resources")).await.unwrap()).await;
    let items = resources["resources"].as_array().unwrap();
    assert_eq!(resources["count"], 11);
    let template = items
        .iter()
        .find(|r| r["uri"] == "config://user/{user_id}")
        .unwrap();
    assert_eq!(template["template"], true);

    let prompts = body_json(app.oneshot(get("/api/v1/prompts")).await.unwrap()).await;
    assert_eq!(prompts["count"], 8);
}

#[tokio::test]
async fn test_status_and_metrics() {
    let server = TestServer::with_transport(Transport::Http);
    let app = app(&server, Transport::Http);

    app.clone()
        .oneshot(post("/mcp", request(1, "ping", json!({}))))
        .await
        .unwrap();

    let status = body_json(app.clone().oneshot(get("/api/v1/status")).await.unwrap()).await;
    assert_eq!(status["status"], "running");
    assert!(status["uptime_seconds"].is_u64());

    let metrics = body_json(app.oneshot(get("/api/v1/metrics")).await.unwrap()).await;
    assert_eq!(metrics["metrics"]["requests_total"], 1);
    assert_eq!(metrics["metrics"]["lifecycle_requests"], 1);
}

#[tokio::test]
async fn test_convert_endpoint() {
    let server = TestServer::with_transport(Transport::Http);
    let app = app(&server, Transport::Http);

    let body = json!({"operation": "reverse", "data": [1, 2, 3]}).to_string();
    let reply = body_json(app.clone().oneshot(post("/api/v1/convert", body)).await.unwrap()).await;
    assert_eq!(reply["output"], json!([3, 2, 1]));
    assert_eq!(reply["input"], json!([1, 2, 3]));

    let body = json!({"operation": "uppercase", "data": 42}).to_string();
    let reply = body_json(app.clone().oneshot(post("/api/v1/convert", body)).await.unwrap()).await;
    assert!(reply["output"]["error"].is_string());

    let response = app
        .oneshot(post("/api/v1/convert", "not json".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}
