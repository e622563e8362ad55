//! Concurrent access: many callers sharing one handler and one registry.
//!
//! Every call carries a unique token and must get its own token back, so a
//! crossed wire between requests shows up as a mismatch.

use std::sync::Arc;
use tokio::sync::Barrier;

use capability_hub::{Dispatcher, PathSandbox};
use capability_hub_mcp::config::ServerConfig;
use capability_hub_mcp::metrics::Metrics;
use capability_hub_mcp::types::{JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, RequestId};
use capability_hub_mcp::ProtocolHandler;
use serde_json::json;
use tempfile::{tempdir, TempDir};

// ─── Helpers ───────────────────────────────────────────────────────────────

fn create_handler() -> (ProtocolHandler, TempDir) {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = Arc::new(ServerConfig {
        workspace_dir: dir.path().to_path_buf(),
        ..ServerConfig::default()
    });
    let sandbox = Arc::new(PathSandbox::new(dir.path()).expect("Failed to open sandbox"));
    let registry =
        capability_hub_mcp::build_registry(config.clone(), sandbox).expect("Failed to build registry");
    let handler = ProtocolHandler::new(
        Dispatcher::new(Arc::new(registry)),
        config,
        Arc::new(Metrics::new()),
    );
    (handler, dir)
}

async fn init_handler(handler: &ProtocolHandler) {
    let init_req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: RequestId::Number(0),
        method: "initialize".to_string(),
        params: Some(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "test", "version": "1.0"}
        })),
    };
    handler
        .handle_message(JsonRpcMessage::Request(init_req))
        .await;

    let init_notif = JsonRpcNotification {
        jsonrpc: "2.0".to_string(),
        method: "notifications/initialized".to_string(),
        params: None,
    };
    handler
        .handle_message(JsonRpcMessage::Notification(init_notif))
        .await;
}

async fn call_tool(
    handler: &ProtocolHandler,
    id: i64,
    name: &str,
    args: serde_json::Value,
) -> serde_json::Value {
    let req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: RequestId::Number(id),
        method: "tools/call".to_string(),
        params: Some(json!({"name": name, "arguments": args})),
    };
    handler
        .handle_message(JsonRpcMessage::Request(req))
        .await
        .unwrap()
}

fn tool_text(response: &serde_json::Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .expect("Expected text in tool response")
}

// ─── Tests ─────────────────────────────────────────────────────────────────

/// 100 simultaneous calls, each echoing its own token.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_keep_their_tokens() {
    let (handler, _dir) = create_handler();
    init_handler(&handler).await;

    let barrier = Arc::new(Barrier::new(100));
    let mut handles = vec![];

    for i in 0..100i64 {
        let handler = handler.clone();
        let barrier = barrier.clone();

        handles.push(tokio::spawn(async move {
            barrier.wait().await;

            let token = format!("token-{i:03}");
            let response = call_tool(
                &handler,
                i,
                "convert_case",
                json!({"text": token, "case_type": "upper"}),
            )
            .await;

            assert_eq!(response["id"], i, "reply routed to the wrong request");
            assert_eq!(tool_text(&response), token.to_uppercase());
            i
        }));
    }

    let mut finished = Vec::new();
    for handle in handles {
        finished.push(handle.await.unwrap());
    }
    assert_eq!(finished.len(), 100);

    let snapshot = handler.metrics().snapshot();
    assert_eq!(snapshot.tool_calls, 100);
    assert_eq!(snapshot.requests_failed, 0);
}

/// Concurrent writers to distinct files all land intact.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_to_distinct_files() {
    let (handler, dir) = create_handler();
    init_handler(&handler).await;

    let mut handles = vec![];
    for i in 0..20i64 {
        let handler = handler.clone();
        handles.push(tokio::spawn(async move {
            let response = call_tool(
                &handler,
                i,
                "write_json_file",
                json!({
                    "file_path": format!("agents/agent-{i}.json"),
                    "data": {"agent": i, "payload": format!("payload-{i}")},
                }),
            )
            .await;
            assert!(response.get("result").is_some(), "write {i} failed: {response}");
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for i in 0..20i64 {
        let response = call_tool(
            &handler,
            i,
            "read_json_file",
            json!({"file_path": format!("agents/agent-{i}.json")}),
        )
        .await;
        let parsed: serde_json::Value = serde_json::from_str(tool_text(&response)).unwrap();
        assert_eq!(parsed["data"]["agent"], i);
        assert_eq!(parsed["data"]["payload"], format!("payload-{i}"));
    }

    let written = std::fs::read_dir(dir.path().join("agents")).unwrap().count();
    assert_eq!(written, 20);
}

/// Independent sessions over one catalog do not share handshake state.
#[tokio::test]
async fn test_sessions_share_catalog_not_state() {
    let (handler, _dir) = create_handler();
    init_handler(&handler).await;

    let fresh = handler.new_session();
    let response = call_tool(&fresh, 1, "add", json!({"a": 1, "b": 1})).await;
    assert!(response.get("error").is_some());

    init_handler(&fresh).await;
    let response = call_tool(&fresh, 2, "add", json!({"a": 1, "b": 1})).await;
    assert_eq!(tool_text(&response), "2.0");

    // Counters are shared across sessions.
    assert!(handler.metrics().snapshot().tool_calls >= 2);
}
