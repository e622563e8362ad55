//! Stress: long request sequences and large payloads through the full stack.

use std::sync::Arc;

use capability_hub::{Dispatcher, InvocationRequest, PathSandbox, Payload};
use capability_hub_mcp::config::ServerConfig;
use capability_hub_mcp::metrics::Metrics;
use capability_hub_mcp::transport::StdioTransport;
use capability_hub_mcp::ProtocolHandler;
use serde_json::{json, Map, Value};
use tempfile::tempdir;

fn line(id: usize, method: &str, params: Value) -> String {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string()
}

/// 1000 requests down one stdio pipe, answered in order.
#[tokio::test]
async fn test_thousand_requests_over_stdio() {
    let dir = tempdir().unwrap();
    let config = Arc::new(ServerConfig {
        workspace_dir: dir.path().to_path_buf(),
        ..ServerConfig::default()
    });
    let sandbox = Arc::new(PathSandbox::new(dir.path()).unwrap());
    let registry = capability_hub_mcp::build_registry(config.clone(), sandbox).unwrap();
    let handler = ProtocolHandler::new(
        Dispatcher::new(Arc::new(registry)),
        config,
        Arc::new(Metrics::new()),
    );

    let mut input = vec![line(
        0,
        "initialize",
        json!({"protocolVersion": "2024-11-05", "capabilities": {}, "clientInfo": {"name": "stress", "version": "1"}}),
    )];
    for i in 1..=1000usize {
        input.push(line(
            i,
            "tools/call",
            json!({"name": "add", "arguments": {"a": i, "b": 1}}),
        ));
    }
    let input = input.join("\n");

    let mut output = Vec::new();
    StdioTransport::new(handler)
        .serve(input.as_bytes(), &mut output)
        .await
        .unwrap();

    let replies: Vec<Value> = std::str::from_utf8(&output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(replies.len(), 1001);

    for (i, reply) in replies.iter().enumerate().skip(1) {
        assert_eq!(reply["id"], i);
        let text = reply["result"]["content"][0]["text"].as_str().unwrap();
        let sum: f64 = text.parse().unwrap();
        assert_eq!(sum, (i + 1) as f64);
    }
}

/// A large nested document survives write then read unchanged.
#[tokio::test]
async fn test_large_json_round_trip() {
    let dir = tempdir().unwrap();
    let config = Arc::new(ServerConfig {
        workspace_dir: dir.path().to_path_buf(),
        ..ServerConfig::default()
    });
    let sandbox = Arc::new(PathSandbox::new(dir.path()).unwrap());
    let registry = Arc::new(capability_hub_mcp::build_registry(config, sandbox).unwrap());
    let dispatcher = Dispatcher::new(registry);

    let records: Vec<Value> = (0..2000)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("record-{i}"),
                "tags": ["a", "b", i.to_string()],
                "score": i as f64 / 4.0,
                "active": i % 2 == 0,
            })
        })
        .collect();
    let data = json!({"records": records, "meta": {"count": 2000}});

    let mut arguments = Map::new();
    arguments.insert("file_path".to_string(), json!("big/records.json"));
    arguments.insert("data".to_string(), data.clone());
    arguments.insert("indent".to_string(), json!(0));
    let written = tokio::task::spawn_blocking({
        let dispatcher = dispatcher.clone();
        move || dispatcher.invoke(InvocationRequest::tool("write_json_file", arguments))
    })
    .await
    .unwrap();
    assert!(written.is_ok(), "{written:?}");

    let mut arguments = Map::new();
    arguments.insert("file_path".to_string(), json!("big/records.json"));
    let read = tokio::task::spawn_blocking(move || {
        dispatcher.invoke(InvocationRequest::tool("read_json_file", arguments))
    })
    .await
    .unwrap()
    .unwrap();

    match read.payload {
        Payload::Json(value) => assert_eq!(value["data"], data),
        other => panic!("unexpected payload: {other:?}"),
    }
}
