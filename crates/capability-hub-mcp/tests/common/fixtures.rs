//! Shared server fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use capability_hub::{Dispatcher, PathSandbox};
use capability_hub_mcp::config::{Environment, ServerConfig, Transport};
use capability_hub_mcp::metrics::Metrics;
use capability_hub_mcp::protocol::ProtocolHandler;

/// A fully wired handler over a throwaway workspace.
///
/// The workspace is removed when the fixture drops.
pub struct TestServer {
    pub handler: ProtocolHandler,
    pub workspace: TempDir,
}

impl TestServer {
    pub fn new() -> Self {
        Self::with_transport(Transport::Stdio)
    }

    pub fn with_transport(transport: Transport) -> Self {
        Self::with_config(transport, |_| {})
    }

    /// Like [`TestServer::with_transport`], with `adjust` applied to the
    /// configuration before the handler is built.
    pub fn with_config(transport: Transport, adjust: impl FnOnce(&mut ServerConfig)) -> Self {
        let workspace = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = ServerConfig {
            environment: Environment::Testing,
            transport,
            workspace_dir: workspace.path().to_path_buf(),
            secret_key: Some("hunter2".to_string()),
            ..ServerConfig::default()
        };
        adjust(&mut config);
        let config = Arc::new(config);

        let sandbox = Arc::new(PathSandbox::new(workspace.path()).expect("Failed to open sandbox"));
        let registry = capability_hub_mcp::build_registry(config.clone(), sandbox)
            .expect("Failed to build registry");
        let dispatcher = Dispatcher::new(Arc::new(registry));
        let handler = ProtocolHandler::new(dispatcher, config, Arc::new(Metrics::new()));

        Self { handler, workspace }
    }

    /// Send one request and return the reply.
    pub async fn request(&self, id: i64, method: &str, params: Value) -> Value {
        let message = request(id, method, params);
        self.handler
            .handle_raw(&message)
            .await
            .expect("requests always get a reply")
    }

    /// Complete the handshake.
    pub async fn initialize(&self) -> Value {
        let reply = self.request(0, "initialize", initialize_params()).await;
        let notification = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        assert!(self.handler.handle_value(notification).await.is_none());
        reply
    }

    /// `tools/call` and return the `result` member.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Value {
        let reply = self
            .request(1, "tools/call", json!({"name": name, "arguments": arguments}))
            .await;
        reply
            .get("result")
            .cloned()
            .unwrap_or_else(|| panic!("tools/call {name} failed: {reply}"))
    }

    /// `resources/read` and return the first content item.
    pub async fn read_resource(&self, uri: &str) -> Value {
        let reply = self.request(1, "resources/read", json!({"uri": uri})).await;
        reply["result"]["contents"][0].clone()
    }
}

impl Default for TestServer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn request(id: i64, method: &str, params: Value) -> String {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string()
}

pub fn initialize_params() -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {},
        "clientInfo": {"name": "test-client", "version": "0.0.1"},
    })
}

/// Text of the first content item of a tool result.
pub fn tool_text(result: &Value) -> String {
    result["content"][0]["text"]
        .as_str()
        .expect("text content")
        .to_string()
}

/// First content item of a tool result, decoded as JSON.
pub fn tool_json(result: &Value) -> Value {
    serde_json::from_str(&tool_text(result)).expect("JSON tool output")
}
