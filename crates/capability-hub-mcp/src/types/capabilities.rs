//! Handshake types: what the server advertises on `initialize`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// MCP protocol version this server speaks.
pub const MCP_VERSION: &str = "2024-11-05";

/// Implementation name reported in `serverInfo`.
pub const SERVER_NAME: &str = "capability-hub-mcp";

/// Crate version, used when the configuration does not override it.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name and version of one side of the connection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

/// Capabilities the client declares. Recorded, not acted upon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<HashMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roots: Option<serde_json::Value>,
}

/// Capabilities advertised in the `initialize` result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<ListChangedCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<ListChangedCapability>,
}

/// Tools and prompts: the catalog is frozen, so `listChanged` is always false.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChangedCapability {
    #[serde(default)]
    pub list_changed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesCapability {
    #[serde(default)]
    pub subscribe: bool,
    #[serde(default)]
    pub list_changed: bool,
}

/// `initialize` request parameters. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitializeParams {
    pub protocol_version: String,
    pub capabilities: ClientCapabilities,
    pub client_info: Implementation,
}

/// `initialize` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl ServerCapabilities {
    /// Tools, resources and prompts, none of which change at runtime.
    pub fn default_capabilities() -> Self {
        Self {
            prompts: Some(ListChangedCapability::default()),
            resources: Some(ResourcesCapability::default()),
            tools: Some(ListChangedCapability::default()),
        }
    }
}

impl InitializeResult {
    /// Result announcing `app_name` at `version`.
    pub fn for_server(app_name: &str, version: &str) -> Self {
        Self {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities::default_capabilities(),
            server_info: Implementation {
                name: app_name.to_string(),
                version: version.to_string(),
            },
            instructions: Some(
                "Use tools for calculations, text processing and workspace file access. \
                 Use resources to inspect the host system and server configuration. \
                 Use prompts for code review and data analysis guidance."
                    .to_string(),
            ),
        }
    }

    /// Result with the crate's own name and version.
    pub fn default_result() -> Self {
        Self::for_server(SERVER_NAME, SERVER_VERSION)
    }
}
