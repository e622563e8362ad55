//! `config://` resources describing this server.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use capability_hub::{CapabilityDescriptor, CapabilityKind, CapabilityResult, Payload};

use crate::config::{ServerConfig, Transport};
use crate::types::MCP_VERSION;

pub fn config_resources(config: Arc<ServerConfig>) -> CapabilityResult<Vec<CapabilityDescriptor>> {
    let mut resources = Vec::new();

    let cfg = config.clone();
    resources.push(
        CapabilityDescriptor::resource("config://app", move |_, _| {
            Ok(Payload::Json(json!({
                "app_name": cfg.app_name,
                "version": cfg.version,
                "environment": cfg.environment.name(),
                "debug": cfg.debug,
                "host": cfg.host,
                "port": cfg.port,
                "transport": cfg.transport.name(),
                "mcp_mount_path": cfg.mcp_mount_path,
                "stateless_http": cfg.transport == Transport::Http,
                "log_level": cfg.log_level,
                "timestamp": Utc::now().to_rfc3339(),
            })))
        })
        .title("Application Configuration")
        .description("Get current application configuration")
        .mime_type("application/json")
        .build()?,
    );

    let cfg = config.clone();
    resources.push(
        CapabilityDescriptor::resource("config://version", move |_, _| {
            Ok(Payload::Json(json!({
                "version": cfg.version,
                "app_name": cfg.app_name,
                "mcp_protocol_version": MCP_VERSION,
                "server_crate_version": env!("CARGO_PKG_VERSION"),
                "transport_protocol": cfg.transport.name(),
                "timestamp": Utc::now().to_rfc3339(),
            })))
        })
        .title("Version Information")
        .description("Get version and build information")
        .mime_type("application/json")
        .build()?,
    );

    let cfg = config.clone();
    resources.push(
        CapabilityDescriptor::resource("config://capabilities", move |ctx, _| {
            let registry = ctx.registry;
            Ok(Payload::Json(json!({
                "mcp_version": MCP_VERSION,
                "transport": cfg.transport.name(),
                "features": {
                    "tools": true,
                    "resources": true,
                    "prompts": true,
                    "logging": true,
                    "streaming": cfg.transport == Transport::StreamableHttp,
                    "stateless": cfg.transport == Transport::Http,
                },
                "tools_count": registry.count(CapabilityKind::Tool),
                "resources_count": registry.count(CapabilityKind::Resource),
                "resource_templates_count": registry.count(CapabilityKind::ResourceTemplate),
                "prompts_count": registry.count(CapabilityKind::Prompt),
                "timestamp": Utc::now().to_rfc3339(),
            })))
        })
        .title("Server Capabilities")
        .description("Get server capabilities and live capability counts")
        .mime_type("application/json")
        .build()?,
    );

    let cfg = config;
    resources.push(
        CapabilityDescriptor::resource("config://environment", move |_, _| {
            Ok(Payload::Json(json!({
                "environment": cfg.environment.name(),
                "debug_mode": cfg.debug,
                "log_level": cfg.log_level,
                "has_secret_key": cfg.secret_key.is_some(),
                "has_api_key": cfg.api_key.is_some(),
                "timestamp": Utc::now().to_rfc3339(),
            })))
        })
        .title("Environment Variables")
        .description("Get environment-specific configuration (secrets reported by presence only)")
        .mime_type("application/json")
        .build()?,
    );

    resources.push(
        CapabilityDescriptor::resource_template("config://user/{user_id}", |_, args| {
            let now = Utc::now().to_rfc3339();
            Ok(Payload::Json(json!({
                "user_id": args.str("user_id")?,
                "preferences": {
                    "theme": "default",
                    "language": "en",
                    "timezone": "UTC",
                },
                "permissions": {
                    "read": true,
                    "write": false,
                    "admin": false,
                },
                "last_accessed": now,
                "timestamp": now,
            })))
        })
        .title("User Configuration")
        .description("Get user-specific configuration")
        .mime_type("application/json")
        .build()?,
    );

    Ok(resources)
}
