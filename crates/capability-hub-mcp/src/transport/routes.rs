//! REST endpoints served next to the MCP endpoint on both HTTP transports.
//!
//! # Routes
//!
//! - `GET  /health`           liveness probe
//! - `GET  /info`             server identity and capability flags
//! - `GET  /api/v1/tools`     registered tools
//! - `GET  /api/v1/resources` resources and resource templates
//! - `GET  /api/v1/prompts`   registered prompts
//! - `GET  /api/v1/status`    running status and uptime
//! - `GET  /api/v1/metrics`   request counters
//! - `POST /api/v1/convert`   echo, uppercase or reverse a payload

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use capability_hub::CapabilityKind;

use crate::types::{PromptDefinition, ToolDefinition, MCP_VERSION};

use super::http::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/info", get(info_handler))
        .route("/api/v1/tools", get(list_tools_handler))
        .route("/api/v1/resources", get(list_resources_handler))
        .route("/api/v1/prompts", get(list_prompts_handler))
        .route("/api/v1/status", get(status_handler))
        .route("/api/v1/metrics", get(metrics_handler))
        .route("/api/v1/convert", post(convert_handler))
}

fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.handler.config();
    Json(json!({
        "status": "healthy",
        "version": config.version,
        "app_name": config.app_name,
        "environment": config.environment,
        "transport": state.transport,
    }))
}

async fn info_handler(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.handler.config();
    Json(json!({
        "name": config.app_name,
        "version": config.version,
        "environment": config.environment,
        "protocol_version": MCP_VERSION,
        "transport": state.transport,
        "mcp_endpoint": config.mcp_mount_path,
        "capabilities": {
            "tools": true,
            "resources": true,
            "prompts": true,
            "logging": true,
        },
    }))
}

async fn list_tools_handler(State(state): State<AppState>) -> impl IntoResponse {
    let tools: Vec<ToolDefinition> = state
        .handler
        .registry()
        .list(CapabilityKind::Tool)
        .map(ToolDefinition::from)
        .collect();

    Json(json!({
        "count": tools.len(),
        "tools": tools,
        "timestamp": timestamp(),
    }))
}

/// Exact resources first, then templates flagged with `template: true`.
async fn list_resources_handler(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.handler.registry();
    let exact = registry.list(CapabilityKind::Resource).map(|d| (d, false));
    let templates = registry.all_templates().map(|d| (d, true));

    let resources: Vec<Value> = exact
        .chain(templates)
        .map(|(descriptor, template)| {
            json!({
                "uri": descriptor.identity(),
                "title": descriptor.title(),
                "description": descriptor.description(),
                "mimeType": descriptor.mime_type(),
                "template": template,
            })
        })
        .collect();

    Json(json!({
        "count": resources.len(),
        "resources": resources,
        "timestamp": timestamp(),
    }))
}

async fn list_prompts_handler(State(state): State<AppState>) -> impl IntoResponse {
    let prompts: Vec<PromptDefinition> = state
        .handler
        .registry()
        .list(CapabilityKind::Prompt)
        .map(PromptDefinition::from)
        .collect();

    Json(json!({
        "count": prompts.len(),
        "prompts": prompts,
        "timestamp": timestamp(),
    }))
}

async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.handler.config();
    Json(json!({
        "status": "running",
        "app_name": config.app_name,
        "version": config.version,
        "environment": config.environment,
        "transport": state.transport,
        "uptime_seconds": state.handler.metrics().uptime().as_secs(),
        "active_sessions": state.sessions.len().await,
        "timestamp": timestamp(),
    }))
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "metrics": state.handler.metrics().snapshot(),
        "timestamp": timestamp(),
    }))
}

/// POST /api/v1/convert: `{"operation": "echo"|"uppercase"|"reverse", "data": ...}`.
///
/// An operation that does not fit the payload reports `{"error": ...}` as its
/// output. A body that is not a JSON object is a 400.
async fn convert_handler(body: String) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let request: Value = serde_json::from_str(&body).map_err(|e| bad_request(e.to_string()))?;
    let Some(request) = request.as_object() else {
        return Err(bad_request("request body must be a JSON object".to_string()));
    };

    let operation = request
        .get("operation")
        .and_then(Value::as_str)
        .unwrap_or("echo")
        .to_string();
    let payload = request.get("data").cloned().unwrap_or_else(|| json!({}));

    Ok(Json(json!({
        "operation": operation,
        "output": convert(&operation, &payload),
        "input": payload,
        "timestamp": timestamp(),
    })))
}

fn convert(operation: &str, payload: &Value) -> Value {
    match (operation, payload) {
        ("echo", payload) => payload.clone(),
        ("uppercase", Value::String(s)) => json!(s.to_uppercase()),
        ("uppercase", _) => json!({ "error": "Payload must be a string for uppercase operation" }),
        ("reverse", Value::String(s)) => json!(s.chars().rev().collect::<String>()),
        ("reverse", Value::Array(items)) => json!(items.iter().rev().collect::<Vec<_>>()),
        ("reverse", _) => {
            json!({ "error": "Payload must be string or list for reverse operation" })
        }
        (other, _) => json!({ "error": format!("Unknown operation: {other}") }),
    }
}

fn bad_request(message: String) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message, "timestamp": timestamp() })),
    )
}
