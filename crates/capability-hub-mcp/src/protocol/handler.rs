//! Routes JSON-RPC messages to the dispatcher and encodes the replies.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use capability_hub::{
    arguments_from_value, CapabilityError, CapabilityKind, CapabilityRegistry, Dispatcher,
    InvocationRequest, InvocationResult,
};

use crate::config::ServerConfig;
use crate::metrics::Metrics;
use crate::types::{
    error_codes, InitializeParams, JsonRpcError, JsonRpcMessage, JsonRpcNotification,
    JsonRpcRequest, JsonRpcResponse, McpError, McpResult, PromptDefinition, PromptGetParams,
    PromptGetResult, PromptListResult, ReadResourceResult, RequestId, ResourceContent,
    ResourceDefinition, ResourceListResult, ResourceReadParams, ResourceTemplateDefinition,
    ResourceTemplateListResult, ToolCallParams, ToolCallResult, ToolDefinition, ToolListResult,
    JSONRPC_VERSION,
};

use super::negotiation::NegotiatedCapabilities;

/// Protocol state for one connection (stdio) or session (streamable HTTP).
///
/// Cloning shares the negotiation state; use [`ProtocolHandler::new_session`]
/// for a fresh handshake over the same catalog.
#[derive(Clone)]
pub struct ProtocolHandler {
    dispatcher: Dispatcher,
    config: Arc<ServerConfig>,
    metrics: Arc<Metrics>,
    capabilities: Arc<Mutex<NegotiatedCapabilities>>,
    require_handshake: bool,
}

impl ProtocolHandler {
    pub fn new(dispatcher: Dispatcher, config: Arc<ServerConfig>, metrics: Arc<Metrics>) -> Self {
        Self {
            dispatcher,
            config,
            metrics,
            capabilities: Arc::new(Mutex::new(NegotiatedCapabilities::default())),
            require_handshake: true,
        }
    }

    /// Serve requests without a prior `initialize`, as the stateless HTTP
    /// transport does.
    pub fn stateless(mut self) -> Self {
        self.require_handshake = false;
        self
    }

    /// Same catalog and counters, fresh handshake state.
    pub fn new_session(&self) -> Self {
        Self {
            capabilities: Arc::new(Mutex::new(NegotiatedCapabilities::default())),
            ..self.clone()
        }
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        self.dispatcher.registry()
    }

    pub fn config(&self) -> &Arc<ServerConfig> {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Whether `initialize` has been answered on this handler.
    pub async fn is_negotiated(&self) -> bool {
        self.capabilities.lock().await.negotiated
    }

    /// Decode one raw message and handle it.
    ///
    /// Returns the reply to send, or `None` for notifications. Undecodable
    /// input yields a JSON-RPC error with a null id.
    pub async fn handle_raw(&self, raw: &str) -> Option<Value> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                let err = McpError::ParseError(e.to_string());
                self.metrics.record("", true);
                return Some(error_value(err.to_json_rpc_error(RequestId::Null)));
            }
        };
        self.handle_value(value).await
    }

    /// Handle an already-parsed JSON value.
    pub async fn handle_value(&self, value: Value) -> Option<Value> {
        if value.is_array() {
            let err = McpError::InvalidRequest("batch requests are not supported".to_string());
            self.metrics.record("", true);
            return Some(error_value(err.to_json_rpc_error(RequestId::Null)));
        }

        match serde_json::from_value::<JsonRpcMessage>(value) {
            Ok(message) => self.handle_message(message).await,
            Err(e) => {
                let err = McpError::InvalidRequest(e.to_string());
                self.metrics.record("", true);
                Some(error_value(err.to_json_rpc_error(RequestId::Null)))
            }
        }
    }

    /// Handle one decoded message.
    pub async fn handle_message(&self, message: JsonRpcMessage) -> Option<Value> {
        tracing::trace!(method = message.method().unwrap_or("-"), "Decoded message");
        match message {
            JsonRpcMessage::Request(request) => Some(self.handle_request(request).await),
            JsonRpcMessage::Notification(notification) => {
                self.handle_notification(notification).await;
                None
            }
            JsonRpcMessage::Response(_) | JsonRpcMessage::Error(_) => {
                tracing::debug!("Ignoring client-sent response");
                None
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Value {
        let id = request.id.clone();
        let method = request.method.clone();
        tracing::debug!(%id, %method, "Handling request");

        let result = if request.jsonrpc != JSONRPC_VERSION {
            Err(McpError::InvalidRequest(format!(
                "unsupported jsonrpc version '{}'",
                request.jsonrpc
            )))
        } else {
            self.route(&method, request.params).await
        };

        self.metrics.record(&method, result.is_err());
        match result {
            Ok(value) => serde_json::to_value(JsonRpcResponse::new(id, value))
                .unwrap_or_else(|e| internal_error_value(&e.to_string())),
            Err(err) => {
                tracing::warn!(
                    %method,
                    code = err.code(),
                    kind = err.capability_kind().map(|k| k.name()),
                    "Request failed: {err}"
                );
                error_value(err.to_json_rpc_error(id))
            }
        }
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        self.metrics.record(&notification.method, false);
        match notification.method.as_str() {
            "initialized" | "notifications/initialized" => {
                self.capabilities.lock().await.mark_initialized();
            }
            "notifications/cancelled" => {
                tracing::debug!("Cancellation requested; in-flight handlers run to completion");
            }
            other => tracing::debug!("Ignoring notification: {other}"),
        }
    }

    async fn route(&self, method: &str, params: Option<Value>) -> McpResult<Value> {
        match method {
            "initialize" => {
                let params: InitializeParams = match params {
                    Some(params) => parse_params(params)?,
                    None => InitializeParams::default(),
                };
                let result = self.capabilities.lock().await.negotiate(
                    params,
                    &self.config.app_name,
                    &self.config.version,
                )?;
                to_value(result)
            }
            "ping" => Ok(json!({})),
            _ => {
                if self.require_handshake {
                    self.capabilities.lock().await.ensure_initialized()?;
                }
                self.route_capability(method, params).await
            }
        }
    }

    async fn route_capability(&self, method: &str, params: Option<Value>) -> McpResult<Value> {
        let registry = self.registry();
        match method {
            "tools/list" => to_value(ToolListResult {
                tools: registry
                    .list(CapabilityKind::Tool)
                    .map(ToolDefinition::from)
                    .collect(),
                next_cursor: None,
            }),
            "tools/call" => {
                let params: ToolCallParams = require_params(params)?;
                let arguments = arguments_from_value(params.arguments)?;
                let outcome = self
                    .invoke(InvocationRequest::tool(params.name, arguments))
                    .await?;
                match outcome {
                    Ok(envelope) => to_value(ToolCallResult::from_envelope(envelope)),
                    Err(CapabilityError::HandlerExecution(message)) => {
                        self.metrics.record_tool_error();
                        to_value(ToolCallResult::error(message))
                    }
                    Err(err) => Err(err.into()),
                }
            }
            "resources/list" => to_value(ResourceListResult {
                resources: registry
                    .list(CapabilityKind::Resource)
                    .map(ResourceDefinition::from)
                    .collect(),
                next_cursor: None,
            }),
            "resources/templates/list" => to_value(ResourceTemplateListResult {
                resource_templates: registry
                    .all_templates()
                    .map(ResourceTemplateDefinition::from)
                    .collect(),
                next_cursor: None,
            }),
            "resources/read" => {
                let params: ResourceReadParams = require_params(params)?;
                let envelope = self.invoke(InvocationRequest::resource(params.uri)).await??;
                to_value(ReadResourceResult {
                    contents: vec![ResourceContent::from_envelope(envelope)],
                })
            }
            "prompts/list" => to_value(PromptListResult {
                prompts: registry
                    .list(CapabilityKind::Prompt)
                    .map(PromptDefinition::from)
                    .collect(),
                next_cursor: None,
            }),
            "prompts/get" => {
                let params: PromptGetParams = require_params(params)?;
                let arguments = arguments_from_value(params.arguments)?;
                let envelope = self
                    .invoke(InvocationRequest::prompt(params.name, arguments))
                    .await??;
                let description = registry
                    .lookup_exact(CapabilityKind::Prompt, &envelope.identity)
                    .ok()
                    .and_then(|d| d.description().map(str::to_string));
                to_value(PromptGetResult::from_envelope(envelope, description))
            }
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }

    /// Run a request on the blocking pool so slow handlers never stall the
    /// transport. The outer error is a lost task; the inner is the
    /// dispatcher's verdict.
    async fn invoke(&self, request: InvocationRequest) -> McpResult<InvocationResult> {
        let dispatcher = self.dispatcher.clone();
        tokio::task::spawn_blocking(move || dispatcher.invoke(request))
            .await
            .map_err(|e| McpError::InternalError(format!("handler task failed: {e}")))
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> McpResult<T> {
    serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn require_params<T: DeserializeOwned>(params: Option<Value>) -> McpResult<T> {
    match params {
        Some(params) => parse_params(params),
        None => Err(McpError::InvalidParams("missing params".to_string())),
    }
}

fn to_value<T: Serialize>(value: T) -> McpResult<Value> {
    serde_json::to_value(value).map_err(|e| McpError::InternalError(e.to_string()))
}

fn error_value(error: JsonRpcError) -> Value {
    serde_json::to_value(error).unwrap_or_else(|e| internal_error_value(&e.to_string()))
}

fn internal_error_value(message: &str) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": null,
        "error": { "code": error_codes::INTERNAL_ERROR, "message": message },
    })
}
