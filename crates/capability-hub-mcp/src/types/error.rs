//! Server error type and its JSON-RPC encoding.

use serde_json::{json, Value};
use thiserror::Error;

use capability_hub::{CapabilityError, CapabilityKind, ErrorKind};

use super::message::{JsonRpcError, RequestId};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Server-defined codes, in the implementation-reserved range.
pub mod mcp_error_codes {
    pub const TOOL_NOT_FOUND: i32 = -32001;
    pub const RESOURCE_NOT_FOUND: i32 = -32002;
    pub const PROMPT_NOT_FOUND: i32 = -32003;
    pub const ACCESS_DENIED: i32 = -32004;
    pub const ALREADY_EXISTS: i32 = -32005;
    pub const SESSION_NOT_FOUND: i32 = -32006;
}

/// Errors surfaced by the protocol layer and transports.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A failure reported by the dispatcher or a handler.
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for server operations.
pub type McpResult<T> = Result<T, McpError>;

impl McpError {
    /// JSON-RPC error code for this error.
    pub fn code(&self) -> i32 {
        use error_codes::*;
        use mcp_error_codes::*;

        match self {
            McpError::ParseError(_) | McpError::Json(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::SessionNotFound(_) => SESSION_NOT_FOUND,
            McpError::InternalError(_)
            | McpError::Config(_)
            | McpError::Transport(_)
            | McpError::Io(_) => INTERNAL_ERROR,
            McpError::Capability(err) => match err {
                CapabilityError::NotFound { kind, .. } => match kind {
                    CapabilityKind::Tool => TOOL_NOT_FOUND,
                    CapabilityKind::Prompt => PROMPT_NOT_FOUND,
                    CapabilityKind::Resource | CapabilityKind::ResourceTemplate => {
                        RESOURCE_NOT_FOUND
                    }
                },
                CapabilityError::Validation { .. } => INVALID_PARAMS,
                CapabilityError::SandboxViolation(_) => ACCESS_DENIED,
                CapabilityError::AlreadyExists(_) => ALREADY_EXISTS,
                CapabilityError::DuplicateCapability { .. }
                | CapabilityError::InvalidDescriptor { .. }
                | CapabilityError::HandlerExecution(_) => INTERNAL_ERROR,
            },
        }
    }

    /// Structured detail for the `data` member, if any.
    pub fn data(&self) -> Option<Value> {
        let McpError::Capability(err) = self else {
            return None;
        };

        let mut data = json!({ "kind": err.kind().name() });
        if let CapabilityError::Validation {
            param, expected, ..
        } = err
        {
            data["param"] = json!(param);
            if let Some(expected) = expected {
                data["expected"] = json!(expected);
            }
        }
        Some(data)
    }

    /// The error's class when it came from the dispatcher.
    pub fn capability_kind(&self) -> Option<ErrorKind> {
        match self {
            McpError::Capability(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// Encode as a JSON-RPC error reply to `id`.
    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        let error = JsonRpcError::new(id, self.code(), self.to_string());
        match self.data() {
            Some(data) => error.with_data(data),
            None => error,
        }
    }
}
