//! Wire types: JSON-RPC envelopes, error encoding and result rendering.

use serde_json::json;

use capability_hub::{CapabilityError, CapabilityKind, Envelope, ErrorKind, Payload};
use capability_hub_mcp::types::*;

fn envelope(payload: Payload, mime_type: Option<&str>) -> Envelope {
    Envelope {
        kind: CapabilityKind::Tool,
        identity: "demo".to_string(),
        target: "demo://thing".to_string(),
        mime_type: mime_type.map(str::to_string),
        payload,
    }
}

#[test]
fn test_jsonrpc_request_parsing() {
    let json = r#"{"jsonrpc":"2.0","id":"req-1","method":"tools/list"}"#;
    let message: JsonRpcMessage = serde_json::from_str(json).unwrap();
    match message {
        JsonRpcMessage::Request(req) => {
            assert_eq!(req.id, RequestId::String("req-1".to_string()));
            assert_eq!(req.method, "tools/list");
            assert!(req.params.is_none());
        }
        other => panic!("expected a request, got {other:?}"),
    }
}

#[test]
fn test_notification_has_no_id() {
    let notif = JsonRpcNotification {
        jsonrpc: JSONRPC_VERSION.to_string(),
        method: "notifications/initialized".to_string(),
        params: None,
    };
    let text = serde_json::to_string(&notif).unwrap();
    assert!(!text.contains("\"id\""));

    let message: JsonRpcMessage = serde_json::from_str(&text).unwrap();
    assert_eq!(message.method(), Some("notifications/initialized"));
    assert!(matches!(message, JsonRpcMessage::Notification(_)));
}

#[test]
fn test_error_codes_for_capability_errors() {
    let not_found = |kind| McpError::from(CapabilityError::NotFound {
        kind,
        identity: "x".to_string(),
    });
    assert_eq!(not_found(CapabilityKind::Tool).code(), mcp_error_codes::TOOL_NOT_FOUND);
    assert_eq!(not_found(CapabilityKind::Prompt).code(), mcp_error_codes::PROMPT_NOT_FOUND);
    assert_eq!(
        not_found(CapabilityKind::ResourceTemplate).code(),
        mcp_error_codes::RESOURCE_NOT_FOUND
    );

    let denied = McpError::from(CapabilityError::SandboxViolation("../x".to_string()));
    assert_eq!(denied.code(), mcp_error_codes::ACCESS_DENIED);
    assert_eq!(denied.capability_kind(), Some(ErrorKind::SandboxViolation));

    let failed = McpError::from(CapabilityError::handler("boom"));
    assert_eq!(failed.code(), error_codes::INTERNAL_ERROR);

    assert_eq!(McpError::MethodNotFound("m".to_string()).capability_kind(), None);
}

#[test]
fn test_validation_error_carries_param() {
    let err = McpError::from(CapabilityError::type_mismatch("count", "integer"));
    let rpc = err.to_json_rpc_error(RequestId::Number(5));
    assert_eq!(rpc.id, RequestId::Number(5));
    assert_eq!(rpc.error.code, error_codes::INVALID_PARAMS);

    let data = rpc.error.data.unwrap();
    assert_eq!(data["param"], "count");
    assert_eq!(data["expected"], "integer");
    assert_eq!(data["kind"], "validation");
}

#[test]
fn test_protocol_errors_have_no_data() {
    let rpc = McpError::ParseError("eof".to_string()).to_json_rpc_error(RequestId::Null);
    assert_eq!(rpc.error.code, error_codes::PARSE_ERROR);
    assert!(rpc.error.data.is_none());
    let text = serde_json::to_string(&rpc).unwrap();
    assert!(text.contains("\"id\":null"));
    assert!(!text.contains("\"data\""));
}

#[test]
fn test_default_initialize_result() {
    let result = InitializeResult::default_result();
    assert_eq!(result.protocol_version, MCP_VERSION);
    assert_eq!(result.server_info.name, SERVER_NAME);
    assert_eq!(result.server_info.version, SERVER_VERSION);

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["capabilities"]["tools"]["listChanged"], false);
    assert_eq!(value["capabilities"]["resources"]["subscribe"], false);
}

#[test]
fn test_initialize_params_tolerate_missing_fields() {
    let params: InitializeParams = serde_json::from_value(json!({})).unwrap();
    assert!(params.protocol_version.is_empty());
    assert!(params.client_info.name.is_empty());
}

#[test]
fn test_tool_results_render_payloads() {
    let text = ToolCallResult::from_envelope(envelope(Payload::Json(json!("plain")), None));
    assert_eq!(text.content, vec![ToolContent::Text { text: "plain".to_string() }]);
    assert!(text.is_error.is_none());

    let pretty = ToolCallResult::from_envelope(envelope(Payload::Json(json!({"a": 1})), None));
    assert_eq!(
        pretty.content,
        vec![ToolContent::Text { text: "{\n  \"a\": 1\n}".to_string() }]
    );

    let bytes = ToolCallResult::from_envelope(envelope(Payload::Bytes(b"hi".to_vec()), None));
    match &bytes.content[0] {
        ToolContent::Resource { resource } => {
            assert_eq!(resource.blob.as_deref(), Some("aGk="));
            assert_eq!(resource.mime_type.as_deref(), Some("application/octet-stream"));
            assert_eq!(resource.uri, "demo://thing");
        }
        other => panic!("expected a blob, got {other:?}"),
    }

    let error = serde_json::to_value(ToolCallResult::error("bad".to_string())).unwrap();
    assert_eq!(error["isError"], true);
}

#[test]
fn test_resource_content_mime_types() {
    let json = ResourceContent::from_envelope(envelope(Payload::Json(json!([1])), None));
    assert_eq!(json.mime_type.as_deref(), Some("application/json"));
    assert_eq!(json.text.as_deref(), Some("[\n  1\n]"));

    let text = ResourceContent::from_envelope(envelope(
        Payload::Text("hello".to_string()),
        Some("text/plain"),
    ));
    assert_eq!(text.mime_type.as_deref(), Some("text/plain"));
    assert_eq!(text.text.as_deref(), Some("hello"));
    assert!(text.blob.is_none());
}
