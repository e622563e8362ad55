//! Result payloads for tools, resources and prompts, and their construction
//! from registry descriptors and dispatcher envelopes.

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use capability_hub::{CapabilityDescriptor, Envelope, Payload};

/// One item of tool or prompt content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "resource")]
    Resource { resource: ResourceContent },
}

/// `tools/call` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    #[serde(default, rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolCallResult {
    pub fn text(text: String) -> Self {
        Self {
            content: vec![ToolContent::Text { text }],
            is_error: None,
        }
    }

    /// Pretty-printed JSON as text content.
    pub fn json(value: &impl Serialize) -> Self {
        let text = serde_json::to_string_pretty(value).unwrap_or_else(|e| e.to_string());
        Self::text(text)
    }

    /// A failed call reported in-band, so the model can read the message.
    pub fn error(message: String) -> Self {
        Self {
            content: vec![ToolContent::Text { text: message }],
            is_error: Some(true),
        }
    }

    /// Render a tool's return value.
    ///
    /// JSON strings become bare text; other JSON is pretty-printed; bytes are
    /// embedded as a base64 blob.
    pub fn from_envelope(envelope: Envelope) -> Self {
        match envelope.payload {
            Payload::Text(text) | Payload::Json(Value::String(text)) => Self::text(text),
            Payload::Json(value) => Self::json(&value),
            Payload::Bytes(bytes) => Self {
                content: vec![ToolContent::Resource {
                    resource: ResourceContent::blob(envelope.target, envelope.mime_type, &bytes),
                }],
                is_error: None,
            },
        }
    }
}

/// `tools/list` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl From<&CapabilityDescriptor> for ToolDefinition {
    fn from(descriptor: &CapabilityDescriptor) -> Self {
        Self {
            name: descriptor.identity().to_string(),
            title: descriptor.title().map(str::to_string),
            description: descriptor.description().map(str::to_string),
            input_schema: descriptor.input_schema(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolListResult {
    pub tools: Vec<ToolDefinition>,
    #[serde(
        default,
        rename = "nextCursor",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_cursor: Option<String>,
}

/// Body of a resource read: text or base64 blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceContent {
    pub uri: String,
    #[serde(default, rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<String>,
}

impl ResourceContent {
    pub fn text(uri: String, mime_type: Option<String>, text: String) -> Self {
        Self {
            uri,
            mime_type,
            text: Some(text),
            blob: None,
        }
    }

    pub fn blob(uri: String, mime_type: Option<String>, bytes: &[u8]) -> Self {
        Self {
            uri,
            mime_type: mime_type.or_else(|| Some("application/octet-stream".to_string())),
            text: None,
            blob: Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
        }
    }

    /// Render a resource handler's return value under the requested URI.
    pub fn from_envelope(envelope: Envelope) -> Self {
        let Envelope {
            target,
            mime_type,
            payload,
            ..
        } = envelope;

        match payload {
            Payload::Text(text) => Self::text(target, mime_type, text),
            Payload::Json(value) => {
                let text = serde_json::to_string_pretty(&value).unwrap_or_else(|e| e.to_string());
                let mime_type = mime_type.or_else(|| Some("application/json".to_string()));
                Self::text(target, mime_type, text)
            }
            Payload::Bytes(bytes) => Self::blob(target, mime_type, &bytes),
        }
    }
}

/// `resources/list` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub uri: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl From<&CapabilityDescriptor> for ResourceDefinition {
    fn from(descriptor: &CapabilityDescriptor) -> Self {
        Self {
            uri: descriptor.identity().to_string(),
            name: display_name(descriptor),
            description: descriptor.description().map(str::to_string),
            mime_type: descriptor.mime_type().map(str::to_string),
        }
    }
}

/// `resources/templates/list` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceTemplateDefinition {
    #[serde(rename = "uriTemplate")]
    pub uri_template: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl From<&CapabilityDescriptor> for ResourceTemplateDefinition {
    fn from(descriptor: &CapabilityDescriptor) -> Self {
        Self {
            uri_template: descriptor.identity().to_string(),
            name: display_name(descriptor),
            description: descriptor.description().map(str::to_string),
            mime_type: descriptor.mime_type().map(str::to_string),
        }
    }
}

fn display_name(descriptor: &CapabilityDescriptor) -> String {
    descriptor
        .title()
        .unwrap_or_else(|| descriptor.identity())
        .to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceListResult {
    pub resources: Vec<ResourceDefinition>,
    #[serde(
        default,
        rename = "nextCursor",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceTemplateListResult {
    #[serde(rename = "resourceTemplates")]
    pub resource_templates: Vec<ResourceTemplateDefinition>,
    #[serde(
        default,
        rename = "nextCursor",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_cursor: Option<String>,
}

/// `resources/read` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResourceResult {
    pub contents: Vec<ResourceContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// `prompts/list` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<PromptArgument>>,
}

impl From<&CapabilityDescriptor> for PromptDefinition {
    fn from(descriptor: &CapabilityDescriptor) -> Self {
        let arguments: Vec<PromptArgument> = descriptor
            .params()
            .iter()
            .map(|param| PromptArgument {
                name: param.name.clone(),
                description: param.description.clone(),
                required: param.required,
            })
            .collect();

        Self {
            name: descriptor.identity().to_string(),
            title: descriptor.title().map(str::to_string),
            description: descriptor.description().map(str::to_string),
            arguments: (!arguments.is_empty()).then_some(arguments),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptListResult {
    pub prompts: Vec<PromptDefinition>,
    #[serde(
        default,
        rename = "nextCursor",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_cursor: Option<String>,
}

/// One message of an expanded prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    /// `user` or `assistant`.
    pub role: String,
    pub content: ToolContent,
}

/// `prompts/get` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptGetResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub messages: Vec<PromptMessage>,
}

impl PromptGetResult {
    /// Wrap a prompt handler's text as a single user message.
    pub fn from_envelope(envelope: Envelope, description: Option<String>) -> Self {
        Self {
            description,
            messages: vec![PromptMessage {
                role: "user".to_string(),
                content: ToolContent::Text {
                    text: envelope.payload.to_text(),
                },
            }],
        }
    }
}
