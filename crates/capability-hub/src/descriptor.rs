//! Capability descriptors: immutable metadata bound to a handler reference.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::arguments::Arguments;
use crate::error::{CapabilityError, CapabilityResult};
use crate::registry::CapabilityRegistry;
use crate::template::UriTemplate;

/// The four namespaces a capability can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    /// Action invoked with arguments; may have side effects.
    Tool,
    /// Read-only data addressed by an exact URI.
    Resource,
    /// Read-only data addressed by a URI matching a parametrized pattern.
    ResourceTemplate,
    /// Instruction text assembled from arguments.
    Prompt,
}

impl CapabilityKind {
    /// All kinds, in listing order.
    pub const ALL: [CapabilityKind; 4] = [
        CapabilityKind::Tool,
        CapabilityKind::Resource,
        CapabilityKind::ResourceTemplate,
        CapabilityKind::Prompt,
    ];

    /// Stable snake_case name.
    pub fn name(&self) -> &'static str {
        match self {
            CapabilityKind::Tool => "tool",
            CapabilityKind::Resource => "resource",
            CapabilityKind::ResourceTemplate => "resource_template",
            CapabilityKind::Prompt => "prompt",
        }
    }

    /// Whether unknown extra arguments are rejected for this kind.
    pub fn is_strict(&self) -> bool {
        matches!(self, CapabilityKind::Tool | CapabilityKind::Prompt)
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CapabilityKind::Tool => "Tool",
            CapabilityKind::Resource => "Resource",
            CapabilityKind::ResourceTemplate => "Resource template",
            CapabilityKind::Prompt => "Prompt",
        };
        f.write_str(label)
    }
}

/// Semantic type tag of a declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    List(Box<ParamType>),
    /// Object with string keys and values of the inner type.
    Map(Box<ParamType>),
    /// Any JSON value, passed through unchanged.
    Any,
}

impl ParamType {
    /// `list<T>` shorthand.
    pub fn list_of(inner: ParamType) -> Self {
        ParamType::List(Box::new(inner))
    }

    /// `map<string,T>` shorthand.
    pub fn map_of(inner: ParamType) -> Self {
        ParamType::Map(Box::new(inner))
    }

    /// Human-readable type name used in validation messages.
    pub fn name(&self) -> String {
        match self {
            ParamType::String => "string".to_string(),
            ParamType::Number => "number".to_string(),
            ParamType::Integer => "integer".to_string(),
            ParamType::Boolean => "boolean".to_string(),
            ParamType::List(inner) => format!("list<{}>", inner.name()),
            ParamType::Map(inner) => format!("map<string,{}>", inner.name()),
            ParamType::Any => "any".to_string(),
        }
    }

    /// JSON Schema fragment for this type.
    pub fn json_schema(&self) -> Value {
        match self {
            ParamType::String => json!({ "type": "string" }),
            ParamType::Number => json!({ "type": "number" }),
            ParamType::Integer => json!({ "type": "integer" }),
            ParamType::Boolean => json!({ "type": "boolean" }),
            ParamType::List(inner) => json!({ "type": "array", "items": inner.json_schema() }),
            ParamType::Map(inner) => {
                json!({ "type": "object", "additionalProperties": inner.json_schema() })
            }
            ParamType::Any => json!({}),
        }
    }
}

/// One declared parameter of a capability.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub ty: ParamType,
    pub required: bool,
    /// Applied when the caller omits the argument (or sends `null`).
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl ParamSpec {
    /// A parameter the caller must supply.
    pub fn required(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            default: None,
            description: None,
        }
    }

    /// An optional parameter with no default; absent from the arguments when omitted.
    pub fn optional(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            required: false,
            ..Self::required(name, ty)
        }
    }

    /// Make the parameter optional, falling back to `value`.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.required = false;
        self.default = Some(value.into());
        self
    }

    /// Attach a description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Value returned by a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Structured value (tools, JSON resources).
    Json(Value),
    /// Plain text (prompts, text resources, string-returning tools).
    Text(String),
    /// Raw bytes (binary resources).
    Bytes(Vec<u8>),
}

impl Payload {
    /// Serialize any value into a JSON payload.
    pub fn json<T: Serialize>(value: &T) -> CapabilityResult<Self> {
        serde_json::to_value(value)
            .map(Payload::Json)
            .map_err(|e| CapabilityError::handler(format!("Failed to serialize result: {e}")))
    }

    /// Render as text: strings as-is, JSON pretty-printed, bytes lossily.
    pub fn to_text(&self) -> String {
        match self {
            Payload::Text(text) => text.clone(),
            Payload::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|e| e.to_string())
            }
            Payload::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<f64> for Payload {
    fn from(number: f64) -> Self {
        Payload::Json(Value::from(number))
    }
}

/// What a handler can see besides its arguments.
pub struct HandlerContext<'a> {
    /// The frozen registry, for handlers that report on the catalog itself.
    pub registry: &'a CapabilityRegistry,
    /// The concrete name or URI the caller asked for.
    pub target: &'a str,
}

/// Executable logic behind a capability.
pub type Handler =
    Arc<dyn Fn(&HandlerContext<'_>, Arguments) -> CapabilityResult<Payload> + Send + Sync>;

/// Immutable metadata describing one capability.
#[derive(Clone)]
pub struct CapabilityDescriptor {
    kind: CapabilityKind,
    identity: String,
    title: Option<String>,
    description: Option<String>,
    mime_type: Option<String>,
    params: Vec<ParamSpec>,
    template: Option<UriTemplate>,
    handler: Handler,
}

impl CapabilityDescriptor {
    /// Start describing a tool.
    pub fn tool<F>(name: impl Into<String>, handler: F) -> DescriptorBuilder
    where
        F: Fn(&HandlerContext<'_>, Arguments) -> CapabilityResult<Payload> + Send + Sync + 'static,
    {
        DescriptorBuilder::new(CapabilityKind::Tool, name.into(), Arc::new(handler))
    }

    /// Start describing a resource with an exact URI.
    pub fn resource<F>(uri: impl Into<String>, handler: F) -> DescriptorBuilder
    where
        F: Fn(&HandlerContext<'_>, Arguments) -> CapabilityResult<Payload> + Send + Sync + 'static,
    {
        DescriptorBuilder::new(CapabilityKind::Resource, uri.into(), Arc::new(handler))
    }

    /// Start describing a resource template such as `config://user/{user_id}`.
    pub fn resource_template<F>(pattern: impl Into<String>, handler: F) -> DescriptorBuilder
    where
        F: Fn(&HandlerContext<'_>, Arguments) -> CapabilityResult<Payload> + Send + Sync + 'static,
    {
        DescriptorBuilder::new(
            CapabilityKind::ResourceTemplate,
            pattern.into(),
            Arc::new(handler),
        )
    }

    /// Start describing a prompt.
    pub fn prompt<F>(name: impl Into<String>, handler: F) -> DescriptorBuilder
    where
        F: Fn(&HandlerContext<'_>, Arguments) -> CapabilityResult<Payload> + Send + Sync + 'static,
    {
        DescriptorBuilder::new(CapabilityKind::Prompt, name.into(), Arc::new(handler))
    }

    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }

    /// Name, URI or URI pattern.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Declared parameters, in declaration order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Parsed pattern, for resource templates only.
    pub fn template(&self) -> Option<&UriTemplate> {
        self.template.as_ref()
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// JSON Schema object describing the parameters.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.params {
            let mut schema = param.ty.json_schema();
            if let Value::Object(fields) = &mut schema {
                if let Some(description) = &param.description {
                    fields.insert("description".to_string(), json!(description));
                }
                if let Some(default) = &param.default {
                    fields.insert("default".to_string(), default.clone());
                }
            }
            properties.insert(param.name.clone(), schema);
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl fmt::Debug for CapabilityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityDescriptor")
            .field("kind", &self.kind)
            .field("identity", &self.identity)
            .field("title", &self.title)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Assembles a [`CapabilityDescriptor`] and checks its invariants.
pub struct DescriptorBuilder {
    kind: CapabilityKind,
    identity: String,
    title: Option<String>,
    description: Option<String>,
    mime_type: Option<String>,
    params: Vec<ParamSpec>,
    handler: Handler,
}

impl DescriptorBuilder {
    fn new(kind: CapabilityKind, identity: String, handler: Handler) -> Self {
        Self {
            kind,
            identity,
            title: None,
            description: None,
            mime_type: None,
            params: Vec::new(),
            handler,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Declare a parameter. Not allowed on resource templates, whose
    /// parameters come from the pattern.
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Validate and freeze the descriptor.
    pub fn build(self) -> CapabilityResult<CapabilityDescriptor> {
        let invalid = |reason: &str| CapabilityError::InvalidDescriptor {
            identity: self.identity.clone(),
            reason: reason.to_string(),
        };

        if self.identity.trim().is_empty() {
            return Err(invalid("identity must not be empty"));
        }

        let mut template = None;
        let mut params = self.params.clone();

        match self.kind {
            CapabilityKind::Tool | CapabilityKind::Prompt => {
                if self.identity.chars().any(char::is_whitespace) {
                    return Err(invalid("names must not contain whitespace"));
                }
            }
            CapabilityKind::Resource => {
                if !self.identity.contains("://") {
                    return Err(invalid("resource URIs need a scheme"));
                }
                if self.identity.contains('{') || self.identity.contains('}') {
                    return Err(invalid(
                        "placeholders are only allowed in resource templates",
                    ));
                }
            }
            CapabilityKind::ResourceTemplate => {
                if !params.is_empty() {
                    return Err(invalid(
                        "template parameters are derived from the pattern",
                    ));
                }
                let parsed = UriTemplate::parse(&self.identity)?;
                params = parsed
                    .placeholders()
                    .map(|name| ParamSpec::required(name, ParamType::String))
                    .collect();
                template = Some(parsed);
            }
        }

        for (i, param) in params.iter().enumerate() {
            if param.name.is_empty() {
                return Err(invalid("parameter names must not be empty"));
            }
            if params[..i].iter().any(|p| p.name == param.name) {
                return Err(invalid(&format!("duplicate parameter '{}'", param.name)));
            }
        }

        Ok(CapabilityDescriptor {
            kind: self.kind,
            identity: self.identity,
            title: self.title,
            description: self.description,
            mime_type: self.mime_type,
            params,
            template,
            handler: self.handler,
        })
    }
}
