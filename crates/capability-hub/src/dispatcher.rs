//! Request dispatch: resolve, validate, invoke, translate.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::arguments::{coerce, Arguments};
use crate::descriptor::{CapabilityDescriptor, CapabilityKind, HandlerContext, Payload};
use crate::error::{CapabilityError, CapabilityResult};
use crate::registry::CapabilityRegistry;
use crate::template::{match_uri, TemplateParams};

/// One call, as decoded by a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    /// `Tool`, `Prompt`, or `Resource` (which also covers templates).
    pub kind: CapabilityKind,
    /// Name for tools and prompts, concrete URI for resources.
    pub target: String,
    pub arguments: Map<String, Value>,
}

impl InvocationRequest {
    pub fn tool(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            kind: CapabilityKind::Tool,
            target: name.into(),
            arguments,
        }
    }

    pub fn resource(uri: impl Into<String>) -> Self {
        Self {
            kind: CapabilityKind::Resource,
            target: uri.into(),
            arguments: Map::new(),
        }
    }

    pub fn prompt(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            kind: CapabilityKind::Prompt,
            target: name.into(),
            arguments,
        }
    }
}

/// Turn a protocol `arguments` field into an argument map.
///
/// Absent and `null` mean no arguments; anything but an object is rejected.
pub fn arguments_from_value(value: Option<Value>) -> CapabilityResult<Map<String, Value>> {
    match value {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(CapabilityError::type_mismatch("arguments", "object")),
    }
}

/// Successful outcome, tagged with the capability kind so transports know
/// how to serialize the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub kind: CapabilityKind,
    /// Identity of the resolved descriptor (the pattern, for templates).
    pub identity: String,
    /// What the caller asked for (the concrete URI, for templates).
    pub target: String,
    pub mime_type: Option<String>,
    pub payload: Payload,
}

/// Outcome of [`Dispatcher::invoke`].
pub type InvocationResult = Result<Envelope, CapabilityError>;

/// Resolves requests against a frozen registry and runs their handlers.
///
/// Holds no mutable state; clone it freely and call it from any thread.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Run one request to completion. Every failure, including a handler
    /// panic, comes back as an `Err` value.
    pub fn invoke(&self, request: InvocationRequest) -> InvocationResult {
        let kind = request.kind;
        let target = request.target.clone();

        let result = self.try_invoke(request);
        match &result {
            Ok(envelope) => log::debug!("{} '{}' completed", envelope.kind.name(), target),
            Err(e) => log::warn!("{} '{}' failed ({}): {}", kind.name(), target, e.kind(), e),
        }
        result
    }

    /// Find the descriptor a request addresses.
    ///
    /// Resources try the templates first, in registration order, then the
    /// exact resource namespace.
    pub fn resolve(
        &self,
        kind: CapabilityKind,
        target: &str,
    ) -> CapabilityResult<(&CapabilityDescriptor, TemplateParams)> {
        match kind {
            CapabilityKind::Tool | CapabilityKind::Prompt => self
                .registry
                .lookup_exact(kind, target)
                .map(|descriptor| (descriptor, TemplateParams::new())),
            CapabilityKind::Resource | CapabilityKind::ResourceTemplate => {
                if let Some(found) = match_uri(self.registry.all_templates(), target) {
                    return Ok(found);
                }
                self.registry
                    .lookup_exact(CapabilityKind::Resource, target)
                    .map(|descriptor| (descriptor, TemplateParams::new()))
            }
        }
    }

    fn try_invoke(&self, request: InvocationRequest) -> InvocationResult {
        let (descriptor, uri_params) = self.resolve(request.kind, &request.target)?;
        let arguments = validate(descriptor, request.arguments, uri_params)?;

        let context = HandlerContext {
            registry: &self.registry,
            target: &request.target,
        };
        let handler = descriptor.handler();

        let payload = match panic::catch_unwind(AssertUnwindSafe(|| handler(&context, arguments))) {
            Ok(result) => result?,
            Err(panic) => {
                return Err(CapabilityError::HandlerExecution(panic_message(panic.as_ref())))
            }
        };

        Ok(Envelope {
            kind: descriptor.kind(),
            identity: descriptor.identity().to_string(),
            target: request.target,
            mime_type: descriptor.mime_type().map(str::to_string),
            payload,
        })
    }
}

/// Merge, check and coerce arguments against a descriptor's parameters.
///
/// URI-extracted parameters override explicit arguments of the same name.
pub fn validate(
    descriptor: &CapabilityDescriptor,
    explicit: Map<String, Value>,
    uri_params: TemplateParams,
) -> CapabilityResult<Arguments> {
    let mut supplied = explicit;
    for (name, value) in uri_params {
        supplied.insert(name, Value::String(value));
    }

    let mut values = Map::new();
    for param in descriptor.params() {
        let value = match supplied.remove(&param.name) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        };

        match (value, &param.default) {
            (Some(value), _) => {
                values.insert(param.name.clone(), coerce(&param.name, &param.ty, value)?);
            }
            (None, Some(default)) => {
                values.insert(
                    param.name.clone(),
                    coerce(&param.name, &param.ty, default.clone())?,
                );
            }
            (None, None) if param.required => {
                return Err(CapabilityError::Validation {
                    param: param.name.clone(),
                    expected: Some(param.ty.name()),
                    message: "missing required argument".to_string(),
                });
            }
            (None, None) => {}
        }
    }

    if descriptor.kind().is_strict() {
        if let Some(extra) = supplied.keys().next() {
            return Err(CapabilityError::invalid(extra.as_str(), "unexpected argument"));
        }
    }

    Ok(Arguments::new(values))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("Handler panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("Handler panicked: {message}")
    } else {
        "Handler panicked".to_string()
    }
}
