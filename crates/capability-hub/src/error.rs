//! Error taxonomy shared by the registry, dispatcher, sandbox and handlers.

use std::fmt;

use thiserror::Error;

use crate::descriptor::CapabilityKind;

/// Every failure a capability invocation (or registration) can produce.
#[derive(Debug, Clone, Error)]
pub enum CapabilityError {
    /// Unknown capability identity / URI, or a missing file behind a handler.
    #[error("{kind} not found: {identity}")]
    NotFound {
        /// Namespace that was searched.
        kind: CapabilityKind,
        /// Name, URI or path that could not be resolved.
        identity: String,
    },

    /// Missing, mistyped or otherwise invalid argument.
    #[error("Invalid argument '{param}': {message}")]
    Validation {
        /// Offending parameter name.
        param: String,
        /// Expected semantic type, if the failure was a type mismatch.
        expected: Option<String>,
        /// Human-readable reason.
        message: String,
    },

    /// Two providers registered the same identity in one namespace.
    #[error("Duplicate {kind} registration: {identity}")]
    DuplicateCapability {
        /// Namespace of the collision.
        kind: CapabilityKind,
        /// Colliding identity.
        identity: String,
    },

    /// A descriptor violates a structural invariant (empty name, bad template).
    #[error("Invalid capability descriptor '{identity}': {reason}")]
    InvalidDescriptor {
        /// Identity of the rejected descriptor.
        identity: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A caller-supplied path escapes the sandbox root.
    ///
    /// Carries the caller's relative path only, never the resolved host path.
    #[error("Access denied: path '{0}' is outside the workspace")]
    SandboxViolation(String),

    /// Target already exists and the caller did not ask to overwrite it.
    #[error("'{0}' already exists. Set overwrite=true to replace it.")]
    AlreadyExists(String),

    /// Any other failure raised while a handler was running.
    #[error("{0}")]
    HandlerExecution(String),
}

/// Result alias for capability operations.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Flat tag of a [`CapabilityError`], used by transports and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Validation,
    DuplicateCapability,
    InvalidDescriptor,
    SandboxViolation,
    AlreadyExists,
    HandlerExecution,
}

impl ErrorKind {
    /// Stable snake_case name.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::DuplicateCapability => "duplicate_capability",
            ErrorKind::InvalidDescriptor => "invalid_descriptor",
            ErrorKind::SandboxViolation => "sandbox_violation",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::HandlerExecution => "handler_execution",
        }
    }

    /// Whether this class must stop the process from starting.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ErrorKind::DuplicateCapability | ErrorKind::InvalidDescriptor
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl CapabilityError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CapabilityError::NotFound { .. } => ErrorKind::NotFound,
            CapabilityError::Validation { .. } => ErrorKind::Validation,
            CapabilityError::DuplicateCapability { .. } => ErrorKind::DuplicateCapability,
            CapabilityError::InvalidDescriptor { .. } => ErrorKind::InvalidDescriptor,
            CapabilityError::SandboxViolation(_) => ErrorKind::SandboxViolation,
            CapabilityError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            CapabilityError::HandlerExecution(_) => ErrorKind::HandlerExecution,
        }
    }

    /// Shorthand for a validation failure without a type expectation.
    pub fn invalid(param: impl Into<String>, message: impl Into<String>) -> Self {
        CapabilityError::Validation {
            param: param.into(),
            expected: None,
            message: message.into(),
        }
    }

    /// Shorthand for a failed coercion to `expected`.
    pub fn type_mismatch(param: impl Into<String>, expected: impl Into<String>) -> Self {
        let expected = expected.into();
        CapabilityError::Validation {
            param: param.into(),
            message: format!("expected {expected}"),
            expected: Some(expected),
        }
    }

    /// Shorthand for a handler failure.
    pub fn handler(message: impl Into<String>) -> Self {
        CapabilityError::HandlerExecution(message.into())
    }

    /// Missing file or directory behind a filesystem handler.
    pub fn missing_path(path: impl Into<String>) -> Self {
        CapabilityError::NotFound {
            kind: CapabilityKind::Resource,
            identity: path.into(),
        }
    }

    /// The offending parameter, for validation failures.
    pub fn param(&self) -> Option<&str> {
        match self {
            CapabilityError::Validation { param, .. } => Some(param),
            _ => None,
        }
    }
}
