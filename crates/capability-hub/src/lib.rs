//! Capability Hub: a registry of named tools, resources and prompts, a URI
//! template matcher, and a dispatcher that validates arguments and runs
//! handlers.
//!
//! Providers build [`CapabilityDescriptor`]s and register them with a
//! [`RegistryBuilder`] at startup. The frozen [`CapabilityRegistry`] is then
//! shared read-only by every transport through a [`Dispatcher`].
//!
//! Filesystem-touching handlers confine caller paths with [`PathSandbox`].

pub mod arguments;
pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod sandbox;
pub mod template;

pub use arguments::Arguments;
pub use descriptor::{
    CapabilityDescriptor, CapabilityKind, DescriptorBuilder, Handler, HandlerContext, ParamSpec,
    ParamType, Payload,
};
pub use dispatcher::{
    arguments_from_value, Dispatcher, Envelope, InvocationRequest, InvocationResult,
};
pub use error::{CapabilityError, CapabilityResult, ErrorKind};
pub use registry::{CapabilityRegistry, RegistryBuilder};
pub use sandbox::PathSandbox;
pub use template::{match_uri, TemplateParams, UriTemplate};
