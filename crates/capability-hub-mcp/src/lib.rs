//! Capability Hub MCP server: exposes calculator, text, workspace-file,
//! system and configuration capabilities, plus prompt templates, to any
//! MCP-compatible client.
//!
//! The [`catalog`] module assembles the registry from the provider modules;
//! a [`ProtocolHandler`] speaks JSON-RPC on top of the dispatcher; the
//! [`transport`] module carries messages over stdio or HTTP.

pub mod catalog;
pub mod config;
pub mod metrics;
pub mod prompts;
pub mod protocol;
pub mod resources;
pub mod tools;
pub mod transport;
pub mod types;

pub use catalog::build_registry;
pub use config::{load_config, ServerConfig, Transport};
pub use metrics::Metrics;
pub use protocol::ProtocolHandler;
pub use transport::StdioTransport;

#[cfg(feature = "http")]
pub use transport::HttpTransport;
