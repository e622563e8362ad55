//! Transport adapters: they move raw JSON-RPC messages between a client and
//! the [`ProtocolHandler`](crate::protocol::ProtocolHandler) and nothing else.

pub mod stdio;

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub mod routes;
#[cfg(feature = "http")]
pub mod streamable;

pub use stdio::StdioTransport;

#[cfg(feature = "http")]
pub use http::{AppState, HttpTransport};
#[cfg(feature = "http")]
pub use streamable::{SessionStore, SESSION_HEADER};
