//! Wire types for the MCP protocol: JSON-RPC envelopes, handshake, and
//! tool/resource/prompt payloads.

pub mod capabilities;
pub mod error;
pub mod message;
pub mod request;
pub mod response;

pub use capabilities::*;
pub use error::*;
pub use message::*;
pub use request::*;
pub use response::*;
