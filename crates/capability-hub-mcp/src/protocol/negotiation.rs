//! Handshake state for one connection or session.

use crate::types::{
    ClientCapabilities, InitializeParams, InitializeResult, McpError, McpResult, MCP_VERSION,
};

/// What the client declared, and how far the handshake has got.
#[derive(Debug, Clone, Default)]
pub struct NegotiatedCapabilities {
    pub client: ClientCapabilities,
    pub client_name: Option<String>,
    /// `initialize` has been answered.
    pub negotiated: bool,
    /// The client confirmed with `notifications/initialized`.
    pub initialized: bool,
}

impl NegotiatedCapabilities {
    /// Record the client's `initialize` and build the reply.
    pub fn negotiate(
        &mut self,
        params: InitializeParams,
        app_name: &str,
        version: &str,
    ) -> McpResult<InitializeResult> {
        if !params.protocol_version.is_empty() && params.protocol_version != MCP_VERSION {
            tracing::warn!(
                "Client requested protocol version {}, server supports {}. Proceeding with server version.",
                params.protocol_version,
                MCP_VERSION
            );
        }

        tracing::info!(
            "Initialized with client: {} v{}",
            params.client_info.name,
            params.client_info.version
        );

        self.client = params.capabilities;
        self.client_name = Some(params.client_info.name);
        self.negotiated = true;

        Ok(InitializeResult::for_server(app_name, version))
    }

    /// Handle the client's `initialized` notification.
    pub fn mark_initialized(&mut self) {
        if !self.negotiated {
            tracing::warn!("Received initialized before initialize");
        }
        self.initialized = true;
        tracing::info!("MCP handshake complete");
    }

    /// Requests other than `initialize` and `ping` need a prior `initialize`.
    pub fn ensure_initialized(&self) -> McpResult<()> {
        if !self.negotiated {
            return Err(McpError::InvalidRequest(
                "Server not yet initialized. Send 'initialize' first.".to_string(),
            ));
        }
        Ok(())
    }
}
