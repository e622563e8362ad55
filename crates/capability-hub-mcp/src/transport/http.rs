//! HTTP transports on axum: the stateless single-request endpoint and the
//! session-tracking streamable endpoint share one router and the REST API.

use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Transport;
use crate::protocol::ProtocolHandler;
use crate::types::{McpError, McpResult};

use super::routes;
use super::streamable::{self, SessionStore};

/// Shared state behind every route.
#[derive(Clone)]
pub struct AppState {
    /// Template handler. Stateless mode serves every request with it;
    /// streamable mode derives one handler per session from it.
    pub handler: ProtocolHandler,
    pub sessions: SessionStore,
    pub transport: Transport,
}

/// Serves the MCP endpoint and REST API over HTTP.
pub struct HttpTransport {
    state: AppState,
}

impl HttpTransport {
    /// Build for `transport`, which must be one of the HTTP variants.
    pub fn new(handler: ProtocolHandler, transport: Transport) -> McpResult<Self> {
        let handler = match transport {
            Transport::Http => handler.stateless(),
            Transport::StreamableHttp => handler,
            Transport::Stdio => {
                return Err(McpError::Config(
                    "the HTTP transport cannot serve stdio".to_string(),
                ))
            }
        };

        let config = handler.config();
        let sessions = SessionStore::new(
            Duration::from_secs(config.session_idle_timeout_secs),
            config.max_sessions,
        );

        Ok(Self {
            state: AppState {
                handler,
                sessions,
                transport,
            },
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Full application router, ready to serve or to drive with `oneshot`.
    pub fn router(&self) -> Router {
        let mount = self.state.handler.config().mcp_mount_path.clone();

        let mcp = match self.state.transport {
            Transport::StreamableHttp => Router::new().route(
                &mount,
                post(streamable::handle_post).delete(streamable::handle_delete),
            ),
            _ => Router::new().route(&mount, post(handle_stateless)),
        };

        routes::api_router()
            .merge(mcp)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Bind `addr` and serve until the process exits.
    pub async fn run(&self, addr: &str) -> McpResult<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;

        let sweeper = (self.state.transport == Transport::StreamableHttp).then(|| {
            let idle = Duration::from_secs(self.state.handler.config().session_idle_timeout_secs);
            let every = (idle / 4).max(Duration::from_secs(1));
            streamable::spawn_sweeper(self.state.sessions.clone(), every)
        });

        tracing::info!(
            transport = %self.state.transport,
            mount = %self.state.handler.config().mcp_mount_path,
            "HTTP transport listening on {addr}"
        );

        let served = axum::serve(listener, self.router())
            .await
            .map_err(|e| McpError::Transport(e.to_string()));
        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }
        served
    }
}

/// One POST, one self-contained JSON-RPC exchange.
async fn handle_stateless(State(state): State<AppState>, body: String) -> Response {
    match state.handler.handle_raw(&body).await {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
