//! Streamable HTTP: `initialize` opens a session named by the
//! `Mcp-Session-Id` header, later requests must carry it, and `DELETE`
//! closes it. Replies go out as a single SSE `message` event when the client
//! accepts `text/event-stream`.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::protocol::ProtocolHandler;
use crate::types::{McpError, RequestId};

use super::http::AppState;

/// Session header name, lowercase as it travels on the wire.
pub const SESSION_HEADER: &str = "mcp-session-id";

struct Session {
    handler: ProtocolHandler,
    last_seen: Instant,
}

/// Live sessions, each with its own handshake state.
///
/// A session idle for longer than `idle_timeout` is gone; when `max_sessions`
/// are open, creating one closes the least recently used.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::default(),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Open a session derived from `base` and return its id.
    pub async fn create(&self, base: &ProtocolHandler) -> (String, ProtocolHandler) {
        let id = Uuid::new_v4().to_string();
        let handler = base.new_session();
        let now = Instant::now();

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, session| now.duration_since(session.last_seen) < self.idle_timeout);
        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, session)| session.last_seen)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
            tracing::debug!(session = %oldest, "Session evicted to make room");
        }
        sessions.insert(
            id.clone(),
            Session {
                handler: handler.clone(),
                last_seen: now,
            },
        );
        (id, handler)
    }

    /// Look up a live session and mark it used. An expired session is
    /// dropped and reported as missing.
    pub async fn get(&self, id: &str) -> Option<ProtocolHandler> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;
        if now.duration_since(session.last_seen) >= self.idle_timeout {
            sessions.remove(id);
            tracing::debug!(session = %id, "Session expired");
            return None;
        }
        session.last_seen = now;
        Some(session.handler.clone())
    }

    /// Close a session. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Drop every expired session; returns how many were dropped.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| now.duration_since(session.last_seen) < self.idle_timeout);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Spawn a background task that periodically drops expired sessions.
pub fn spawn_sweeper(store: SessionStore, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let dropped = store.sweep().await;
            if dropped > 0 {
                tracing::info!(dropped, "Expired sessions closed");
            }
        }
    })
}

pub(crate) async fn handle_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let value: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(e) => {
            let err = McpError::ParseError(e.to_string());
            return rpc_error(StatusCode::BAD_REQUEST, &err, RequestId::Null);
        }
    };

    // Only an initialize request opens a session; as a notification it
    // would never be answered.
    let is_initialize = value.get("method").and_then(Value::as_str) == Some("initialize")
        && value.get("id").is_some_and(|id| !id.is_null());

    let (session_id, handler) = if is_initialize {
        let (id, handler) = state.sessions.create(&state.handler).await;
        tracing::info!(session = %id, "Session opened");
        (id, handler)
    } else {
        let Some(id) = session_id(&headers) else {
            let err = McpError::InvalidRequest("missing Mcp-Session-Id header".to_string());
            return rpc_error(StatusCode::BAD_REQUEST, &err, request_id(&value));
        };
        match state.sessions.get(&id).await {
            Some(handler) => (id, handler),
            None => {
                let err = McpError::SessionNotFound(id);
                return rpc_error(StatusCode::NOT_FOUND, &err, request_id(&value));
            }
        }
    };

    let reply = handler.handle_value(value).await;

    if is_initialize && reply.as_ref().is_some_and(|r| r.get("error").is_some()) {
        state.sessions.remove(&session_id).await;
        tracing::debug!(session = %session_id, "Initialize failed, session discarded");
        return Json(reply).into_response();
    }

    let mut response = match reply {
        Some(reply) if accepts_event_stream(&headers) => {
            let event = Event::default().event("message").data(reply.to_string());
            Sse::new(stream::once(async move { Ok::<_, Infallible>(event) })).into_response()
        }
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    };

    if let Ok(value) = HeaderValue::from_str(&session_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(SESSION_HEADER), value);
    }
    response
}

pub(crate) async fn handle_delete(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    let Some(id) = session_id(&headers) else {
        return StatusCode::BAD_REQUEST;
    };

    if state.sessions.remove(&id).await {
        tracing::info!(session = %id, "Session closed");
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn accepts_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/event-stream"))
}

fn request_id(value: &Value) -> RequestId {
    value
        .get("id")
        .cloned()
        .and_then(|id| serde_json::from_value(id).ok())
        .unwrap_or(RequestId::Null)
}

fn rpc_error(status: StatusCode, err: &McpError, id: RequestId) -> Response {
    (status, Json(err.to_json_rpc_error(id))).into_response()
}
