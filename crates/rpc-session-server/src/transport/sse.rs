//! SSE transport: JSON-RPC over HTTP POST, pushes over Server-Sent Events.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rpc_session::ChannelConnection;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tower_http::cors::CorsLayer;

use crate::protocol::{error_value, CallContext, ProtocolHandler};
use crate::types::{JsonRpcMessage, RequestId, RpcError, RpcResult};

/// SSE transport for web-based clients.
pub struct SseTransport {
    handler: Arc<ProtocolHandler>,
}

impl SseTransport {
    /// Create a new SSE transport.
    pub fn new(handler: ProtocolHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// The protocol handler.
    pub fn handler(&self) -> &Arc<ProtocolHandler> {
        &self.handler
    }

    /// Build the HTTP router.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/rpc", post(Self::handle_request))
            .route("/events/:session_id", get(Self::handle_events))
            .route("/health", get(|| async { "ok" }))
            .layer(CorsLayer::permissive())
            .with_state(Arc::clone(&self.handler))
    }

    /// Run the SSE server on the given address.
    pub async fn run(&self, addr: &str) -> RpcResult<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(RpcError::Io)?;

        tracing::info!("SSE transport listening on {addr}");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        Ok(())
    }

    /// One JSON-RPC message per POST. A body that is not JSON gets a
    /// `ParseError`, JSON that is not a message gets `InvalidRequest`;
    /// notifications get `204 No Content`.
    async fn handle_request(
        State(handler): State<Arc<ProtocolHandler>>,
        body: String,
    ) -> Response {
        let response = match JsonRpcMessage::parse(&body) {
            Ok(msg) => handler.handle_message(msg, &CallContext::default()),
            Err(e) => Some(error_value(RequestId::Null, e)),
        };

        match response {
            Some(response) => Json(response).into_response(),
            None => StatusCode::NO_CONTENT.into_response(),
        }
    }

    async fn handle_events(
        State(handler): State<Arc<ProtocolHandler>>,
        Path(session_id): Path<String>,
    ) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
        let session = handler
            .store()
            .get_by_str(&session_id)
            .map_err(|_| StatusCode::NOT_FOUND)?;

        let (connection, rx) = ChannelConnection::new();
        session.set_connection(Some(Arc::new(connection)));
        session.touch();
        tracing::debug!(session_id = %session.id(), "Event stream attached");

        let stream = UnboundedReceiverStream::new(rx)
            .map(|text| Ok::<_, Infallible>(Event::default().event("push").data(text)));

        Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
    }
}
