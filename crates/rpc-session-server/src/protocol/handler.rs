//! Request dispatch: session resolution, method routing, response framing.

use std::sync::Arc;

use rpc_session::{Connection, Session, SessionStore};
use serde_json::Value;

use crate::config::ServerConfig;
use crate::methods::MethodRegistry;
use crate::types::{JsonRpcMessage, JsonRpcRequest, JsonRpcResponse, RequestId, RpcError};

/// Per-call context supplied by the transport.
#[derive(Clone, Default)]
pub struct CallContext {
    /// Connection the request arrived on, if the transport can carry pushes.
    pub connection: Option<Arc<dyn Connection>>,
}

impl CallContext {
    /// Context for a transport that can deliver pushes on `connection`.
    pub fn with_connection(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection: Some(connection),
        }
    }
}

/// Routes JSON-RPC messages to session methods.
pub struct ProtocolHandler {
    store: Arc<SessionStore>,
    registry: MethodRegistry,
}

impl ProtocolHandler {
    /// Create a handler over `store` using the prefix and admin permission
    /// from `config`.
    pub fn new(store: Arc<SessionStore>, config: &ServerConfig) -> Self {
        Self {
            store,
            registry: MethodRegistry::new(&config.prefix, &config.admin_permission),
        }
    }

    /// The session store.
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// The method registry.
    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Handle one message. Returns the response to send, if any.
    pub fn handle_message(&self, msg: JsonRpcMessage, ctx: &CallContext) -> Option<Value> {
        tracing::trace!(
            method = msg.method().unwrap_or("-"),
            has_session = msg.session_token().is_some(),
            "Message received"
        );
        match msg {
            JsonRpcMessage::Request(request) => Some(self.handle_request(request, ctx)),
            JsonRpcMessage::Notification(notification) => {
                // Public methods only produce a result, which a notification discards.
                if self.registry.always_allow(&notification.method) {
                    tracing::debug!(
                        method = %notification.method,
                        "Ignoring notification for result-only method"
                    );
                    return None;
                }
                let session = self.resolve_session(notification.session.as_deref(), ctx);
                if let Err(e) = self.registry.call(
                    &notification.method,
                    session.as_ref(),
                    notification.params,
                    &self.store,
                ) {
                    tracing::debug!(
                        method = %notification.method,
                        error = %e,
                        "Notification failed"
                    );
                }
                None
            }
            JsonRpcMessage::Response(_) | JsonRpcMessage::Error(_) => {
                tracing::debug!("Ignoring client-sent response");
                None
            }
        }
    }

    fn handle_request(&self, request: JsonRpcRequest, ctx: &CallContext) -> Value {
        let id = request.id.clone();

        if request.jsonrpc != crate::types::JSONRPC_VERSION {
            return error_value(
                id,
                RpcError::InvalidRequest(format!(
                    "unsupported jsonrpc version '{}'",
                    request.jsonrpc
                )),
            );
        }

        let session = self.resolve_session(request.session.as_deref(), ctx);
        match self.registry.call(
            &request.method,
            session.as_ref(),
            request.params,
            &self.store,
        ) {
            Ok(result) => serde_json::to_value(JsonRpcResponse::new(id, result))
                .unwrap_or(Value::Null),
            Err(e) => {
                tracing::debug!(method = %request.method, error = %e, "Request failed");
                error_value(id, e)
            }
        }
    }

    /// Resolve a caller-presented token to a live session.
    ///
    /// Unknown or malformed tokens resolve to no session. A resolved session
    /// is touched and bound to the transport's connection.
    fn resolve_session(&self, token: Option<&str>, ctx: &CallContext) -> Option<Arc<Session>> {
        let session = self.store.get_by_str(token?).ok()?;
        session.touch();
        if let Some(connection) = &ctx.connection {
            session.set_connection(Some(Arc::clone(connection)));
        }
        Some(session)
    }

    /// Stop background work owned by the store.
    pub fn shutdown(&self) {
        self.store.shutdown();
    }
}

/// Serialize an error response for `id`.
pub fn error_value(id: RequestId, error: RpcError) -> Value {
    serde_json::to_value(error.to_json_rpc_error(id)).unwrap_or(Value::Null)
}
