//! Test data fixtures for session server tests.

#![allow(dead_code)]

use std::sync::Arc;

use rpc_session::{SessionConfig, SessionStore, StaticUser};
use rpc_session_server::types::{
    JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, RequestId, JSONRPC_VERSION,
};
use rpc_session_server::{CallContext, ProtocolHandler, ServerConfig};
use serde_json::Value;

/// Create a handler over a fresh store with no background sweeper.
pub fn create_test_handler(timeout: Option<u64>) -> ProtocolHandler {
    let config = ServerConfig {
        session: SessionConfig {
            timeout,
            ..SessionConfig::default()
        },
        ..ServerConfig::default()
    };
    let store = Arc::new(SessionStore::new(config.session.clone()));
    ProtocolHandler::new(store, &config)
}

/// Send one request and return the raw response object.
pub fn call(
    handler: &ProtocolHandler,
    method: &str,
    params: Option<Value>,
    session: Option<&str>,
) -> Value {
    call_with(handler, method, params, session, &CallContext::default())
}

/// Send one request with an explicit transport context.
pub fn call_with(
    handler: &ProtocolHandler,
    method: &str,
    params: Option<Value>,
    session: Option<&str>,
    ctx: &CallContext,
) -> Value {
    let mut request = JsonRpcRequest::new(RequestId::Number(1), method, params);
    if let Some(token) = session {
        request = request.with_session(token);
    }
    handler
        .handle_message(JsonRpcMessage::Request(request), ctx)
        .expect("requests always produce a response")
}

/// Send one notification and return whatever the handler produced.
pub fn notify(
    handler: &ProtocolHandler,
    method: &str,
    params: Option<Value>,
    session: Option<&str>,
) -> Option<Value> {
    let notification = JsonRpcNotification {
        jsonrpc: JSONRPC_VERSION.to_string(),
        method: method.to_string(),
        params,
        session: session.map(str::to_string),
    };
    handler.handle_message(
        JsonRpcMessage::Notification(notification),
        &CallContext::default(),
    )
}

/// Create a session through the RPC surface and return its id.
pub fn create_session(handler: &ProtocolHandler) -> String {
    let response = call(handler, "session/create", None, None);
    response["result"]
        .as_str()
        .expect("create returns a session id")
        .to_string()
}

/// Attach a user holding the admin permission to session `id`.
pub fn make_admin(handler: &ProtocolHandler, id: &str) {
    let session = handler.store().get_by_str(id).unwrap();
    session.set_user(Some(Arc::new(StaticUser::new(
        "root",
        vec!["session.admin".to_string()],
    ))));
}

/// Error code of a response, if it is an error.
pub fn error_code(response: &Value) -> Option<i64> {
    response["error"]["code"].as_i64()
}
