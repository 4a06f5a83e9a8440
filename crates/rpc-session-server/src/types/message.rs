//! Wire messages: JSON-RPC 2.0 framing plus the top-level session token.
//!
//! A request or notification may carry `"session": "<id>"` next to
//! `method`/`params`. Responses never do.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{RpcError, RpcResult};

/// JSON-RPC 2.0 protocol version.
pub const JSONRPC_VERSION: &str = "2.0";

fn version() -> String {
    JSONRPC_VERSION.to_string()
}

/// Request id as sent by the client. `Null` is used when none could be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// String identifier.
    String(String),
    /// Numeric identifier that fits an `i64`.
    Number(i64),
    /// Any other JSON number (fractional, or beyond `i64`), echoed verbatim.
    OtherNumber(serde_json::Number),
    /// Null identifier.
    Null,
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

/// A call that expects a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be "2.0".
    pub jsonrpc: String,
    /// Echoed back in the response.
    pub id: RequestId,
    /// Fully qualified method name, e.g. `session/create`.
    pub method: String,
    /// Method params, validated later against the method's shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Token of the session the caller claims.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

impl JsonRpcRequest {
    /// Build a request without a session token.
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: version(),
            id,
            method: method.into(),
            params,
            session: None,
        }
    }

    /// Present `session` as the caller's token.
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }
}

/// A fire-and-forget call: same shape as a request, minus the id.
///
/// Unknown fields are rejected so a request with an unreadable id can never
/// be mistaken for a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonRpcNotification {
    /// Must be "2.0".
    pub jsonrpc: String,
    /// Fully qualified method name.
    pub method: String,
    /// Method params.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Token of the session the caller claims.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

/// Successful result for a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always "2.0".
    pub jsonrpc: String,
    /// Id of the request being answered.
    pub id: RequestId,
    /// Method result.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Success response for `id`.
    pub fn new(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: version(),
            id,
            result,
        }
    }
}

/// Failed result for a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Always "2.0".
    pub jsonrpc: String,
    /// Id of the request being answered, or null.
    pub id: RequestId,
    /// What went wrong.
    pub error: ErrorObject,
}

impl JsonRpcError {
    /// Error response for `id` with no `data`.
    pub fn new(id: RequestId, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: version(),
            id,
            error: ErrorObject {
                code,
                message: message.into(),
                data: None,
            },
        }
    }
}

/// The `error` member of an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Numeric error code.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
    /// Optional structured detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Anything that can arrive on the wire. Variant order matters: serde tries
/// them top to bottom, and a request must win over a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    /// Has `id` and `method`.
    Request(JsonRpcRequest),
    /// Has `id` and `result`.
    Response(JsonRpcResponse),
    /// Has `id` and `error`.
    Error(JsonRpcError),
    /// Has `method` and no `id`.
    Notification(JsonRpcNotification),
}

impl JsonRpcMessage {
    /// Parse one wire message from text.
    ///
    /// Text that is not JSON is a `ParseError`. JSON that is not a JSON-RPC
    /// message, including a request whose `id` is not a string, number or
    /// null, is an `InvalidRequest`.
    pub fn parse(text: &str) -> RpcResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| RpcError::ParseError(e.to_string()))?;
        Self::from_value(value)
    }

    /// Classify an already-decoded JSON value.
    pub fn from_value(value: Value) -> RpcResult<Self> {
        if let Some(id) = value.get("id") {
            if !matches!(id, Value::String(_) | Value::Number(_) | Value::Null) {
                return Err(RpcError::InvalidRequest(
                    "id must be a string, number or null".to_string(),
                ));
            }
        }
        serde_json::from_value(value).map_err(|e| RpcError::InvalidRequest(e.to_string()))
    }

    /// Method name, for calls.
    pub fn method(&self) -> Option<&str> {
        match self {
            JsonRpcMessage::Request(r) => Some(&r.method),
            JsonRpcMessage::Notification(n) => Some(&n.method),
            _ => None,
        }
    }

    /// Session token presented with a call, if any.
    pub fn session_token(&self) -> Option<&str> {
        match self {
            JsonRpcMessage::Request(r) => r.session.as_deref(),
            JsonRpcMessage::Notification(n) => n.session.as_deref(),
            _ => None,
        }
    }
}
