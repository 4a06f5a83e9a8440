//! The `session/*` RPC surface: method definitions and handlers.

pub mod create;
pub mod destroy;
pub mod management_destroy;
pub mod management_list;
pub mod permissions;
pub mod registry;
pub mod state;
pub mod subscribe;
pub mod unsubscribe;

use std::sync::Arc;

use rpc_session::{Session, SessionError, TopicSelection};
use serde::Serialize;
use serde_json::{json, Value};

use crate::types::{RpcError, RpcResult};

pub use registry::MethodRegistry;

/// Who may call a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// Callable without a session (`alwaysAllow`).
    Public,
    /// Requires a resolved session.
    Session,
    /// Requires a session whose user holds the admin permission.
    Admin,
}

/// Declared shape of a method's params.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamShape {
    /// No params.
    None,
    /// A topic string or list of topic strings.
    Topics,
    /// A target session id.
    SessionId,
}

/// Params after validation against a `ParamShape`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodParams {
    /// The method takes no params.
    None,
    /// One or more topics.
    Topics(TopicSelection),
    /// A target session id, unparsed.
    SessionId(String),
}

impl ParamShape {
    /// Validate raw params against this shape.
    pub fn parse(&self, params: Option<Value>) -> RpcResult<MethodParams> {
        match self {
            ParamShape::None => match params {
                None | Some(Value::Null) => Ok(MethodParams::None),
                Some(Value::Object(map)) if map.is_empty() => Ok(MethodParams::None),
                Some(Value::Array(items)) if items.is_empty() => Ok(MethodParams::None),
                Some(other) => Err(RpcError::InvalidParams(format!(
                    "method takes no params, got {other}"
                ))),
            },
            ParamShape::Topics => {
                let value = match params {
                    Some(Value::Object(mut map)) => map
                        .remove("topics")
                        .or_else(|| map.remove("topic"))
                        .ok_or_else(|| {
                            RpcError::InvalidParams("missing 'topics' field".to_string())
                        })?,
                    Some(value) => value,
                    None => {
                        return Err(RpcError::InvalidParams(
                            "expected a topic or a list of topics".to_string(),
                        ))
                    }
                };
                serde_json::from_value(value)
                    .map(MethodParams::Topics)
                    .map_err(|_| {
                        RpcError::InvalidParams(
                            "expected a topic string or a list of topic strings".to_string(),
                        )
                    })
            }
            ParamShape::SessionId => {
                let id = match &params {
                    Some(Value::String(id)) => Some(id.clone()),
                    Some(Value::Object(map)) => {
                        map.get("id").and_then(Value::as_str).map(str::to_string)
                    }
                    Some(Value::Array(items)) if items.len() == 1 => {
                        items[0].as_str().map(str::to_string)
                    }
                    _ => None,
                };
                id.map(MethodParams::SessionId).ok_or_else(|| {
                    RpcError::InvalidParams("expected a session id string".to_string())
                })
            }
        }
    }

    /// JSON schema describing this shape, for method listings.
    pub fn schema(&self) -> Value {
        match self {
            ParamShape::None => json!({ "type": "null" }),
            ParamShape::Topics => json!({
                "oneOf": [
                    { "type": "string" },
                    { "type": "array", "items": { "type": "string" } }
                ]
            }),
            ParamShape::SessionId => json!({
                "oneOf": [
                    { "type": "string" },
                    {
                        "type": "object",
                        "properties": { "id": { "type": "string" } },
                        "required": ["id"]
                    }
                ]
            }),
        }
    }
}

/// A registered method.
#[derive(Debug, Clone, Serialize)]
pub struct MethodDefinition {
    /// Fully qualified name, e.g. `session/push/subscribe`.
    pub name: String,
    /// Name under the prefix, e.g. `push/subscribe`.
    #[serde(skip)]
    pub local_name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Declared params shape.
    pub params: ParamShape,
    /// Access requirement.
    pub access: Access,
}

impl MethodDefinition {
    pub(crate) fn new(
        prefix: &str,
        local_name: &'static str,
        description: &'static str,
        params: ParamShape,
        access: Access,
    ) -> Self {
        Self {
            name: format!("{prefix}/{local_name}"),
            local_name,
            description,
            params,
            access,
        }
    }
}

/// The resolved session, or `Unauthenticated`.
pub(crate) fn require_session(session: Option<&Arc<Session>>) -> RpcResult<&Arc<Session>> {
    session.ok_or(RpcError::Session(SessionError::Unauthenticated))
}
