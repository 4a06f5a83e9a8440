//! Method `push/subscribe`: Declare interest in one or more topics.

use std::sync::Arc;

use rpc_session::{Session, TopicSelection};
use serde_json::Value;

use super::{require_session, Access, MethodDefinition, ParamShape};
use crate::types::{RpcError, RpcResult};

/// Name under the method prefix.
pub const NAME: &str = "push/subscribe";

/// Return the method definition for push/subscribe.
pub fn definition(prefix: &str) -> MethodDefinition {
    MethodDefinition::new(
        prefix,
        NAME,
        "Subscribe to a topic or list of topics; false for topics already subscribed",
        ParamShape::Topics,
        Access::Session,
    )
}

/// Execute the push/subscribe method.
pub fn execute(session: Option<&Arc<Session>>, topics: &TopicSelection) -> RpcResult<Value> {
    let session = require_session(session)?;
    let outcome = session.subscribe_all(topics);
    tracing::debug!(session_id = %session.id(), ?topics, "Subscribed");
    serde_json::to_value(outcome).map_err(|e| RpcError::InternalError(e.to_string()))
}
