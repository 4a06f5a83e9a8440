//! Method `push/unsubscribe`: Withdraw interest in one or more topics.

use std::sync::Arc;

use rpc_session::{Session, TopicSelection};
use serde_json::Value;

use super::{require_session, Access, MethodDefinition, ParamShape};
use crate::types::{RpcError, RpcResult};

/// Name under the method prefix.
pub const NAME: &str = "push/unsubscribe";

/// Return the method definition for push/unsubscribe.
pub fn definition(prefix: &str) -> MethodDefinition {
    MethodDefinition::new(
        prefix,
        NAME,
        "Unsubscribe from a topic or list of topics; always true",
        ParamShape::Topics,
        Access::Session,
    )
}

/// Execute the push/unsubscribe method.
pub fn execute(session: Option<&Arc<Session>>, topics: &TopicSelection) -> RpcResult<Value> {
    let session = require_session(session)?;
    let outcome = session.unsubscribe_all(topics);
    serde_json::to_value(outcome).map_err(|e| RpcError::InternalError(e.to_string()))
}
