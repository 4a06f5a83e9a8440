//! Method `destroy`: End the caller's own session.

use std::sync::Arc;

use rpc_session::{Session, SessionStore};
use serde_json::Value;

use super::{require_session, Access, MethodDefinition, ParamShape};
use crate::types::RpcResult;

/// Name under the method prefix.
pub const NAME: &str = "destroy";

/// Return the method definition for destroy.
pub fn definition(prefix: &str) -> MethodDefinition {
    MethodDefinition::new(
        prefix,
        NAME,
        "Destroy the current session",
        ParamShape::None,
        Access::Session,
    )
}

/// Execute the destroy method.
///
/// Reports `NotFound` if the session was removed concurrently, e.g. by the
/// expiry sweep.
pub fn execute(session: Option<&Arc<Session>>, store: &SessionStore) -> RpcResult<Value> {
    let session = require_session(session)?;
    store.destroy(session)?;
    Ok(Value::Bool(true))
}
