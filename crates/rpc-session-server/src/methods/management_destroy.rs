//! Method `management/destroy`: Remove any session by id.

use rpc_session::{SessionError, SessionId, SessionStore};
use serde_json::Value;

use super::{Access, MethodDefinition, ParamShape};
use crate::types::RpcResult;

/// Name under the method prefix.
pub const NAME: &str = "management/destroy";

/// Return the method definition for management/destroy.
pub fn definition(prefix: &str) -> MethodDefinition {
    MethodDefinition::new(
        prefix,
        NAME,
        "Destroy a session by id (administrative)",
        ParamShape::SessionId,
        Access::Admin,
    )
}

/// Execute the management/destroy method.
pub fn execute(store: &SessionStore, target: &str) -> RpcResult<Value> {
    let id: SessionId = target
        .parse()
        .map_err(|_| SessionError::NotFound(target.to_string()))?;
    store.destroy_by_id(&id)?;
    tracing::info!(session_id = %target, "Session destroyed by administrator");
    Ok(Value::Bool(true))
}
