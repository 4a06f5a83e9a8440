//! Method `state`: The caller's user and permissions.

use std::sync::Arc;

use rpc_session::Session;
use serde_json::{json, Value};

use super::{require_session, Access, MethodDefinition, ParamShape};
use crate::types::RpcResult;

/// Name under the method prefix.
pub const NAME: &str = "state";

/// Return the method definition for state.
pub fn definition(prefix: &str) -> MethodDefinition {
    MethodDefinition::new(
        prefix,
        NAME,
        "Return the session's user (or null) and its permissions",
        ParamShape::None,
        Access::Session,
    )
}

/// Execute the state method.
pub fn execute(session: Option<&Arc<Session>>) -> RpcResult<Value> {
    let session = require_session(session)?;
    let user = session.user();

    Ok(json!({
        "user": user.as_ref().map(|u| u.serialize()),
        "permissions": user.map(|u| u.permissions()).unwrap_or_default(),
    }))
}
