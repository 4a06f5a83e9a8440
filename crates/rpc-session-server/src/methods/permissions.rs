//! Method `permissions`: Permission strings of the caller's user.

use std::sync::Arc;

use rpc_session::Session;
use serde_json::{json, Value};

use super::{require_session, Access, MethodDefinition, ParamShape};
use crate::types::RpcResult;

/// Name under the method prefix.
pub const NAME: &str = "permissions";

/// Return the method definition for permissions.
pub fn definition(prefix: &str) -> MethodDefinition {
    MethodDefinition::new(
        prefix,
        NAME,
        "List the permissions granted to the session's user",
        ParamShape::None,
        Access::Session,
    )
}

/// Execute the permissions method.
pub fn execute(session: Option<&Arc<Session>>) -> RpcResult<Value> {
    let session = require_session(session)?;
    Ok(json!(session.permissions()))
}
