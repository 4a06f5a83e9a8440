//! Method `management/list`: Summaries of every live session.

use rpc_session::SessionStore;
use serde_json::Value;

use super::{Access, MethodDefinition, ParamShape};
use crate::types::{RpcError, RpcResult};

/// Name under the method prefix.
pub const NAME: &str = "management/list";

/// Return the method definition for management/list.
pub fn definition(prefix: &str) -> MethodDefinition {
    MethodDefinition::new(
        prefix,
        NAME,
        "List all live sessions (administrative)",
        ParamShape::None,
        Access::Admin,
    )
}

/// Execute the management/list method.
pub fn execute(store: &SessionStore) -> RpcResult<Value> {
    serde_json::to_value(store.list()).map_err(|e| RpcError::InternalError(e.to_string()))
}
