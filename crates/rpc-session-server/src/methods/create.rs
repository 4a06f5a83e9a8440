//! Method `create`: Issue a new session. Callable without a session.

use rpc_session::SessionStore;
use serde_json::{json, Value};

use super::{Access, MethodDefinition, ParamShape};
use crate::types::RpcResult;

/// Name under the method prefix.
pub const NAME: &str = "create";

/// Return the method definition for create.
pub fn definition(prefix: &str) -> MethodDefinition {
    MethodDefinition::new(
        prefix,
        NAME,
        "Create a new session and return its id",
        ParamShape::None,
        Access::Public,
    )
}

/// Execute the create method.
pub fn execute(store: &SessionStore) -> RpcResult<Value> {
    let id = store.create();
    Ok(json!(id.to_string()))
}
