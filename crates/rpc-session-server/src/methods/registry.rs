//! Method registration and dispatch for the session surface.

use std::collections::HashMap;
use std::sync::Arc;

use rpc_session::{Session, SessionError, SessionStore};
use serde_json::Value;

use super::{
    create, destroy, management_destroy, management_list, permissions, state, subscribe,
    unsubscribe, Access, MethodDefinition, MethodParams,
};
use crate::types::{RpcError, RpcResult};

/// Registry of every `session/*` method under a configurable prefix.
pub struct MethodRegistry {
    prefix: String,
    admin_permission: String,
    definitions: Vec<MethodDefinition>,
    by_name: HashMap<String, usize>,
}

impl MethodRegistry {
    /// Build a registry with all session methods registered under `prefix`.
    pub fn new(prefix: &str, admin_permission: &str) -> Self {
        let mut registry = Self {
            prefix: prefix.trim_end_matches('/').to_string(),
            admin_permission: admin_permission.to_string(),
            definitions: Vec::new(),
            by_name: HashMap::new(),
        };

        let prefix = registry.prefix.clone();
        for definition in [
            create::definition(&prefix),
            destroy::definition(&prefix),
            state::definition(&prefix),
            permissions::definition(&prefix),
            subscribe::definition(&prefix),
            unsubscribe::definition(&prefix),
            management_list::definition(&prefix),
            management_destroy::definition(&prefix),
        ] {
            registry.register(definition);
        }
        registry
    }

    fn register(&mut self, definition: MethodDefinition) {
        self.by_name
            .insert(definition.name.clone(), self.definitions.len());
        self.definitions.push(definition);
    }

    /// The method prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// All registered methods, in registration order.
    pub fn definitions(&self) -> &[MethodDefinition] {
        &self.definitions
    }

    /// Look up a method by its fully qualified name.
    pub fn lookup(&self, name: &str) -> Option<&MethodDefinition> {
        self.by_name.get(name).map(|&i| &self.definitions[i])
    }

    /// Whether `name` may be called without a session.
    pub fn always_allow(&self, name: &str) -> bool {
        self.lookup(name)
            .is_some_and(|definition| definition.access == Access::Public)
    }

    /// Validate and invoke a method.
    pub fn call(
        &self,
        name: &str,
        session: Option<&Arc<Session>>,
        params: Option<Value>,
        store: &SessionStore,
    ) -> RpcResult<Value> {
        let definition = self
            .lookup(name)
            .ok_or_else(|| RpcError::MethodNotFound(name.to_string()))?;

        if definition.access == Access::Admin {
            self.check_admin(name, session)?;
        }

        let params = definition.params.parse(params)?;

        tracing::debug!(method = %name, authenticated = session.is_some(), "Dispatching");

        match (definition.local_name, params) {
            (create::NAME, _) => create::execute(store),
            (destroy::NAME, _) => destroy::execute(session, store),
            (state::NAME, _) => state::execute(session),
            (permissions::NAME, _) => permissions::execute(session),
            (subscribe::NAME, MethodParams::Topics(topics)) => {
                subscribe::execute(session, &topics)
            }
            (unsubscribe::NAME, MethodParams::Topics(topics)) => {
                unsubscribe::execute(session, &topics)
            }
            (management_list::NAME, _) => management_list::execute(store),
            (management_destroy::NAME, MethodParams::SessionId(target)) => {
                management_destroy::execute(store, &target)
            }
            (local, _) => Err(RpcError::InternalError(format!(
                "No handler for registered method {local}"
            ))),
        }
    }

    fn check_admin(&self, name: &str, session: Option<&Arc<Session>>) -> RpcResult<()> {
        let session = session.ok_or(RpcError::Session(SessionError::Unauthenticated))?;
        if session
            .permissions()
            .iter()
            .any(|p| p == &self.admin_permission)
        {
            Ok(())
        } else {
            Err(RpcError::Forbidden(format!(
                "{name} requires the '{}' permission",
                self.admin_permission
            )))
        }
    }
}
