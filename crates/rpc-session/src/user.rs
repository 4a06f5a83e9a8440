//! User collaborator boundary.
//!
//! The session engine treats users as opaque. It only ever asks for a
//! serialized summary and the list of permission strings.

use serde_json::{json, Value};

/// An authenticated principal attached to a session.
pub trait User: Send + Sync {
    /// Opaque summary used in `state` responses and admin listings.
    fn serialize(&self) -> Value;

    /// Permission strings granted to this user.
    fn permissions(&self) -> Vec<String>;
}

/// A fixed user with a name and a static permission list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticUser {
    name: String,
    permissions: Vec<String>,
}

impl StaticUser {
    /// Create a user with the given name and permissions.
    pub fn new(name: impl Into<String>, permissions: Vec<String>) -> Self {
        Self {
            name: name.into(),
            permissions,
        }
    }

    /// The user's name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl User for StaticUser {
    fn serialize(&self) -> Value {
        json!({
            "name": self.name,
            "permissions": self.permissions,
        })
    }

    fn permissions(&self) -> Vec<String> {
        self.permissions.clone()
    }
}
