//! Session identity and per-session state.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::connection::Connection;
use crate::push::{PushMessage, SubscriptionOutcome, TopicSelection};
use crate::user::User;

/// Current unix time in seconds.
pub(crate) fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// Unique session identifier (random v4 UUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Read-only summary of a session for administrative listing.
///
/// Never carries the connection handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Session ID.
    pub id: SessionId,
    /// Serialized user, if one is attached.
    pub user: Option<Value>,
    /// Creation time (unix seconds).
    pub created_at: i64,
    /// Last use time (unix seconds).
    pub last_used_at: i64,
    /// Subscribed topics, sorted.
    pub subscriptions: Vec<String>,
}

struct SessionState {
    last_used_at: i64,
    user: Option<Arc<dyn User>>,
    connection: Option<Arc<dyn Connection>>,
    subscriptions: HashSet<String>,
}

/// One client interaction context.
///
/// Sessions are shared (`Arc<Session>`) between the store and whoever is
/// handling a request, so mutable state sits behind a short-lived lock that
/// is never held across I/O.
pub struct Session {
    id: SessionId,
    created_at: i64,
    state: RwLock<SessionState>,
}

impl Session {
    /// Create a session stamped with the current time.
    pub fn new() -> Self {
        Self::new_at(unix_now())
    }

    /// Create a session with an explicit creation time.
    pub fn new_at(now: i64) -> Self {
        Self {
            id: SessionId::new(),
            created_at: now,
            state: RwLock::new(SessionState {
                last_used_at: now,
                user: None,
                connection: None,
                subscriptions: HashSet::new(),
            }),
        }
    }

    /// Session ID.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Creation time (unix seconds).
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Last use time (unix seconds).
    pub fn last_used_at(&self) -> i64 {
        self.state.read().last_used_at
    }

    /// Mark the session as used now.
    pub fn touch(&self) {
        self.touch_at(unix_now());
    }

    /// Mark the session as used at `now`. Never moves `last_used_at` backwards.
    pub fn touch_at(&self, now: i64) {
        let mut state = self.state.write();
        state.last_used_at = state.last_used_at.max(now);
    }

    /// Seconds since last use, as seen at `now`.
    pub fn idle_secs(&self, now: i64) -> i64 {
        now - self.last_used_at()
    }

    /// Attach or clear the user.
    pub fn set_user(&self, user: Option<Arc<dyn User>>) {
        self.state.write().user = user;
    }

    /// The attached user, if any.
    pub fn user(&self) -> Option<Arc<dyn User>> {
        self.state.read().user.clone()
    }

    /// Attach or clear the connection.
    pub fn set_connection(&self, connection: Option<Arc<dyn Connection>>) {
        self.state.write().connection = connection;
    }

    /// Drop the connection reference (transport closed).
    pub fn clear_connection(&self) {
        self.set_connection(None);
    }

    /// The attached connection, if any.
    pub fn connection(&self) -> Option<Arc<dyn Connection>> {
        self.state.read().connection.clone()
    }

    /// Permissions of the attached user; empty without one.
    pub fn permissions(&self) -> Vec<String> {
        self.user().map(|u| u.permissions()).unwrap_or_default()
    }

    /// Subscribe to `topic`. Returns `false` if already subscribed.
    pub fn subscribe(&self, topic: &str) -> bool {
        self.state.write().subscriptions.insert(topic.to_string())
    }

    /// Unsubscribe from `topic`. Always succeeds.
    pub fn unsubscribe(&self, topic: &str) -> bool {
        self.state.write().subscriptions.remove(topic);
        true
    }

    /// Subscribe to one or many topics; batch results keep input order.
    pub fn subscribe_all(&self, topics: &TopicSelection) -> SubscriptionOutcome {
        topics.apply(|topic| self.subscribe(topic))
    }

    /// Unsubscribe from one or many topics; batch results keep input order.
    pub fn unsubscribe_all(&self, topics: &TopicSelection) -> SubscriptionOutcome {
        topics.apply(|topic| self.unsubscribe(topic))
    }

    /// Whether the session is subscribed to `topic`.
    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.state.read().subscriptions.contains(topic)
    }

    /// Subscribed topics, sorted.
    pub fn subscriptions(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.state.read().subscriptions.iter().cloned().collect();
        topics.sort();
        topics
    }

    /// Deliver a push regardless of subscriptions.
    ///
    /// Returns whether a connection was attached to receive it.
    pub fn push(&self, topic: &str, message: Value) -> bool {
        let Some(connection) = self.connection() else {
            return false;
        };

        let text = match PushMessage::new(topic, message).to_text() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(session_id = %self.id, topic, error = %e, "Failed to serialize push");
                return false;
            }
        };

        if !connection.send(text) {
            tracing::debug!(session_id = %self.id, topic, "Push hit a closed connection");
        }
        true
    }

    /// Deliver a push only if subscribed to `topic`.
    pub fn push_if_subscribed(&self, topic: &str, message: Value) -> bool {
        if !self.is_subscribed(topic) {
            return false;
        }
        self.push(topic, message)
    }

    /// Administrative summary (no connection handle).
    pub fn serialize(&self) -> SessionSummary {
        let (user, last_used_at) = {
            let state = self.state.read();
            (state.user.clone(), state.last_used_at)
        };
        SessionSummary {
            id: self.id,
            user: user.map(|u| u.serialize()),
            created_at: self.created_at,
            last_used_at,
            subscriptions: self.subscriptions(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("last_used_at", &state.last_used_at)
            .field("has_user", &state.user.is_some())
            .field("has_connection", &state.connection.is_some())
            .field("subscriptions", &state.subscriptions.len())
            .finish()
    }
}
