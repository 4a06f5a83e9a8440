//! In-memory session store.
//!
//! Provides the live session collection with:
//! - Atomic create/destroy with respect to lookups and listing
//! - Identity-based removal for "destroy my own session"
//! - Idle-timeout sweeping, optionally driven by a background task

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::sweeper::spawn_sweeper;
use super::types::{unix_now, Session, SessionId, SessionSummary};
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};

struct Entry {
    /// Insertion order, for stable listing.
    seq: u64,
    session: Arc<Session>,
}

/// The set of live sessions, keyed by id.
pub struct SessionStore {
    /// Live sessions. The only shared mutable structure; held only for
    /// structural changes and snapshots, never across I/O.
    sessions: RwLock<HashMap<SessionId, Entry>>,

    /// Next insertion sequence number.
    next_seq: AtomicU64,

    config: SessionConfig,

    /// Background sweeper, if one was started.
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl SessionStore {
    /// Create a store without a background sweeper.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            config,
            sweeper: Mutex::new(None),
        }
    }

    /// Create a store and, if an idle timeout is configured, start the
    /// recurring sweeper.
    ///
    /// # Panics
    ///
    /// Panics if a timeout is configured and this is called outside a tokio
    /// runtime, since the sweeper is spawned onto the current runtime. Use
    /// [`SessionStore::new`] and drive [`SessionStore::sweep`] yourself when
    /// no runtime is available.
    pub fn start(config: SessionConfig) -> Arc<Self> {
        let store = Arc::new(Self::new(config));

        if let Some(timeout) = store.config.idle_timeout() {
            let interval = store.config.sweep_interval();
            let handle = spawn_sweeper(Arc::downgrade(&store), interval);
            *store.sweeper.lock() = Some(handle);
            info!(
                timeout_secs = timeout,
                interval_secs = interval.as_secs(),
                "Session sweeper started"
            );
        } else {
            debug!("Session expiry disabled");
        }

        store
    }

    /// Stop the background sweeper, if running.
    pub fn shutdown(&self) {
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
            info!("Session sweeper stopped");
        }
    }

    /// Whether a background sweeper is running.
    pub fn has_sweeper(&self) -> bool {
        self.sweeper
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Create a new session and return its id.
    pub fn create(&self) -> SessionId {
        self.create_at(unix_now())
    }

    /// Create a new session stamped with `now`.
    pub fn create_at(&self, now: i64) -> SessionId {
        let session = Arc::new(Session::new_at(now));
        let id = session.id();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);

        self.sessions.write().insert(id, Entry { seq, session });

        info!(session_id = %id, "Session created");
        id
    }

    /// Look up a live session.
    pub fn get_by_id(&self, id: &SessionId) -> SessionResult<Arc<Session>> {
        self.sessions
            .read()
            .get(id)
            .map(|entry| Arc::clone(&entry.session))
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    /// Look up a live session from its textual id. Malformed ids are
    /// reported as not found.
    pub fn get_by_str(&self, id: &str) -> SessionResult<Arc<Session>> {
        let parsed: SessionId = id
            .parse()
            .map_err(|_| SessionError::NotFound(id.to_string()))?;
        self.get_by_id(&parsed)
    }

    /// Remove the session with the given id.
    pub fn destroy_by_id(&self, id: &SessionId) -> SessionResult<()> {
        let removed = self.sessions.write().remove(id);
        match removed {
            Some(entry) => {
                entry.session.clear_connection();
                info!(session_id = %id, "Session destroyed");
                Ok(())
            }
            None => Err(SessionError::NotFound(id.to_string())),
        }
    }

    /// Remove this exact session instance.
    ///
    /// Fails with `NotFound` if it is no longer in the store, e.g. because
    /// the sweeper got to it first.
    pub fn destroy(&self, session: &Arc<Session>) -> SessionResult<()> {
        let id = session.id();
        let removed = {
            let mut sessions = self.sessions.write();
            match sessions.get(&id) {
                Some(entry) if Arc::ptr_eq(&entry.session, session) => sessions.remove(&id),
                _ => None,
            }
        };

        match removed {
            Some(entry) => {
                entry.session.clear_connection();
                info!(session_id = %id, "Session destroyed by owner");
                Ok(())
            }
            None => Err(SessionError::NotFound(id.to_string())),
        }
    }

    /// Snapshot of every live session's summary, in creation order.
    pub fn list(&self) -> Vec<SessionSummary> {
        let mut sessions: Vec<(u64, Arc<Session>)> = self
            .sessions
            .read()
            .values()
            .map(|entry| (entry.seq, Arc::clone(&entry.session)))
            .collect();
        sessions.sort_by_key(|(seq, _)| *seq);
        sessions.iter().map(|(_, s)| s.serialize()).collect()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Push `message` under `topic` to every session subscribed to it.
    ///
    /// Returns how many sessions had a connection to push to. Delivery
    /// happens after the store lock is released.
    pub fn publish(&self, topic: &str, message: Value) -> usize {
        let targets: Vec<Arc<Session>> = self
            .sessions
            .read()
            .values()
            .filter(|entry| entry.session.is_subscribed(topic))
            .map(|entry| Arc::clone(&entry.session))
            .collect();

        let delivered = targets
            .iter()
            .filter(|session| session.push(topic, message.clone()))
            .count();
        debug!(topic, subscribers = targets.len(), delivered, "Published");
        delivered
    }

    /// Run one expiry pass against the wall clock.
    pub fn sweep(&self) -> usize {
        self.sweep_at(unix_now())
    }

    /// Run one expiry pass as seen at `now`.
    ///
    /// Keeps sessions idle for strictly less than the timeout. Returns the
    /// number evicted; always zero when expiry is disabled.
    pub fn sweep_at(&self, now: i64) -> usize {
        let Some(timeout) = self.config.idle_timeout() else {
            return 0;
        };
        let timeout = i64::try_from(timeout).unwrap_or(i64::MAX);

        let mut expired = Vec::new();
        {
            let mut sessions = self.sessions.write();
            sessions.retain(|_, entry| {
                let keep = entry.session.idle_secs(now) < timeout;
                if !keep {
                    expired.push(Arc::clone(&entry.session));
                }
                keep
            });
        }

        for session in &expired {
            session.clear_connection();
            debug!(session_id = %session.id(), "Session expired");
        }
        expired.len()
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn test_store(timeout: Option<u64>) -> SessionStore {
        SessionStore::new(SessionConfig {
            timeout,
            ..SessionConfig::default()
        })
    }

    #[test]
    fn test_create_and_get() {
        let store = test_store(None);
        let id = store.create();
        let session = store.get_by_id(&id).unwrap();
        assert_eq!(session.id(), id);
        assert_eq!(session.created_at(), session.last_used_at());
    }

    #[test]
    fn test_ids_are_unique() {
        let store = test_store(None);
        let ids: HashSet<SessionId> = (0..500).map(|_| store.create()).collect();
        assert_eq!(ids.len(), 500);
        assert_eq!(store.len(), 500);
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let store = test_store(None);
        let err = store.get_by_id(&SessionId::new()).unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
        assert!(matches!(
            store.get_by_str("garbage"),
            Err(SessionError::NotFound(_))
        ));
    }

    #[test]
    fn test_destroy_by_id() {
        let store = test_store(None);
        let id = store.create();
        store.destroy_by_id(&id).unwrap();
        assert!(store.get_by_id(&id).is_err());
        assert_eq!(
            store.destroy_by_id(&id),
            Err(SessionError::NotFound(id.to_string()))
        );
    }

    #[test]
    fn test_destroy_by_identity() {
        let store = test_store(None);
        let id = store.create();
        let session = store.get_by_id(&id).unwrap();

        store.destroy(&session).unwrap();
        assert!(store.is_empty());
        assert!(matches!(
            store.destroy(&session),
            Err(SessionError::NotFound(_))
        ));
    }

    #[test]
    fn test_destroy_rejects_foreign_instance() {
        let store = test_store(None);
        let _id = store.create();
        let stranger = Arc::new(Session::new());
        assert!(store.destroy(&stranger).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_list_is_snapshot_in_creation_order() {
        let store = test_store(None);
        let a = store.create();
        let b = store.create();
        let c = store.create();

        let listed: Vec<SessionId> = store.list().into_iter().map(|s| s.id).collect();
        assert_eq!(listed, vec![a, b, c]);

        let snapshot = store.list();
        store.destroy_by_id(&b).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_list_empty() {
        assert!(test_store(None).list().is_empty());
    }

    #[test]
    fn test_sweep_boundary() {
        let store = test_store(Some(60));
        let t0 = 10_000;
        let id = store.create_at(t0);

        assert_eq!(store.sweep_at(t0 + 59), 0);
        assert!(store.get_by_id(&id).is_ok());

        assert_eq!(store.sweep_at(t0 + 61), 1);
        assert!(store.get_by_id(&id).is_err());
    }

    #[test]
    fn test_sweep_respects_touch() {
        let store = test_store(Some(60));
        let t0 = 10_000;
        let idle = store.create_at(t0);
        let busy = store.create_at(t0);

        store.get_by_id(&busy).unwrap().touch_at(t0 + 50);

        assert_eq!(store.sweep_at(t0 + 70), 1);
        assert!(store.get_by_id(&idle).is_err());
        assert!(store.get_by_id(&busy).is_ok());
    }

    #[test]
    fn test_sweep_disabled_never_evicts() {
        let store = test_store(None);
        store.create_at(0);
        assert_eq!(store.sweep_at(i64::MAX / 2), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_destroy_after_sweep_is_not_found() {
        let store = test_store(Some(1));
        let id = store.create_at(0);
        let session = store.get_by_id(&id).unwrap();

        assert_eq!(store.sweep_at(100), 1);
        assert!(matches!(
            store.destroy(&session),
            Err(SessionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers_only() {
        use crate::connection::ChannelConnection;
        use serde_json::json;

        let store = test_store(None);
        let listener = store.get_by_id(&store.create()).unwrap();
        let bystander = store.get_by_id(&store.create()).unwrap();
        let detached = store.get_by_id(&store.create()).unwrap();

        let (conn_a, mut rx_a) = ChannelConnection::new();
        let (conn_b, mut rx_b) = ChannelConnection::new();
        listener.set_connection(Some(Arc::new(conn_a)));
        bystander.set_connection(Some(Arc::new(conn_b)));
        listener.subscribe("prices");
        detached.subscribe("prices");

        assert_eq!(store.publish("prices", json!(42)), 1);
        let text = rx_a.recv().await.unwrap();
        assert!(text.contains("\"subject\":\"prices\""));
        assert!(rx_b.try_recv().is_err());

        assert_eq!(store.publish("weather", json!(null)), 0);
    }
}
