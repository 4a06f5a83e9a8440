//! Session lifecycle engine for RPC clients.
//!
//! This library issues session identifiers, tracks per-session user
//! association and idle time, expires stale sessions in the background, and
//! delivers topic-tagged push messages to subscribed sessions.

pub mod config;
pub mod connection;
pub mod error;
pub mod push;
pub mod session;
pub mod user;

pub use config::SessionConfig;
pub use connection::{ChannelConnection, Connection};
pub use error::{SessionError, SessionResult};
pub use push::{PushMessage, SubscriptionOutcome, TopicSelection};
pub use session::{Session, SessionId, SessionStore, SessionSummary};
pub use user::{StaticUser, User};
