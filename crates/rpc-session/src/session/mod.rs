//! Session lifecycle: identity, the live store, and idle expiry.

pub mod store;
pub mod sweeper;
pub mod types;

pub use store::SessionStore;
pub use sweeper::spawn_sweeper;
pub use types::{Session, SessionId, SessionSummary};
