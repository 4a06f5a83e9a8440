//! JSON-RPC wire types and server errors.

pub mod error;
pub mod message;

// Re-export commonly used types for convenience.
pub use error::*;
pub use message::*;
