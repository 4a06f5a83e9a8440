//! JSON-RPC protocol layer: session resolution and method dispatch.

pub mod handler;

pub use handler::{error_value, CallContext, ProtocolHandler};
