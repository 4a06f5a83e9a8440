//! JSON-RPC session service.
//!
//! This library binds the `rpc-session` lifecycle engine to a JSON-RPC 2.0
//! surface (`session/create`, `session/push/subscribe`, ...), with a
//! reference dispatcher and stdio/SSE transports.

pub mod config;
pub mod methods;
pub mod protocol;
pub mod transport;
pub mod types;

pub use config::ServerConfig;
pub use methods::MethodRegistry;
pub use protocol::{CallContext, ProtocolHandler};
pub use transport::StdioTransport;
