//! Transports: stdio (default) and SSE over HTTP (feature `sse`).

#[cfg(feature = "sse")]
pub mod sse;
pub mod stdio;

#[cfg(feature = "sse")]
pub use sse::SseTransport;
pub use stdio::StdioTransport;
