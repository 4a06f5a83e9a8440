//! Transport collaborator boundary.

use tokio::sync::mpsc;

/// A live connection that can accept serialized push payloads.
///
/// Implementations must not block: pushes are issued while the caller may
/// be in the middle of handling another request.
pub trait Connection: Send + Sync {
    /// Hand `text` to the transport. Returns `false` if the transport has
    /// already gone away.
    fn send(&self, text: String) -> bool;
}

/// A `Connection` that forwards text into an unbounded channel drained by a
/// transport writer task.
#[derive(Debug, Clone)]
pub struct ChannelConnection {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelConnection {
    /// Create a connection and the receiver the transport drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Wrap an existing sender.
    pub fn from_sender(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }

    /// Whether the receiving side is still alive.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

impl Connection for ChannelConnection {
    fn send(&self, text: String) -> bool {
        match self.tx.send(text) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!("Dropping push for closed connection");
                false
            }
        }
    }
}
