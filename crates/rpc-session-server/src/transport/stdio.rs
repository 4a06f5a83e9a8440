//! Stdio transport: newline-delimited JSON-RPC over stdin/stdout.
//!
//! The peer on the other end of stdio is a single connection: responses and
//! push envelopes share one writer task so lines never interleave.

use std::sync::Arc;

use rpc_session::{ChannelConnection, Connection};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};

use crate::protocol::{error_value, CallContext, ProtocolHandler};
use crate::types::{JsonRpcMessage, RequestId, RpcError, RpcResult};

/// Stdio transport for a single locally attached client.
pub struct StdioTransport {
    handler: Arc<ProtocolHandler>,
}

impl StdioTransport {
    /// Create a new stdio transport.
    pub fn new(handler: ProtocolHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// The protocol handler.
    pub fn handler(&self) -> &Arc<ProtocolHandler> {
        &self.handler
    }

    /// Serve stdin/stdout until stdin closes.
    pub async fn run(&self) -> RpcResult<()> {
        tracing::info!("Stdio transport ready");
        self.run_with(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve an arbitrary reader/writer pair until the reader hits EOF.
    pub async fn run_with<R, W>(&self, reader: R, writer: W) -> RpcResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (connection, rx) = ChannelConnection::new();
        let (stop_tx, stop_rx) = oneshot::channel();
        let writer_task = tokio::spawn(write_lines(writer, rx, stop_rx));

        let ctx = CallContext::with_connection(Arc::new(connection.clone()));
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = match JsonRpcMessage::parse(line) {
                Ok(msg) => self.handler.handle_message(msg, &ctx),
                Err(e) => {
                    tracing::debug!(error = %e, "Rejected input line");
                    Some(error_value(RequestId::Null, e))
                }
            };

            if let Some(response) = response {
                let text = serde_json::to_string(&response)
                    .map_err(|e| RpcError::InternalError(e.to_string()))?;
                if !connection.send(text) {
                    return Err(RpcError::Transport("stdout writer has stopped".to_string()));
                }
            }
        }

        tracing::info!("Stdin closed, stopping stdio transport");
        let _ = stop_tx.send(());
        writer_task
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))??;
        Ok(())
    }
}

/// Drain `rx` into `writer` one line per message. On `stop`, flush whatever
/// is already queued and exit; sessions may still hold the sender.
async fn write_lines<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<String>,
    mut stop: oneshot::Receiver<()>,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        tokio::select! {
            line = rx.recv() => match line {
                Some(line) => write_line(&mut writer, &line).await?,
                None => break,
            },
            _ = &mut stop => {
                while let Ok(line) = rx.try_recv() {
                    write_line(&mut writer, &line).await?;
                }
                break;
            }
        }
    }
    writer.flush().await
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
