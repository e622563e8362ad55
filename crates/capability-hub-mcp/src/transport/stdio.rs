//! Stdio transport: newline-delimited JSON-RPC over stdin/stdout.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::protocol::ProtocolHandler;
use crate::types::McpResult;

/// Serves one client over a pair of byte streams, one message per line.
pub struct StdioTransport {
    handler: ProtocolHandler,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self { handler }
    }

    /// Serve stdin/stdout until stdin closes.
    pub async fn run(&self) -> McpResult<()> {
        tracing::info!("Stdio transport ready");
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.serve(reader, writer).await
    }

    /// Read requests from `reader` and write replies to `writer`.
    ///
    /// Requests are handled strictly one at a time, in arrival order. Blank
    /// lines are skipped; notifications produce no output.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> McpResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(reply) = self.handler.handle_raw(line).await {
                let mut out = serde_json::to_string(&reply)?;
                out.push('\n');
                writer.write_all(out.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        tracing::info!("Stdin closed, stdio transport stopping");
        Ok(())
    }
}
