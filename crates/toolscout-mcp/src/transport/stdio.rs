//! Line-delimited JSON-RPC over stdin/stdout.
//!
//! Each request is one line of JSON; each reply is written as one line and
//! flushed. Logging must go to stderr while this transport is active.

use crate::error::Result;
use crate::protocol::JsonRpcResponse;
use crate::server::McpServer;
use tokio::io::{
    stdin, stdout, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin,
    Stdout,
};
use tracing::{debug, info};

pub struct StdioTransport<R, W> {
    reader: R,
    writer: W,
}

impl StdioTransport<BufReader<Stdin>, Stdout> {
    /// Transport over the process's standard streams.
    pub fn new() -> Self {
        Self::with_streams(BufReader::new(stdin()), stdout())
    }
}

impl Default for StdioTransport<BufReader<Stdin>, Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn with_streams(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Next non-blank line, or `None` at end of input.
    pub async fn recv(&mut self) -> Result<Option<String>> {
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line).await? == 0 {
                return Ok(None);
            }
            let line = line.trim();
            if !line.is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
    }

    pub async fn send(&mut self, response: &JsonRpcResponse) -> Result<()> {
        let json = serde_json::to_string(response)?;
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Answer requests until the input is exhausted.
    pub async fn serve(mut self, server: &McpServer) -> Result<()> {
        info!("Serving MCP over stdio");
        while let Some(line) = self.recv().await? {
            if let Some(response) = server.handle_message(&line).await {
                self.send(&response).await?;
            }
        }
        debug!("stdin closed, stopping");
        Ok(())
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}
