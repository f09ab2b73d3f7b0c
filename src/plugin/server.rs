//! Plugin Stdio Server
//!
//! Implements the stdio transport for the host contract: reads
//! line-delimited JSON-RPC messages from stdin and writes responses to
//! stdout. All logging goes to stderr; stdout carries only the wire
//! protocol.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::errors::Result;

use super::handler::PluginHandler;
use super::protocol::{error_codes, PluginResponse};

pub struct PluginStdioServer {
    handler: PluginHandler,
}

impl PluginStdioServer {
    /// Create a server using the production backend.
    pub fn new() -> Self {
        Self { handler: PluginHandler::new() }
    }

    /// Create a server around a preconfigured handler.
    pub fn with_handler(handler: PluginHandler) -> Self {
        Self { handler }
    }

    /// Run the server over stdin/stdout.
    pub async fn run(&mut self) -> Result<()> {
        info!("Starting plugin stdio server");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
    }

    /// Serve the wire protocol over an arbitrary line-oriented transport.
    ///
    /// Reads line-delimited JSON-RPC messages from `reader`, processes
    /// them through the handler, and writes responses to `writer`. A line
    /// that fails to parse yields an in-band parse-error response and the
    /// loop keeps serving. Exits cleanly on EOF or after `close` is
    /// acknowledged.
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            debug!(line = %line, "Received input line");

            let request = match serde_json::from_str(&line) {
                Ok(request) => request,
                Err(e) => {
                    warn!(error = %e, line = %line, "Failed to parse request");

                    let error_response = PluginResponse::error(
                        None,
                        error_codes::PARSE_ERROR,
                        format!("Parse error: {}", e),
                    );
                    write_response(&mut writer, &error_response).await?;
                    continue;
                }
            };

            let response = self.handler.handle_request(request).await;
            write_response(&mut writer, &response).await?;

            if self.handler.is_closed() {
                info!("Plugin stdio server shutting down (close acknowledged)");
                return Ok(());
            }
        }

        info!("Plugin stdio server shutting down (EOF received)");
        Ok(())
    }
}

async fn write_response<W>(writer: &mut W, response: &PluginResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(response)?;
    debug!(response = %json, "Writing response");

    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;

    Ok(())
}

impl Default for PluginStdioServer {
    fn default() -> Self {
        Self::new()
    }
}
