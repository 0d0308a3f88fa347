//! # Request Loop
//!
//! Reads newline-delimited JSON requests and writes one response line per
//! request, in input order.

use crate::handler::RequestHandler;
use anyhow::{Context, Result};
use chat_ledger::ports::inbound::{LedgerCommands, LedgerQueries};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Serves requests from `input` until EOF. Returns the number handled.
///
/// Blank lines are skipped. A line that fails to parse still gets an error
/// response, so clients can match every request line to one output line.
pub async fn serve<L, R, W>(handler: &RequestHandler<L>, input: R, mut output: W) -> Result<u64>
where
    L: LedgerCommands + LedgerQueries,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0u64;

    while let Some(line) = lines.next_line().await.context("reading request")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handler.handle_line(line);
        let mut encoded = serde_json::to_vec(&response).context("encoding response")?;
        encoded.push(b'\n');
        output.write_all(&encoded).await.context("writing response")?;
        output.flush().await.context("flushing response")?;

        handled += 1;
        debug!(correlation_id = %response.correlation_id, "Response written");
    }

    info!(handled, "Input closed");
    Ok(handled)
}
