//! Serve the Router over stdio: one JSON object per line in, one per
//! line out. Grounded on `mcp-core/src/transport/stdio.rs`'s line
//! framing, reused here for serving rather than dialing.

use crate::downstream::handle_message;
use crate::router::GatewaySession;
use crate::Gateway;
use mcp_core::messages::JsonRpcMessage;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Run the stdio downstream adapter until stdin closes. Every line is
/// UTF-8 JSON with no embedded newlines, matching the upstream framing
/// rule in reverse.
pub async fn serve(gateway: &Gateway) -> std::io::Result<()> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(stdin).lines();
    let session = GatewaySession::new();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let message: JsonRpcMessage = match serde_json::from_str(&line) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unparseable downstream line");
                continue;
            }
        };

        if let Some(response) = handle_message(gateway, &session, message).await {
            let mut encoded = serde_json::to_string(&response)?;
            encoded.push('\n');
            stdout.write_all(encoded.as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    session.close();
    Ok(())
}
