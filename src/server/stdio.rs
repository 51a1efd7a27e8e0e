//! Newline-delimited JSON webhook loop over stdio.
//!
//! One request envelope per input line, one response envelope per output
//! line. Parse failures are answered in-band with the generic
//! cannot-process message; the process-level exit codes never reflect
//! request outcomes.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use super::handlers::MSG_CANNOT_PROCESS;
use super::{handle_webhook, SharedState};
use crate::webhook::{WebhookRequest, WebhookResponse};

/// Webhook server running over stdio.
pub struct WebhookServer {
    /// Shared application state.
    state: SharedState,
}

impl WebhookServer {
    /// Create a new webhook server
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Run the server using async stdio
    pub async fn run(&self) -> std::io::Result<()> {
        info!("Eatery webhook server starting...");

        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            // EOF reached
            if bytes_read == 0 {
                info!("EOF received, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            debug!(request = %trimmed, "Received request");

            let response = match serde_json::from_str::<WebhookRequest>(trimmed) {
                Ok(request) => handle_webhook(&self.state, request).await,
                Err(e) => {
                    error!(error = %e, "Failed to parse request");
                    WebhookResponse::text(MSG_CANNOT_PROCESS)
                }
            };

            let response_json = serde_json::to_string(&response)?;
            debug!(response = %response_json, "Sending response");

            stdout.write_all(response_json.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }

        info!(
            active_sessions = self.state.drafts.session_count(),
            "Server shutdown"
        );

        Ok(())
    }
}
