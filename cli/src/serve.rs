//! Stdio serving loop
//!
//! One JSON object per line on stdin (`{"tool": "...", "params": {...}}`),
//! one JSON reply per line on stdout. Malformed lines get an error reply
//! instead of killing the loop; EOF ends it.

use anyhow::Result;
use ecscope_application::ToolFacade;
use ecscope_application::ports::inventory_source::InventorySource;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Request {
    tool: String,
    #[serde(default)]
    params: Value,
}

pub async fn run<S: InventorySource>(facade: ToolFacade<S>) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                debug!(tool = %request.tool, "request received");
                let params = normalize_params(request.params);
                serde_json::to_value(facade.dispatch(&request.tool, &params).await)?
            }
            Err(e) => json!({
                "status": "error",
                "error": format!("malformed request: {e}"),
            }),
        };

        let mut out = serde_json::to_vec(&reply)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    debug!("stdin closed; shutting down");
    Ok(())
}

/// Absent params become an empty object so validation reports missing
/// fields instead of a type mismatch.
fn normalize_params(params: Value) -> Value {
    match params {
        Value::Null => json!({}),
        other => other,
    }
}
