//! One-shot bridge process: spawn, send a request, collect the response

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::protocol::{Request, find_response};
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Lines of stderr kept in error messages
const STDERR_TAIL_LINES: usize = 20;

/// Run the bridge for a single request and return its JSON response
///
/// The child is killed if `timeout` elapses.
pub async fn run_request(
    config: &BridgeConfig,
    request: &Request,
    timeout: Option<Duration>,
) -> Result<Value> {
    debug!("Starting bridge ({}): {}", request.action(), config.display_command());

    let mut command = Command::new(&config.command);
    command
        .args(&config.args)
        .envs(&config.env)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(cwd) = &config.cwd {
        command.current_dir(cwd);
    }

    let mut child = command.spawn().map_err(|e| BridgeError::SpawnFailed {
        command: config.command.clone(),
        reason: e.to_string(),
    })?;

    if let Some(mut stdin) = child.stdin.take() {
        let line = request.to_line()?;
        // The child may exit before reading; its output explains why
        if let Err(e) = stdin.write_all(line.as_bytes()).await {
            debug!("Bridge stdin closed early: {}", e);
        }
        drop(stdin);
    }

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| BridgeError::Timeout(limit.as_secs()))??,
        None => child.wait_with_output().await?,
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
        debug!(target: "desk_bridge::child", "{}", line);
    }

    match find_response(&stdout) {
        Some(response) => {
            if !output.status.success() {
                debug!("Bridge exited with {} after responding", output.status);
            }
            Ok(response)
        }
        None if !output.status.success() => Err(BridgeError::ExitStatus {
            status: output.status.to_string(),
            stderr: tail(&stderr, STDERR_TAIL_LINES),
        }),
        None => Err(BridgeError::Protocol(
            "Bridge produced no JSON response".to_string(),
        )),
    }
}

fn tail(text: &str, lines: usize) -> String {
    let collected: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .collect();
    let start = collected.len().saturating_sub(lines);
    collected[start..].join("\n")
}
