//! Stdio transport: a local tool server as a child process.
//!
//! Messages are newline-delimited JSON-RPC on the child's stdin/stdout. The
//! child's stderr is inherited so server diagnostics reach the terminal.

use super::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RpcError};
use super::transport::{MessageKind, classify_message};
use serde::Serialize;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use toolrelay_domain::{ConnectionError, StdioServerConfig};
use tracing::{debug, trace, warn};

pub struct StdioTransport {
    provider: String,
    /// Server process (killed on drop to prevent orphans)
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    stdout: BufReader<ChildStdout>,
}

impl StdioTransport {
    /// Spawn the configured server process with piped stdin/stdout.
    pub fn spawn(provider: &str, config: &StdioServerConfig) -> Result<Self, ConnectionError> {
        let program = resolve_command(&config.command);
        debug!(provider = %provider, command = %program, args = ?config.args, "Spawning stdio server");

        let mut cmd = Command::new(&program);
        cmd.args(&config.args)
            .envs(&config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        // Linux: request kernel to send SIGTERM to child when parent dies.
        // This catches cases where Drop doesn't run (SIGKILL, OOM kill).
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let spawn_err = |source: std::io::Error| ConnectionError::Spawn {
            provider: provider.to_string(),
            source,
        };

        let mut child = cmd.spawn().map_err(spawn_err)?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_err(std::io::Error::other("Failed to capture stdin")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_err(std::io::Error::other("Failed to capture stdout")))?;

        Ok(Self {
            provider: provider.to_string(),
            child,
            stdin: Some(BufWriter::new(stdin)),
            stdout: BufReader::new(stdout),
        })
    }

    /// Send a request and wait for the response carrying its id.
    ///
    /// Server notifications arriving in between are skipped; server requests
    /// are answered so the server does not block on them.
    pub async fn request(
        &mut self,
        request: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, ConnectionError> {
        self.write_message(request).await?;

        loop {
            let message = self.read_message().await?;
            match classify_message(&message) {
                MessageKind::Response { id: Some(id) } if id == request.id => {
                    return serde_json::from_value(message)
                        .map_err(|e| self.protocol(format!("Invalid response: {}", e)));
                }
                MessageKind::Response { id } => {
                    warn!(provider = %self.provider, id = ?id, "Discarding response with unexpected id");
                }
                MessageKind::UnattributedError => {
                    // Only one request is in flight, so the error is ours
                    let error: RpcError = serde_json::from_value(message["error"].clone())
                        .map_err(|e| self.protocol(format!("Invalid error object: {}", e)))?;
                    return Err(ConnectionError::Rpc {
                        provider: self.provider.clone(),
                        code: error.code,
                        message: error.message,
                    });
                }
                MessageKind::IncomingRequest { id } => {
                    let method = message.get("method").and_then(|m| m.as_str()).unwrap_or("");
                    debug!(provider = %self.provider, method = %method, "Answering server request");
                    let reply = if method == "ping" {
                        serde_json::json!({"jsonrpc": "2.0", "id": id, "result": {}})
                    } else {
                        serde_json::json!({
                            "jsonrpc": "2.0",
                            "id": id,
                            "error": {"code": -32601, "message": "Method not found"}
                        })
                    };
                    self.write_message(&reply).await?;
                }
                MessageKind::Notification => {
                    trace!(provider = %self.provider, "Server notification: {}", message);
                }
            }
        }
    }

    pub async fn notify(&mut self, notification: &JsonRpcNotification) -> Result<(), ConnectionError> {
        self.write_message(notification).await
    }

    /// Close stdin, then terminate and reap the child.
    pub async fn close(&mut self) -> Result<(), ConnectionError> {
        if let Some(mut stdin) = self.stdin.take()
            && let Err(e) = stdin.shutdown().await
        {
            debug!(provider = %self.provider, error = %e, "Closing stdin failed");
        }

        if let Some(status) = self.child.try_wait().map_err(|e| self.io(e))? {
            debug!(provider = %self.provider, %status, "Stdio server already exited");
            return Ok(());
        }

        self.child.start_kill().map_err(|e| self.io(e))?;
        let status = self.child.wait().await.map_err(|e| self.io(e))?;
        debug!(provider = %self.provider, %status, "Stdio server stopped");
        Ok(())
    }

    async fn write_message<T: Serialize>(&mut self, message: &T) -> Result<(), ConnectionError> {
        let mut line = serde_json::to_string(message)
            .map_err(|e| self.protocol(format!("Failed to encode message: {}", e)))?;
        line.push('\n');
        trace!(provider = %self.provider, "Sending: {}", line.trim_end());

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ConnectionError::Closed {
                provider: self.provider.clone(),
            });
        };
        let result = async {
            stdin.write_all(line.as_bytes()).await?;
            stdin.flush().await
        }
        .await;
        result.map_err(|e| self.io(e))
    }

    async fn read_message(&mut self) -> Result<serde_json::Value, ConnectionError> {
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = self
                .stdout
                .read_line(&mut line)
                .await
                .map_err(|e| self.io(e))?;
            if bytes_read == 0 {
                return Err(ConnectionError::Closed {
                    provider: self.provider.clone(),
                });
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            trace!(provider = %self.provider, "Received: {}", trimmed);

            match serde_json::from_str(trimmed) {
                Ok(value) => return Ok(value),
                Err(_) => {
                    warn!(provider = %self.provider, "Ignoring non-JSON output: {}", trimmed);
                }
            }
        }
    }

    fn io(&self, source: std::io::Error) -> ConnectionError {
        ConnectionError::Io {
            provider: self.provider.clone(),
            source,
        }
    }

    fn protocol(&self, message: String) -> ConnectionError {
        ConnectionError::Protocol {
            provider: self.provider.clone(),
            message,
        }
    }
}

/// Resolve `npx` through `PATH`; every other command is used verbatim.
fn resolve_command(command: &str) -> String {
    if command == "npx" {
        if let Ok(path) = which::which("npx") {
            return path.to_string_lossy().into_owned();
        }
    }
    command.to_string()
}
