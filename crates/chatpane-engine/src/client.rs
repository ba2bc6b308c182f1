//! Responder client.
//!
//! A responder is whatever answers the user: an external command that reads
//! the prompt on stdin and prints a reply, or a local echo used for demos
//! and tests.

use crate::chat::{Citation, Prompt};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// How replies are produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponderConfig {
    /// Spawn a command, write the prompt to stdin, read the reply from stdout.
    Command {
        /// Command and arguments.
        command_argv: Vec<String>,
    },
    /// Reply with the user's own text after a delay.
    Echo {
        /// Simulated response latency.
        #[serde(default = "default_echo_delay")]
        delay_ms: u64,
    },
}

fn default_echo_delay() -> u64 {
    600
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self::Echo {
            delay_ms: default_echo_delay(),
        }
    }
}

impl ResponderConfig {
    /// Short name for logs and the status bar.
    pub fn name(&self) -> &str {
        match self {
            Self::Command { command_argv } => command_argv.first().map_or("command", String::as_str),
            Self::Echo { .. } => "echo",
        }
    }
}

/// A reply from the responder.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Markdown content.
    pub content: String,
    /// Sources backing the reply.
    pub citations: Vec<Citation>,
    /// Wall time of the invocation.
    pub duration_ms: u64,
}

/// Structured reply a command may print instead of plain text.
#[derive(Debug, Deserialize)]
struct ReplyPayload {
    content: String,
    #[serde(default)]
    citations: Vec<Citation>,
}

/// Parse responder output.
///
/// Output that is a JSON object with a `content` field is read as a
/// structured reply; anything else is the reply text itself.
pub fn parse_reply(output: &str) -> (String, Vec<Citation>) {
    let trimmed = output.trim();
    if trimmed.starts_with('{') {
        if let Ok(payload) = serde_json::from_str::<ReplyPayload>(trimmed) {
            return (payload.content, payload.citations);
        }
    }
    (trimmed.to_string(), Vec::new())
}

/// Invoke the responder for one prompt.
pub async fn invoke_responder(
    config: &ResponderConfig,
    prompt: &Prompt,
    timeout_secs: u64,
) -> Result<Reply, ClientError> {
    let start = Instant::now();
    let timeout_duration = Duration::from_secs(timeout_secs);

    let (content, citations) = match config {
        ResponderConfig::Echo { delay_ms } => {
            let delay = Duration::from_millis(*delay_ms);
            if delay > timeout_duration {
                tokio::time::sleep(timeout_duration).await;
                return Err(ClientError::Timeout(timeout_secs));
            }
            tokio::time::sleep(delay).await;
            (format!("You said: {}", prompt.user_text()), Vec::new())
        }
        ResponderConfig::Command { command_argv } => {
            let output = run_command(command_argv, &prompt.render(), timeout_duration)
                .await
                .map_err(|e| match e {
                    ClientError::Timeout(_) => ClientError::Timeout(timeout_secs),
                    other => other,
                })?;
            parse_reply(&output)
        }
    };

    if content.is_empty() {
        return Err(ClientError::EmptyReply);
    }

    #[allow(clippy::cast_possible_truncation)]
    let duration_ms = start.elapsed().as_millis() as u64;
    debug!(responder = config.name(), duration_ms, "reply received");

    Ok(Reply {
        content,
        citations,
        duration_ms,
    })
}

async fn run_command(
    command_argv: &[String],
    input: &str,
    timeout_duration: Duration,
) -> Result<String, ClientError> {
    let (program, args) = command_argv.split_first().ok_or(ClientError::EmptyCommand)?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(ClientError::Spawn)?;

    // Written alongside the output drain so a full pipe cannot stall either side
    let stdin = child.stdin.take();
    let input = input.as_bytes().to_vec();
    let writer = tokio::spawn(async move {
        let Some(mut stdin) = stdin else {
            return Ok(());
        };
        match stdin.write_all(&input).await {
            Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
            _ => Ok(()),
        }
    });

    let output = match timeout(timeout_duration, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => {
            writer.abort();
            return Err(ClientError::Timeout(timeout_duration.as_secs()));
        }
    };

    if let Ok(Err(e)) = writer.await {
        return Err(ClientError::Io(e));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !output.status.success() {
        warn!(program = %program, code = ?output.status.code(), "responder exited with failure");
        return Err(ClientError::Failed {
            code: output.status.code(),
            stderr: stderr.trim().to_string(),
        });
    }

    // Some CLIs print their answer on stderr
    if stdout.trim().is_empty() {
        Ok(stderr)
    } else {
        Ok(stdout)
    }
}

/// Errors that can occur while invoking a responder.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The responder command has no program.
    #[error("Responder command is empty")]
    EmptyCommand,

    /// The responder could not be started.
    #[error("Failed to start responder: {0}")]
    Spawn(#[source] std::io::Error),

    /// I/O error while talking to the responder.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No reply within the timeout.
    #[error("Responder timed out after {0}s")]
    Timeout(u64),

    /// The responder exited unsuccessfully.
    #[error("Responder failed ({}): {stderr}", exit_label(.code.as_ref()))]
    Failed { code: Option<i32>, stderr: String },

    /// The responder produced no output.
    #[error("Responder returned an empty reply")]
    EmptyReply,
}

fn exit_label(code: Option<&i32>) -> String {
    code.map_or_else(|| "killed by signal".to_string(), |c| format!("exit code {c}"))
}
