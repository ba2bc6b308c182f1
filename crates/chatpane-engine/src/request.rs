//! Request dispatch.
//!
//! A submission is handed to [`dispatch`], which runs the responder on a
//! tokio task and reports the outcome over a channel. The UI keeps the
//! receiving end and feeds outcomes back into the session.

use crate::chat::Prompt;
use crate::client::{invoke_responder, ClientError, Reply, ResponderConfig};
use std::fmt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

/// Identifier of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a fresh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.to_string();
        f.write_str(&s[..8])
    }
}

/// An accepted submission, ready to be sent to the responder.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Request id; the outcome carries the same id.
    pub id: RequestId,
    /// The prompt to send.
    pub prompt: Prompt,
}

/// Result of one request.
#[derive(Debug)]
pub struct RequestOutcome {
    /// Id of the submission this answers.
    pub id: RequestId,
    /// The reply or why there is none.
    pub result: Result<Reply, ClientError>,
}

/// Spawn the responder invocation for `submission`.
///
/// The outcome is sent on `tx`. A dropped receiver is not an error; the
/// outcome is discarded.
pub fn dispatch(
    responder: ResponderConfig,
    submission: Submission,
    timeout_secs: u64,
    tx: mpsc::UnboundedSender<RequestOutcome>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let Submission { id, prompt } = submission;
        info!(request = %id, responder = responder.name(), "request started");

        let result = invoke_responder(&responder, &prompt, timeout_secs).await;
        match &result {
            Ok(reply) => info!(request = %id, duration_ms = reply.duration_ms, "request finished"),
            Err(e) => warn!(request = %id, error = %e, "request failed"),
        }

        let _ = tx.send(RequestOutcome { id, result });
    })
}
