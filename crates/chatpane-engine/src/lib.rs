//! chatpane-engine: Headless chat view model and responder client
//!
//! This crate provides the core of chatpane, including:
//! - The chat view model (container, typing placeholder, viewport, watcher)
//! - Conversation history and prompt building
//! - Responder invocation and request dispatch
//! - Configuration

pub mod chat;
pub mod client;
pub mod config;
pub mod request;
pub mod session;
pub mod view;

// Re-export commonly used types
pub use chat::{load_transcript, ChatContext, ChatError, ChatMessage, Citation, Prompt, Role};
pub use client::{invoke_responder, parse_reply, ClientError, Reply, ResponderConfig};
pub use config::{Config, ConfigError, ThemeName, CHATPANE_DIR};
pub use request::{dispatch, RequestId, RequestOutcome, Submission};
pub use session::{ChatSession, SubmitError};
pub use view::{ChatView, InputField, ViewOptions, ViewPhase};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}
