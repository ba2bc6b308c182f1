//! Chat history and prompt building.
//!
//! This module provides the conversation record that is sent to the
//! responder, plus read-only transcript loading used to seed the view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default system prompt sent ahead of the conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions based on the given context and chat history.";

/// Default number of history messages included in a prompt.
pub const DEFAULT_HISTORY_WINDOW: usize = 5;

/// Role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message (instructions to the responder).
    System,
    /// User message.
    User,
    /// Assistant (responder) reply.
    Assistant,
}

/// A source attached to an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Where the content came from (file, URL, document title).
    pub source: String,
    /// Quoted content.
    #[serde(default)]
    pub content: String,
}

impl Citation {
    /// Create a citation.
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message author.
    pub role: Role,
    /// Message content (markdown for assistant replies).
    pub content: String,
    /// Sources backing an assistant reply.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    /// Timestamp of the message.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            citations: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Attach citations to this message.
    #[must_use]
    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }
}

/// Conversation history kept alongside the view.
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    messages: Vec<ChatMessage>,
}

impl ChatContext {
    /// Create a new empty chat context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context from existing messages (e.g. a loaded transcript).
    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    /// All messages in order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the history is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Get the last N messages (for context windowing).
    pub fn last_messages(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Build the prompt for a new user message.
    ///
    /// The prompt is the system prompt, the last `window` history messages,
    /// then the user message. The user message is not added to the history.
    pub fn build_prompt(&self, system_prompt: &str, window: usize, user_message: &str) -> Prompt {
        let mut messages = Vec::with_capacity(window + 2);
        if !system_prompt.is_empty() {
            messages.push(ChatMessage::system(system_prompt));
        }
        messages.extend(self.last_messages(window).iter().cloned());
        messages.push(ChatMessage::user(user_message));
        Prompt { messages }
    }
}

/// A prepared prompt: system instructions, windowed history, user message.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    /// Messages in the order they are presented to the responder.
    pub messages: Vec<ChatMessage>,
}

impl Prompt {
    /// The user message this prompt was built for.
    pub fn user_text(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map_or("", |m| m.content.as_str())
    }

    /// Render the prompt as plain text for a command responder.
    pub fn render(&self) -> String {
        use std::fmt::Write;

        let mut prompt = String::new();
        for msg in &self.messages {
            let label = match msg.role {
                Role::System => "[System]",
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            let _ = write!(prompt, "{label}: {}\n\n", msg.content);
        }
        prompt.push_str("Respond to the user's last message.\n");
        prompt
    }
}

/// Load a JSONL transcript (one `ChatMessage` per line).
///
/// Blank lines are skipped. System messages are dropped since they are never
/// shown in the view.
pub fn load_transcript(path: &Path) -> Result<Vec<ChatMessage>, ChatError> {
    let content = std::fs::read_to_string(path)?;

    let mut messages = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let msg: ChatMessage =
            serde_json::from_str(line).map_err(|source| ChatError::Parse {
                line: idx + 1,
                source,
            })?;
        if msg.role != Role::System {
            messages.push(msg);
        }
    }

    Ok(messages)
}

/// Errors that can occur in chat operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse error in a transcript line.
    #[error("Parse error on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
