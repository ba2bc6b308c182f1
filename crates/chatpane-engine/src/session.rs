//! Chat session: the view, the conversation history and the request gate.

use crate::chat::{ChatContext, ChatMessage};
use crate::config::Config;
use crate::request::{RequestId, RequestOutcome, Submission};
use crate::view::{ChatView, InputField, MessageElement, NodeId, TypingTemplate, ViewOptions};
use tracing::{debug, info, warn};

/// Why a submission was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The input is empty or whitespace.
    #[error("Message is empty")]
    Empty,

    /// A reply is still awaited.
    #[error("A reply is still pending")]
    Pending,
}

#[derive(Debug)]
struct InFlight {
    id: RequestId,
    user_text: String,
}

/// One conversation on screen.
#[derive(Debug)]
pub struct ChatSession {
    view: ChatView,
    context: ChatContext,
    system_prompt: String,
    history_window: usize,
    in_flight: Option<InFlight>,
}

impl ChatSession {
    /// Create a session around an existing view and history.
    pub fn new(
        view: ChatView,
        context: ChatContext,
        system_prompt: impl Into<String>,
        history_window: usize,
    ) -> Self {
        Self {
            view,
            context,
            system_prompt: system_prompt.into(),
            history_window,
            in_flight: None,
        }
    }

    /// Create a session from config, seeded with `history`.
    ///
    /// Runs the initial load handler, so the latest message is in view.
    pub fn from_config(config: &Config, history: Vec<ChatMessage>) -> Self {
        let mut view = ChatView::with_history(
            &history,
            config.typing_template(),
            config.view_options(),
        );
        view.on_load();
        Self::new(
            view,
            ChatContext::from_messages(history),
            config.system_prompt.clone(),
            config.history_window,
        )
    }

    /// The view.
    pub fn view(&self) -> &ChatView {
        &self.view
    }

    /// Mutable view (scrolling, source toggling).
    pub fn view_mut(&mut self) -> &mut ChatView {
        &mut self.view
    }

    /// The conversation history.
    pub fn context(&self) -> &ChatContext {
        &self.context
    }

    /// Whether a reply is awaited.
    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Id of the request in flight.
    pub fn pending_request(&self) -> Option<RequestId> {
        self.in_flight.as_ref().map(|f| f.id)
    }

    /// Submit the input's text.
    ///
    /// On success the user message and the typing placeholder are on
    /// screen, the input is cleared, and the returned submission should be
    /// dispatched. On rejection nothing changes.
    pub fn submit<I: InputField + ?Sized>(
        &mut self,
        input: &mut I,
    ) -> Result<Submission, SubmitError> {
        if self.in_flight.is_some() || self.view.is_pending() {
            warn!("submission rejected: reply pending");
            return Err(SubmitError::Pending);
        }

        let text = input.value().to_string();
        if text.trim().is_empty() {
            debug!("submission rejected: empty input");
            return Err(SubmitError::Empty);
        }

        let prompt = self
            .context
            .build_prompt(&self.system_prompt, self.history_window, &text);
        self.view.submit(input);

        let id = RequestId::new();
        info!(request = %id, history = self.context.len(), "message submitted");
        self.in_flight = Some(InFlight { id, user_text: text });

        Ok(Submission { id, prompt })
    }

    /// Swap in the outcome of the request in flight.
    ///
    /// Outcomes for any other request are dropped. Returns the id of the
    /// swapped element.
    pub fn complete(&mut self, outcome: RequestOutcome) -> Option<NodeId> {
        let in_flight = match self.in_flight.take() {
            Some(f) if f.id == outcome.id => f,
            other => {
                debug!(request = %outcome.id, "stale outcome ignored");
                self.in_flight = other;
                return None;
            }
        };

        let id = match outcome.result {
            Ok(reply) => {
                let element =
                    MessageElement::bot(reply.content.clone()).with_citations(reply.citations.clone());
                let id = self.view.swap(element);
                self.context.push(ChatMessage::user(in_flight.user_text));
                self.context
                    .push(ChatMessage::assistant(reply.content).with_citations(reply.citations));
                id
            }
            Err(e) => {
                warn!(request = %outcome.id, error = %e, "showing request failure");
                self.view.swap(MessageElement::error(format!("Error: {e}")))
            }
        };
        Some(id)
    }

    /// Empty the conversation and its history.
    pub fn clear(&mut self) -> Result<(), SubmitError> {
        if self.in_flight.is_some() {
            return Err(SubmitError::Pending);
        }
        self.view.clear();
        self.context.clear();
        info!("conversation cleared");
        Ok(())
    }

    /// Advance animations. Returns `true` while anything moves.
    pub fn tick(&mut self) -> bool {
        self.view.tick()
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(
            ChatView::new(TypingTemplate::default(), ViewOptions::default()),
            ChatContext::new(),
            crate::chat::DEFAULT_SYSTEM_PROMPT,
            crate::chat::DEFAULT_HISTORY_WINDOW,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{Citation, Role};
    use crate::client::{ClientError, Reply};
    use crate::view::{Class, Node};

    fn reply(content: &str) -> Reply {
        Reply {
            content: content.into(),
            citations: Vec::new(),
            duration_ms: 1,
        }
    }

    fn ok(id: RequestId, content: &str) -> RequestOutcome {
        RequestOutcome {
            id,
            result: Ok(reply(content)),
        }
    }

    #[test]
    fn test_submit_and_complete() {
        let mut session = ChatSession::default();
        let mut input = String::from("Hello");

        let sub = session.submit(&mut input).unwrap();
        assert!(input.is_empty());
        assert!(session.is_pending());
        assert_eq!(sub.prompt.user_text(), "Hello");
        assert_eq!(session.view().placeholder_count(), 1);

        let id = session.complete(ok(sub.id, "Hi there")).unwrap();
        assert!(!session.is_pending());
        assert_eq!(session.view().placeholder_count(), 0);

        let element = session.view().container().get(id).and_then(Node::as_message).unwrap();
        assert_eq!(element.text(), "Hi there");
        assert!(element.has_class(Class::Show));

        let history = session.context().messages();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].content, "Hi there");
    }

    #[test]
    fn test_empty_submission_rejected() {
        let mut session = ChatSession::default();
        let mut input = String::from("   \n");
        assert_eq!(session.submit(&mut input), Err(SubmitError::Empty));
        assert_eq!(input, "   \n");
        assert!(session.view().container().is_empty());
        assert!(!session.is_pending());
    }

    #[test]
    fn test_concurrent_submission_rejected() {
        let mut session = ChatSession::default();
        session.submit(&mut String::from("first")).unwrap();

        let mut second = String::from("second");
        assert_eq!(session.submit(&mut second), Err(SubmitError::Pending));
        assert_eq!(second, "second");
        assert_eq!(session.view().placeholder_count(), 1);
        assert_eq!(session.view().container().count_class(Class::UserMessage), 1);
    }

    #[test]
    fn test_failure_shows_error_message() {
        let mut session = ChatSession::default();
        let sub = session.submit(&mut String::from("Hello")).unwrap();

        let id = session
            .complete(RequestOutcome {
                id: sub.id,
                result: Err(ClientError::Timeout(120)),
            })
            .unwrap();

        let element = session.view().container().get(id).and_then(Node::as_message).unwrap();
        assert!(element.has_class(Class::Error));
        assert!(element.has_class(Class::BotMessage));
        assert_eq!(element.text(), "Error: Responder timed out after 120s");
        assert!(!session.is_pending());
        assert_eq!(session.view().placeholder_count(), 0);
        assert!(session.context().is_empty());
    }

    #[test]
    fn test_stale_outcome_ignored() {
        let mut session = ChatSession::default();
        let sub = session.submit(&mut String::from("Hello")).unwrap();

        assert!(session.complete(ok(RequestId::new(), "late")).is_none());
        assert!(session.is_pending());
        assert_eq!(session.pending_request(), Some(sub.id));
        assert_eq!(session.view().placeholder_count(), 1);

        assert!(session.complete(ok(sub.id, "on time")).is_some());
    }

    #[test]
    fn test_outcome_without_request_ignored() {
        let mut session = ChatSession::default();
        assert!(session.complete(ok(RequestId::new(), "nobody asked")).is_none());
        assert!(session.view().container().is_empty());
    }

    #[test]
    fn test_prompt_includes_history_window() {
        let mut session = ChatSession::default();
        for i in 0..4 {
            let sub = session.submit(&mut format!("q{i}")).unwrap();
            session.complete(ok(sub.id, &format!("a{i}")));
        }

        let sub = session.submit(&mut String::from("latest")).unwrap();
        // system + 5 history + user
        assert_eq!(sub.prompt.messages.len(), 7);
        assert_eq!(sub.prompt.messages[1].content, "a1");
    }

    #[test]
    fn test_citations_kept_in_history_and_view() {
        let mut session = ChatSession::default();
        let sub = session.submit(&mut String::from("Q")).unwrap();
        let id = session
            .complete(RequestOutcome {
                id: sub.id,
                result: Ok(Reply {
                    content: "A".into(),
                    citations: vec![Citation::new("doc.md", "quote")],
                    duration_ms: 3,
                }),
            })
            .unwrap();

        assert_eq!(session.view().last_reply_with_sources(), Some(id));
        assert_eq!(session.context().messages()[1].citations.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut session = ChatSession::default();
        let sub = session.submit(&mut String::from("Hello")).unwrap();
        assert_eq!(session.clear(), Err(SubmitError::Pending));

        session.complete(ok(sub.id, "Hi"));
        session.clear().unwrap();
        assert!(session.view().container().is_empty());
        assert!(session.context().is_empty());
    }

    #[test]
    fn test_from_config_scrolls_to_history() {
        let config = Config {
            smooth_scroll: false,
            ..Config::default()
        };
        let history = vec![
            ChatMessage::user("one"),
            ChatMessage::assistant("two"),
            ChatMessage::user("three"),
            ChatMessage::assistant("four"),
        ];
        let session = ChatSession::from_config(&config, history);
        assert_eq!(session.view().container().len(), 4);
        assert_eq!(session.view().viewport().offset(), 3);
        assert_eq!(session.context().len(), 4);
    }

    #[test]
    fn test_tick_settles() {
        let mut session = ChatSession::default();
        let sub = session.submit(&mut String::from("Hello")).unwrap();
        session.complete(ok(sub.id, "Hi"));
        let mut ticks = 0;
        while session.tick() {
            ticks += 1;
            assert!(ticks < 50);
        }
    }
}
