//! Application state and update logic for the chatpane TUI.

use crate::event::{key_to_action, Action};
use crate::theme::Theme;
use crate::widgets::{StatusBarContent, TextInputState};
use chatpane_engine::chat::Role;
use chatpane_engine::view::NodeId;
use chatpane_engine::{ChatMessage, ChatSession, Config, RequestOutcome, Submission, SubmitError};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Children moved by PageUp/PageDown.
const PAGE_SIZE: usize = 5;

/// Ticks a notification stays visible.
const NOTIFICATION_TICKS: usize = 30;

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// The conversation.
    pub session: ChatSession,
    /// Message input.
    pub input: TextInputState,
    pub theme: Theme,
    pub config: Config,
    pub show_help: bool,
    pub should_quit: bool,
    /// Transient status bar notice.
    pub notification: Option<String>,
    notification_ttl: usize,
    /// Ticks since start.
    pub tick: usize,
    /// Accepted submissions not yet dispatched.
    outbox: Vec<Submission>,
}

impl App {
    /// Create the app for `config`, showing `history`.
    pub fn new(config: Config, history: Vec<ChatMessage>) -> Self {
        let session = ChatSession::from_config(&config, history);
        Self {
            session,
            input: TextInputState::new(),
            theme: Theme::from_name(config.theme),
            config,
            show_help: false,
            should_quit: false,
            notification: None,
            notification_ttl: 0,
            tick: 0,
            outbox: Vec::new(),
        }
    }

    /// An app with an instant echo responder and no animation.
    #[cfg(test)]
    pub fn new_for_test() -> Self {
        let config = Config {
            responder: chatpane_engine::ResponderConfig::Echo { delay_ms: 0 },
            smooth_scroll: false,
            ..Config::default()
        };
        Self::new(config, Vec::new())
    }

    /// Handle a key event, editing first and falling back to actions.
    pub fn on_key(&mut self, key: KeyEvent) {
        if !self.handle_key(key) {
            self.handle_action(key_to_action(key));
        }
    }

    /// Insert pasted text at the cursor.
    pub fn on_paste(&mut self, text: &str) {
        if self.show_help {
            return;
        }
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        self.input.insert_str(&text);
    }

    /// Apply a key to the input. Returns `true` if it was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.show_help {
            return false;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('j') {
                self.input.insert('\n');
                return true;
            }
            return false;
        }

        match key.code {
            KeyCode::Char('?') if self.input.is_empty() => false,
            KeyCode::Char(c) => {
                self.input.insert(c);
                true
            }
            KeyCode::Backspace => {
                self.input.backspace();
                true
            }
            KeyCode::Delete => {
                self.input.delete();
                true
            }
            KeyCode::Left => {
                self.input.move_left();
                true
            }
            KeyCode::Right => {
                self.input.move_right();
                true
            }
            KeyCode::Home => {
                self.input.move_home();
                true
            }
            KeyCode::End => {
                self.input.move_end();
                true
            }
            KeyCode::Up if self.input.is_empty() || self.input.is_browsing_history() => {
                self.input.history_prev()
            }
            KeyCode::Down if self.input.is_browsing_history() => {
                self.input.history_next();
                true
            }
            _ => false,
        }
    }

    /// Handle a navigation or command action.
    pub fn handle_action(&mut self, action: Action) {
        if action == Action::Quit {
            self.should_quit = true;
            return;
        }
        if action == Action::Help {
            self.show_help = !self.show_help;
            return;
        }
        if self.show_help {
            if action != Action::None {
                self.show_help = false;
            }
            return;
        }

        match action {
            Action::Back => self.should_quit = true,
            Action::Submit => self.submit(),
            Action::ScrollUp => self.session.view_mut().viewport_mut().scroll_up(1),
            Action::ScrollDown => self.scroll_down(1),
            Action::PageUp => self
                .session
                .view_mut()
                .viewport_mut()
                .scroll_up(PAGE_SIZE),
            Action::PageDown => self.scroll_down(PAGE_SIZE),
            Action::JumpStart => self.session.view_mut().viewport_mut().jump_to_start(),
            Action::JumpEnd => self.session.view_mut().scroll_to_last(),
            Action::ToggleSources => self.toggle_sources(),
            Action::Clear => {
                if self.session.clear().is_err() {
                    self.set_notification("Cannot clear while waiting for a reply");
                }
            }
            Action::Quit | Action::Help | Action::None => {}
        }
    }

    fn submit(&mut self) {
        let text = self.input.content().to_string();
        match self.session.submit(&mut self.input) {
            Ok(submission) => {
                self.input.push_history(text);
                self.outbox.push(submission);
            }
            Err(SubmitError::Pending) => self.set_notification("Still waiting for a reply"),
            Err(SubmitError::Empty) => {}
        }
    }

    fn scroll_down(&mut self, amount: usize) {
        let len = self.session.view().container().len();
        self.session
            .view_mut()
            .viewport_mut()
            .scroll_down(amount, len);
    }

    /// The reply whose sources Ctrl+S folds: the first one with sources at
    /// or below the top of the view, else the latest.
    fn sources_target(&self) -> Option<NodeId> {
        let view = self.session.view();
        view.container()
            .children()
            .iter()
            .skip(view.viewport().offset())
            .find(|child| {
                child
                    .node
                    .as_message()
                    .is_some_and(|m| m.role() == Role::Assistant && !m.citations().is_empty())
            })
            .map(|child| child.id)
            .or_else(|| view.last_reply_with_sources())
    }

    fn toggle_sources(&mut self) {
        match self.sources_target() {
            Some(id) => {
                self.session.view_mut().toggle_sources(id);
            }
            None => self.set_notification("No sources to show"),
        }
    }

    /// Drain submissions waiting to be dispatched.
    pub fn take_submissions(&mut self) -> Vec<Submission> {
        std::mem::take(&mut self.outbox)
    }

    /// Feed a finished request back into the session.
    pub fn on_request_outcome(&mut self, outcome: RequestOutcome) {
        self.session.complete(outcome);
    }

    /// Set a temporary notification message.
    fn set_notification(&mut self, msg: impl Into<String>) {
        self.notification = Some(msg.into());
        self.notification_ttl = NOTIFICATION_TICKS;
    }

    /// Called on each tick.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.session.tick();

        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }
    }

    /// Placeholder for the empty input.
    pub fn placeholder(&self) -> &'static str {
        if self.session.is_pending() {
            "Waiting for reply..."
        } else {
            "Type a message"
        }
    }

    /// Status bar content for the current state.
    pub fn status_content(&self) -> StatusBarContent {
        let view = self.session.view();
        let message_count = view.container().messages().count();
        let following = view.viewport().offset() + 1 >= view.container().len();

        let hint = if !following {
            Some("Ctrl+End for latest")
        } else if self.session.is_pending() {
            None
        } else if self.input.is_empty() {
            Some("? for help")
        } else {
            Some("Enter to send")
        };

        StatusBarContent {
            pending: self.session.is_pending(),
            responder: self.config.responder.name().to_string(),
            message_count,
            hint: hint.map(str::to_string),
            notification: self.notification.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatpane_engine::{Citation, Reply};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
    }

    fn reply(submission: &Submission, content: &str) -> RequestOutcome {
        RequestOutcome {
            id: submission.id,
            result: Ok(Reply {
                content: content.into(),
                citations: Vec::new(),
                duration_ms: 0,
            }),
        }
    }

    #[test]
    fn test_typing_and_submit() {
        let mut app = App::new_for_test();
        type_text(&mut app, "Hello");
        assert_eq!(app.input.content(), "Hello");

        app.on_key(key(KeyCode::Enter));
        assert!(app.input.is_empty());
        assert!(app.session.is_pending());
        assert_eq!(app.placeholder(), "Waiting for reply...");

        let subs = app.take_submissions();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].prompt.user_text(), "Hello");
        assert!(app.take_submissions().is_empty());
    }

    #[test]
    fn test_empty_submit_ignored() {
        let mut app = App::new_for_test();
        type_text(&mut app, "   ");
        app.on_key(key(KeyCode::Enter));
        assert!(!app.session.is_pending());
        assert!(app.take_submissions().is_empty());
        assert_eq!(app.input.content(), "   ");
    }

    #[test]
    fn test_submit_while_pending_keeps_input() {
        let mut app = App::new_for_test();
        type_text(&mut app, "one");
        app.on_key(key(KeyCode::Enter));
        type_text(&mut app, "two");
        app.on_key(key(KeyCode::Enter));

        assert_eq!(app.input.content(), "two");
        assert_eq!(app.take_submissions().len(), 1);
        assert_eq!(app.notification.as_deref(), Some("Still waiting for a reply"));
    }

    #[test]
    fn test_outcome_completes_turn() {
        let mut app = App::new_for_test();
        type_text(&mut app, "Hi");
        app.on_key(key(KeyCode::Enter));
        let sub = app.take_submissions().remove(0);

        app.on_request_outcome(reply(&sub, "Hello back"));
        assert!(!app.session.is_pending());
        assert_eq!(app.session.view().placeholder_count(), 0);
        assert_eq!(app.session.context().len(), 2);
        assert_eq!(app.status_content().message_count, 2);
    }

    #[test]
    fn test_question_mark_toggles_help_only_when_empty() {
        let mut app = App::new_for_test();
        app.on_key(key(KeyCode::Char('?')));
        assert!(app.show_help);

        app.on_key(key(KeyCode::Char('x')));
        assert!(!app.show_help);
        assert!(app.input.is_empty());

        type_text(&mut app, "why?");
        assert_eq!(app.input.content(), "why?");
        assert!(!app.show_help);
    }

    #[test]
    fn test_escape_quits_unless_help_open() {
        let mut app = App::new_for_test();
        app.show_help = true;
        app.on_key(key(KeyCode::Esc));
        assert!(!app.show_help);
        assert!(!app.should_quit);

        app.on_key(key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_j_inserts_newline() {
        let mut app = App::new_for_test();
        type_text(&mut app, "a");
        app.on_key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL));
        type_text(&mut app, "b");
        assert_eq!(app.input.content(), "a\nb");
    }

    #[test]
    fn test_paste_keeps_newlines_without_submitting() {
        let mut app = App::new_for_test();
        type_text(&mut app, "> ");
        app.on_paste("line one\r\nline two");

        assert_eq!(app.input.content(), "> line one\nline two");
        assert!(app.take_submissions().is_empty());

        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.take_submissions().len(), 1);
    }

    #[test]
    fn test_up_recalls_history() {
        let mut app = App::new_for_test();
        type_text(&mut app, "first");
        app.on_key(key(KeyCode::Enter));

        app.on_key(key(KeyCode::Up));
        assert_eq!(app.input.content(), "first");
        app.on_key(key(KeyCode::Down));
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_up_scrolls_without_recall_history() {
        let history: Vec<ChatMessage> = (0..4)
            .map(|i| ChatMessage::user(format!("m{i}")))
            .collect();
        let mut app = App::new(
            Config {
                smooth_scroll: false,
                ..Config::default()
            },
            history,
        );
        assert_eq!(app.session.view().viewport().offset(), 3);

        app.on_key(key(KeyCode::Up));
        assert_eq!(app.session.view().viewport().offset(), 2);
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_scroll_actions() {
        let history: Vec<ChatMessage> = (0..10)
            .map(|i| ChatMessage::user(format!("m{i}")))
            .collect();
        let mut app = App::new(
            Config {
                smooth_scroll: false,
                ..Config::default()
            },
            history,
        );
        assert_eq!(app.session.view().viewport().offset(), 9);

        app.handle_action(Action::PageUp);
        assert_eq!(app.session.view().viewport().offset(), 4);
        assert_eq!(
            app.status_content().hint.as_deref(),
            Some("Ctrl+End for latest")
        );

        app.handle_action(Action::JumpStart);
        assert_eq!(app.session.view().viewport().offset(), 0);

        app.handle_action(Action::ScrollDown);
        assert_eq!(app.session.view().viewport().offset(), 1);

        app.handle_action(Action::JumpEnd);
        assert_eq!(app.session.view().viewport().offset(), 9);
    }

    #[test]
    fn test_toggle_sources() {
        let history = vec![
            ChatMessage::user("q"),
            ChatMessage::assistant("a").with_citations(vec![Citation::new("doc", "text")]),
        ];
        let mut app = App::new(Config::default(), history);
        let id = app.session.view().last_reply_with_sources().unwrap();
        let collapsed = |app: &App| {
            app.session
                .view()
                .container()
                .get(id)
                .and_then(|n| n.as_message())
                .unwrap()
                .sources_collapsed
        };

        assert!(collapsed(&app));
        app.handle_action(Action::ToggleSources);
        assert!(!collapsed(&app));
    }

    #[test]
    fn test_toggle_without_sources_notifies() {
        let mut app = App::new_for_test();
        app.handle_action(Action::ToggleSources);
        assert_eq!(app.notification.as_deref(), Some("No sources to show"));
    }

    #[test]
    fn test_clear_rejected_while_pending() {
        let mut app = App::new_for_test();
        type_text(&mut app, "hi");
        app.on_key(key(KeyCode::Enter));
        app.handle_action(Action::Clear);
        assert!(app.session.is_pending());
        assert!(app.notification.is_some());
    }

    #[test]
    fn test_notification_expires() {
        let mut app = App::new_for_test();
        app.set_notification("hello");
        for _ in 0..NOTIFICATION_TICKS {
            app.tick();
        }
        assert!(app.notification.is_none());
    }
}
