//! chatpane-tui: Terminal UI for the chatpane chat client
//!
//! This crate provides the TUI layer for chatpane, including:
//! - The chat pane (transcript, typing indicator, input)
//! - Status bar and help overlay
//! - Headless mode for testing and automation

mod app;
mod event;
pub mod headless;
#[cfg(test)]
pub mod test_utils;
pub mod text;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use chatpane_engine;
pub use event::{key_to_action, Action, Event, EventHandler};

use chatpane_engine::{dispatch, ChatMessage, Config, RequestOutcome};
use crossterm::{
    cursor::Show as ShowCursor,
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, buffer::Buffer, layout::Rect, widgets::Widget, Terminal};
use std::io::{self, stdout};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use widgets::{ChatPane, HelpOverlay, StatusBar};

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen,
            ShowCursor
        );
    }
}

/// Draw the whole app into `buf`.
pub fn render_app(app: &App, area: Rect, buf: &mut Buffer) {
    if area.height == 0 {
        return;
    }

    let status_area = Rect::new(area.x, area.y, area.width, 1);
    let pane_area = Rect::new(area.x, area.y + 1, area.width, area.height - 1);

    let status = app.status_content();
    StatusBar::new(&status, &app.theme).render(status_area, buf);

    ChatPane::new(app.session.view(), &app.input, &app.theme)
        .placeholder(app.placeholder())
        .focused(!app.show_help)
        .render(pane_area, buf);

    if app.show_help {
        HelpOverlay::new(&app.theme).render(area, buf);
    }
}

/// Action for a mouse event, if any.
fn mouse_to_action(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollUp => Action::ScrollUp,
        MouseEventKind::ScrollDown => Action::ScrollDown,
        _ => Action::None,
    }
}

/// Dispatch the app's queued submissions.
fn dispatch_submissions(
    app: &mut App,
    tx: &mpsc::UnboundedSender<RequestOutcome>,
    handles: &mut Vec<JoinHandle<()>>,
) {
    handles.retain(|h| !h.is_finished());
    for submission in app.take_submissions() {
        handles.push(dispatch(
            app.config.responder.clone(),
            submission,
            app.config.request_timeout_seconds,
            tx.clone(),
        ));
    }
}

/// Run the TUI application.
///
/// This is the main entry point for the TUI. It sets up the terminal,
/// runs the event loop, and restores the terminal on exit.
pub async fn run_tui(
    config: Config,
    history: Vec<ChatMessage>,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut events = EventHandler::new(config.tick_rate_ms);
    let mut app = App::new(config, history);
    info!(
        responder = app.config.responder.name(),
        messages = app.session.context().len(),
        "tui started"
    );

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
    let mut handles: Vec<JoinHandle<()>> = Vec::new();

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            render_app(app, area, frame.buffer_mut());
        })?;

        tokio::select! {
            Some(event) = events.next() => match event {
                Event::Key(key) => app.on_key(key),
                Event::Mouse(mouse) => app.handle_action(mouse_to_action(mouse)),
                Event::Tick => app.tick(),
                Event::Resize(w, h) => debug!(width = w, height = h, "resized"),
                Event::Paste(text) => app.on_paste(&text),
            },
            Some(outcome) = outcome_rx.recv() => app.on_request_outcome(outcome),
            else => break,
        }

        dispatch_submissions(app, &outcome_tx, &mut handles);

        if app.should_quit {
            for handle in handles {
                handle.abort();
            }
            break;
        }
    }

    info!("tui stopped");
    Ok(())
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tui_version() {
        let version = tui_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }

    #[test]
    fn test_mouse_scroll() {
        use crossterm::event::KeyModifiers;
        let mouse = |kind| MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(mouse_to_action(mouse(MouseEventKind::ScrollUp)), Action::ScrollUp);
        assert_eq!(
            mouse_to_action(mouse(MouseEventKind::ScrollDown)),
            Action::ScrollDown
        );
        assert_eq!(mouse_to_action(mouse(MouseEventKind::Moved)), Action::None);
    }

    #[tokio::test]
    async fn test_dispatch_submissions_delivers_outcome() {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

        let mut app = test_utils::create_test_app();
        for c in "ping".chars() {
            app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        app.on_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handles = Vec::new();
        dispatch_submissions(&mut app, &tx, &mut handles);
        assert_eq!(handles.len(), 1);

        let outcome = rx.recv().await.unwrap();
        app.on_request_outcome(outcome);
        assert!(!app.session.is_pending());
        assert_eq!(app.session.context().len(), 2);
    }
}

#[cfg(test)]
mod snapshot_tests {
    use crate::test_utils::*;
    use chatpane_engine::{ChatMessage, Citation};
    use insta::assert_snapshot;

    #[test]
    fn test_snapshot_empty_app() {
        let app = create_test_app();
        assert_snapshot!("empty_app", render_app_to_string_sized(&app, 60, 12));
    }

    #[test]
    fn test_snapshot_conversation() {
        let app = create_test_app_with_history(vec![
            ChatMessage::user("What is **Rust**?"),
            ChatMessage::assistant("A *systems* language.")
                .with_citations(vec![Citation::new("rust-lang.org", "")]),
        ]);
        assert_snapshot!("conversation", render_app_to_string_sized(&app, 60, 14));
    }
}

/// Key handling flows through the app, as the event loop drives them.
#[cfg(test)]
mod navigation_tests {
    use crate::event::Action;
    use crate::test_utils::*;
    use chatpane_engine::ChatMessage;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_help_overlay_renders() {
        let mut app = create_test_app();
        app.handle_action(Action::Help);
        let screen = render_app_to_string(&app);
        assert!(screen.contains("Help"));
        assert!(screen.contains("Send message"));

        app.on_key(key(KeyCode::Esc));
        assert!(!app.show_help);
        assert!(!render_app_to_string(&app).contains("Send message"));
    }

    #[test]
    fn test_submit_shows_message_and_typing() {
        let mut app = create_test_app();
        for c in "Hello".chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
        app.on_key(key(KeyCode::Enter));
        // Finish the entry transition
        for _ in 0..app.config.entry_frames {
            app.tick();
        }

        let screen = render_app_to_string(&app);
        assert!(screen.contains("Hello"));
        assert!(screen.contains("Assistant is typing"));
        assert!(screen.contains("● Waiting"));
        assert!(screen.contains("Waiting for reply..."));
    }

    #[test]
    fn test_clear_empties_transcript() {
        let mut app = create_test_app_with_history(vec![ChatMessage::user("old")]);
        assert!(render_app_to_string(&app).contains("old"));

        app.on_key(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL));
        let screen = render_app_to_string(&app);
        assert!(screen.contains("No messages yet."));
        assert!(app.session.context().is_empty());
    }

    #[test]
    fn test_ctrl_c_quits_with_text_in_input() {
        let mut app = create_test_app();
        app.on_key(key(KeyCode::Char('a')));
        app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
