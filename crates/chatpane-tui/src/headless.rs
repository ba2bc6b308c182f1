//! Headless mode for the chatpane TUI.
//!
//! This module provides a way to run the TUI without a real terminal,
//! enabling E2E testing and automation. Keys are sent via channels and
//! screen state is captured after each render.

use crate::app::App;
use crate::{dispatch_submissions, render_app};
use crossterm::event::KeyEvent;
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Default terminal dimensions for headless mode.
pub const DEFAULT_WIDTH: u16 = 80;
pub const DEFAULT_HEIGHT: u16 = 24;

/// State captured from the headless TUI after each render.
#[derive(Debug, Clone, Default)]
pub struct HeadlessState {
    /// Text contents of the terminal buffer.
    pub screen_contents: String,
    /// Whether the TUI should quit.
    pub should_quit: bool,
    /// Whether help overlay is visible.
    pub show_help: bool,
    /// Whether a reply is awaited.
    pub pending: bool,
    /// Messages in the conversation.
    pub message_count: usize,
}

/// Handle to control a headless TUI instance.
pub struct HeadlessHandle {
    key_tx: mpsc::UnboundedSender<KeyEvent>,
    state_rx: watch::Receiver<HeadlessState>,
}

impl HeadlessHandle {
    /// Send a key to the TUI.
    ///
    /// Returns `true` if the key was sent successfully.
    pub fn send_key(&self, key: KeyEvent) -> bool {
        self.key_tx.send(key).is_ok()
    }

    /// Get the current state of the TUI.
    pub fn state(&self) -> HeadlessState {
        self.state_rx.borrow().clone()
    }

    /// Wait until a condition is met on the state.
    ///
    /// Returns the state when the condition is met, or `None` if timed out.
    pub async fn wait_for<F>(&mut self, condition: F, timeout: Duration) -> Option<HeadlessState>
    where
        F: Fn(&HeadlessState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let state = self.state();
            if condition(&state) {
                return Some(state);
            }

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }

            match tokio::time::timeout(remaining, self.state_rx.changed()).await {
                Ok(Ok(())) => {}
                // Timed out, or the loop ended
                _ => return None,
            }
        }
    }

    /// Wait for specific text to appear on screen.
    pub async fn wait_for_text(&mut self, text: &str, timeout: Duration) -> Option<HeadlessState> {
        self.wait_for(|s| s.screen_contents.contains(text), timeout)
            .await
    }

    /// Check if the TUI has quit.
    pub fn has_quit(&self) -> bool {
        self.state().should_quit
    }
}

/// Configuration for headless mode.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Terminal width.
    pub width: u16,
    /// Terminal height.
    pub height: u16,
    /// Tick rate in milliseconds.
    pub tick_rate_ms: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_rate_ms: 20,
        }
    }
}

/// Run `app` in headless mode.
///
/// Returns a handle to control the TUI and a join handle for the background task.
///
/// # Example
///
/// ```ignore
/// let (mut handle, task) = run_tui_headless(app, HeadlessConfig::default());
///
/// handle.send_key(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::NONE));
/// let state = handle.wait_for_text("Help", Duration::from_secs(1)).await;
///
/// handle.send_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
/// task.await.unwrap();
/// ```
pub fn run_tui_headless(
    app: App,
    config: HeadlessConfig,
) -> (HeadlessHandle, JoinHandle<Result<(), String>>) {
    let (key_tx, key_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(HeadlessState::default());

    let task = tokio::spawn(async move {
        run_headless_loop(app, config, key_rx, state_tx)
            .await
            .map_err(|e| e.to_string())
    });

    (HeadlessHandle { key_tx, state_rx }, task)
}

async fn run_headless_loop(
    mut app: App,
    config: HeadlessConfig,
    mut key_rx: mpsc::UnboundedReceiver<KeyEvent>,
    state_tx: watch::Sender<HeadlessState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let backend = TestBackend::new(config.width, config.height);
    let mut terminal = Terminal::new(backend)?;

    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
    let mut handles: Vec<JoinHandle<()>> = Vec::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(config.tick_rate_ms.max(1)));

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            render_app(&app, area, frame.buffer_mut());
        })?;

        let _ = state_tx.send(HeadlessState {
            screen_contents: buffer_to_string(terminal.backend().buffer()),
            should_quit: app.should_quit,
            show_help: app.show_help,
            pending: app.session.is_pending(),
            message_count: app.session.view().container().messages().count(),
        });

        if app.should_quit {
            for handle in handles {
                handle.abort();
            }
            break;
        }

        tokio::select! {
            key = key_rx.recv() => match key {
                Some(key) => app.on_key(key),
                // Handle dropped
                None => app.should_quit = true,
            },
            Some(outcome) = outcome_rx.recv() => app.on_request_outcome(outcome),
            _ = ticker.tick() => app.tick(),
        }

        dispatch_submissions(&mut app, &outcome_tx, &mut handles);
    }

    Ok(())
}

/// Text of a terminal buffer, one row per line.
///
/// Trailing spaces on each row and trailing blank rows are dropped.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        let trimmed = result.trim_end_matches(' ').len();
        result.truncate(trimmed);
        result.push('\n');
    }

    let trimmed = result.trim_end_matches('\n').len();
    result.truncate(trimmed);
    result
}
