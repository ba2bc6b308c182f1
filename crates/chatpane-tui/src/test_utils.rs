//! Test utilities for chatpane-tui snapshot and integration testing.
//!
//! This module provides helper functions for creating test terminals,
//! rendering the app, and converting buffers to strings for snapshot testing.

use crate::app::App;
pub use crate::headless::buffer_to_string;
use crate::render_app;
use chatpane_engine::ChatMessage;
use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, Terminal};

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Create a test terminal with the default dimensions (80x24).
pub fn create_test_terminal() -> Terminal<TestBackend> {
    create_test_terminal_sized(TEST_WIDTH, TEST_HEIGHT)
}

/// Create a test terminal with custom dimensions.
pub fn create_test_terminal_sized(width: u16, height: u16) -> Terminal<TestBackend> {
    let backend = TestBackend::new(width, height);
    Terminal::new(backend).expect("Failed to create test terminal")
}

/// Create a test app with an instant echo responder.
pub fn create_test_app() -> App {
    App::new_for_test()
}

/// Create a test app showing `history`, scrolled to the top.
pub fn create_test_app_with_history(history: Vec<ChatMessage>) -> App {
    let mut app = App::new(App::new_for_test().config, history);
    app.session.view_mut().viewport_mut().jump_to_start();
    app
}

/// Render the whole app and return it as a string.
pub fn render_app_to_string(app: &App) -> String {
    render_app_to_string_sized(app, TEST_WIDTH, TEST_HEIGHT)
}

/// Render the whole app at custom dimensions.
pub fn render_app_to_string_sized(app: &App, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    render_app(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_terminal() {
        let terminal = create_test_terminal();
        let size = terminal.size().unwrap();
        assert_eq!(size.width, TEST_WIDTH);
        assert_eq!(size.height, TEST_HEIGHT);
    }

    #[test]
    fn test_create_test_app() {
        let app = create_test_app();
        assert!(app.session.view().container().is_empty());
        assert_eq!(app.config.responder.name(), "echo");
    }
}
