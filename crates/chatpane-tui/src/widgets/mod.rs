//! UI widgets for the TUI.
//!
//! This module provides:
//! - [`StatusBar`] - Top status bar with phase, responder, message count
//! - [`ChatPane`] - Transcript and input
//! - [`TextInput`] - The message input
//! - [`HelpOverlay`] - Key bindings

mod chat_pane;
mod help;
mod status_bar;
mod text_input;

pub use chat_pane::{node_lines, ChatPane};
pub use help::HelpOverlay;
pub use status_bar::{StatusBar, StatusBarContent};
pub use text_input::{TextInput, TextInputState};
