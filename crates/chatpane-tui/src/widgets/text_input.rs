//! Multi-line message input.

use chatpane_engine::InputField;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::Theme;

const PROMPT: &str = "> ";

/// Content, cursor and recall history of the input.
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    content: String,
    /// Cursor position in characters.
    cursor: usize,
    history: Vec<String>,
    /// Index into `history` counted from the newest entry.
    history_index: Option<usize>,
    /// Input saved when history browsing started.
    saved_input: String,
}

impl TextInputState {
    /// Create a new empty text input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Check if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Whether Up/Down currently walk the history.
    pub fn is_browsing_history(&self) -> bool {
        self.history_index.is_some()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Insert a character at the cursor.
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
        self.history_index = None;
    }

    /// Insert a string at the cursor.
    pub fn insert_str(&mut self, s: &str) {
        let at = self.byte_index(self.cursor);
        self.content.insert_str(at, s);
        self.cursor += s.chars().count();
        self.history_index = None;
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    /// Delete the character at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Record a sent message for recall.
    pub fn push_history(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        if entry.trim().is_empty() || self.history.last() == Some(&entry) {
            return;
        }
        self.history.push(entry);
    }

    /// Recall the previous (older) history entry.
    ///
    /// Returns `false` when there is nothing to recall.
    pub fn history_prev(&mut self) -> bool {
        if self.history.is_empty() {
            return false;
        }

        let next = match self.history_index {
            None => {
                self.saved_input = self.content.clone();
                0
            }
            Some(i) if i + 1 < self.history.len() => i + 1,
            Some(_) => return true,
        };
        self.show_history(next);
        true
    }

    /// Recall the next (newer) history entry, or the saved input.
    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                self.content = std::mem::take(&mut self.saved_input);
                self.cursor = self.char_len();
                self.history_index = None;
            }
            Some(i) => self.show_history(i - 1),
        }
    }

    fn show_history(&mut self, index: usize) {
        self.history_index = Some(index);
        self.content = self.history[self.history.len() - 1 - index].clone();
        self.cursor = self.char_len();
    }
}

impl InputField for TextInputState {
    fn value(&self) -> &str {
        &self.content
    }

    fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.history_index = None;
        self.saved_input.clear();
    }
}

/// Renders a [`TextInputState`] with a `> ` prompt and a cursor.
pub struct TextInput<'a> {
    state: &'a TextInputState,
    theme: &'a Theme,
    placeholder: &'a str,
    focused: bool,
}

impl<'a> TextInput<'a> {
    pub fn new(state: &'a TextInputState, theme: &'a Theme) -> Self {
        Self {
            state,
            theme,
            placeholder: "",
            focused: true,
        }
    }

    /// Text shown while the input is empty.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let prompt_style = Style::default().fg(self.theme.primary);
        let text_style = Style::default().fg(self.theme.text);

        if self.state.is_empty() {
            let mut spans = vec![Span::styled(PROMPT, prompt_style)];
            if self.focused {
                spans.push(Span::styled("_", text_style));
            }
            spans.push(Span::styled(
                self.placeholder,
                Style::default().fg(self.theme.muted),
            ));
            Paragraph::new(Line::from(spans)).render(area, buf);
            return;
        }

        let mut lines: Vec<Line<'_>> = Vec::new();
        let mut current = vec![Span::styled(PROMPT, prompt_style)];
        let mut cursor_drawn = false;

        for (i, ch) in self.state.content().chars().enumerate() {
            if self.focused && i == self.state.cursor() && !cursor_drawn {
                current.push(Span::styled("|", text_style));
                cursor_drawn = true;
            }
            if ch == '\n' {
                lines.push(Line::from(std::mem::take(&mut current)));
                current.push(Span::raw(" ".repeat(PROMPT.len())));
            } else {
                current.push(Span::styled(ch.to_string(), text_style));
            }
        }

        if self.focused && !cursor_drawn {
            current.push(Span::styled("_", text_style));
        }
        lines.push(Line::from(current));

        // Keep the line with the cursor visible
        let cursor_line = self
            .state
            .content()
            .chars()
            .take(self.state.cursor())
            .filter(|&c| c == '\n')
            .count();
        let scroll = cursor_line.saturating_sub(usize::from(area.height) - 1);
        let scroll = u16::try_from(scroll).unwrap_or(u16::MAX);

        Paragraph::new(lines).scroll((scroll, 0)).render(area, buf);
    }
}
