//! Key binding overlay.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::theme::Theme;

const BINDINGS: &[(&str, &str)] = &[
    ("Enter", "Send message"),
    ("Ctrl+J", "New line"),
    ("Up/Down", "Recall input / scroll"),
    ("PgUp/PgDn", "Scroll a page"),
    ("Ctrl+Home/End", "Oldest / latest message"),
    ("Ctrl+S", "Show or hide sources"),
    ("Ctrl+L", "Clear conversation"),
    ("? / F1", "Toggle this help"),
    ("Esc", "Close help / quit"),
    ("Ctrl+C", "Quit"),
];

/// Centered help box listing key bindings.
pub struct HelpOverlay<'a> {
    theme: &'a Theme,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for HelpOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        #[allow(clippy::cast_possible_truncation)]
        let height = (BINDINGS.len() as u16 + 2).min(area.height);
        let width = 44.min(area.width);
        let overlay = centered_fixed(width, height, area);

        Clear.render(overlay, buf);

        let key_style = Style::default()
            .fg(self.theme.primary)
            .add_modifier(Modifier::BOLD);
        let text_style = Style::default().fg(self.theme.text);
        let lines: Vec<Line<'_>> = BINDINGS
            .iter()
            .map(|(key, what)| {
                Line::from(vec![
                    Span::styled(format!(" {key:<14}"), key_style),
                    Span::styled(*what, text_style),
                ])
            })
            .collect();

        let block = Block::default()
            .title(" Help ")
            .title_style(Style::default().fg(self.theme.text))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused))
            .style(Style::default().bg(self.theme.surface));

        Paragraph::new(lines).block(block).render(overlay, buf);
    }
}

/// A rect of fixed size centered in `area`.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    #[test]
    fn test_centered_fixed() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(centered_fixed(40, 10, area), Rect::new(20, 7, 40, 10));
        assert_eq!(centered_fixed(100, 30, area), area);
    }

    #[test]
    fn test_help_lists_bindings() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 16);
        let mut buf = Buffer::empty(area);
        HelpOverlay::new(&theme).render(area, &mut buf);
        let screen = buffer_to_string(&buf);
        assert!(screen.contains("Help"));
        assert!(screen.contains("Ctrl+S"));
        assert!(screen.contains("Clear conversation"));
    }
}
