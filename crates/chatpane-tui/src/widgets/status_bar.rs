//! Status bar widget for the top of the TUI.
//!
//! Format: `● Phase │ responder │ N messages │ → hint`

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::text::truncate_to_width;
use crate::theme::Theme;

/// Status bar content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBarContent {
    /// Whether a reply is awaited.
    pub pending: bool,
    /// Responder name.
    pub responder: String,
    /// Messages in the conversation.
    pub message_count: usize,
    /// Next action hint.
    pub hint: Option<String>,
    /// Transient notice (replaces the hint while shown).
    pub notification: Option<String>,
}

impl StatusBarContent {
    fn phase(&self) -> &'static str {
        if self.pending {
            "Waiting"
        } else {
            "Ready"
        }
    }
}

/// Status bar widget.
pub struct StatusBar<'a> {
    content: &'a StatusBarContent,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar widget.
    pub fn new(content: &'a StatusBarContent, theme: &'a Theme) -> Self {
        Self { content, theme }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let sep = || Span::styled(" │ ", Style::default().fg(self.theme.muted));
        let dot_color = if self.content.pending {
            self.theme.warning
        } else {
            self.theme.success
        };

        let count = match self.content.message_count {
            1 => "1 message".to_string(),
            n => format!("{n} messages"),
        };

        let mut spans = vec![
            Span::styled("● ", Style::default().fg(dot_color)),
            Span::styled(self.content.phase(), Style::default().fg(self.theme.text)),
            sep(),
            Span::styled(
                self.content.responder.clone(),
                Style::default().fg(self.theme.subtext),
            ),
            sep(),
            Span::styled(count, Style::default().fg(self.theme.info)),
        ];

        if let Some(ref notice) = self.content.notification {
            spans.push(sep());
            spans.push(Span::styled(
                notice.clone(),
                Style::default().fg(self.theme.warning),
            ));
        } else if let Some(ref hint) = self.content.hint {
            spans.push(sep());
            spans.push(Span::styled(
                format!("→ {hint}"),
                Style::default().fg(self.theme.secondary),
            ));
        }

        // Drop trailing spans that do not fit
        let width = usize::from(area.width);
        let mut used = 0;
        let mut fitted = Vec::with_capacity(spans.len());
        for span in spans {
            let w = span.width();
            if used + w > width {
                let rest = truncate_to_width(&span.content, width - used);
                if !rest.is_empty() {
                    fitted.push(Span::styled(rest, span.style));
                }
                break;
            }
            used += w;
            fitted.push(span);
        }

        Paragraph::new(Line::from(fitted))
            .style(Style::default().bg(self.theme.surface))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    fn render(content: &StatusBarContent, width: u16) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new(content, &theme).render(area, &mut buf);
        buffer_to_string(&buf)
    }

    #[test]
    fn test_ready_with_hint() {
        let content = StatusBarContent {
            pending: false,
            responder: "echo".into(),
            message_count: 1,
            hint: Some("Enter to send".into()),
            notification: None,
        };
        assert_eq!(
            render(&content, 80),
            "● Ready │ echo │ 1 message │ → Enter to send"
        );
    }

    #[test]
    fn test_notification_replaces_hint() {
        let content = StatusBarContent {
            pending: true,
            responder: "llm".into(),
            message_count: 4,
            hint: Some("hidden".into()),
            notification: Some("Still waiting for a reply".into()),
        };
        let line = render(&content, 80);
        assert!(line.starts_with("● Waiting │ llm │ 4 messages"));
        assert!(line.ends_with("Still waiting for a reply"));
        assert!(!line.contains("hidden"));
    }

    #[test]
    fn test_narrow_truncates() {
        let content = StatusBarContent {
            responder: "a-very-long-responder-name".into(),
            ..StatusBarContent::default()
        };
        let line = render(&content, 20);
        assert_eq!(line, "● Ready │ a-very-lo…");
    }
}
