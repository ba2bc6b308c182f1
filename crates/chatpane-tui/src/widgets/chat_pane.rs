//! Chat pane widget.
//!
//! Draws the chat container from the viewport offset down, with the input
//! area at the bottom. When the children below the offset leave rows
//! empty, earlier children fill them.
//!
//! ```text
//! ┌ Chat ────────────────────────────────┐
//! │You                                   │
//! │  Hello                               │
//! │                                      │
//! │Assistant                             │
//! │  Hi there                            │
//! │  ▸ Sources (1)                       │
//! │                                      │
//! │──────────────────────────────────────│
//! │> _Type a message                     │
//! └──────────────────────────────────────┘
//! ```

use chatpane_engine::chat::Role;
use chatpane_engine::view::{ChatView, Class, Entry, MessageElement, Node, TypingIndicator};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    symbols::line,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::text::{render_markdown, truncate_to_width, wrap_lines, wrap_text, MarkdownStyles};
use crate::theme::Theme;
use crate::widgets::text_input::{TextInput, TextInputState};

/// Fixed height for the input area (in lines).
const INPUT_HEIGHT: u16 = 3;

/// Height for the divider line.
const DIVIDER_HEIGHT: u16 = 1;

/// Indent of message bodies under their header.
const BODY_INDENT: &str = "  ";

/// The chat transcript plus input.
pub struct ChatPane<'a> {
    view: &'a ChatView,
    input: &'a TextInputState,
    theme: &'a Theme,
    placeholder: &'a str,
    focused: bool,
}

impl<'a> ChatPane<'a> {
    pub fn new(view: &'a ChatView, input: &'a TextInputState, theme: &'a Theme) -> Self {
        Self {
            view,
            input,
            theme,
            placeholder: "",
            focused: true,
        }
    }

    /// Placeholder for the empty input.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Set whether the input has focus.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn render_transcript(&self, area: Rect, buf: &mut Buffer) {
        let container = self.view.container();
        if container.is_empty() {
            let hint = Line::from(Span::styled(
                "No messages yet.",
                Style::default().fg(self.theme.muted),
            ));
            Paragraph::new(hint).render(area, buf);
            return;
        }

        let width = usize::from(area.width);
        let height = usize::from(area.height);
        let frames = self.view.options().entry_frames;

        let offset = self.view.viewport().offset().min(container.len());
        let (above, below) = container.children().split_at(offset);

        let mut lines = Vec::new();
        for child in below {
            lines.extend(node_lines(&child.node, width, self.theme, frames));
            if lines.len() >= height {
                break;
            }
        }

        // Content cannot scroll past its end: fill leftover rows from above
        for child in above.iter().rev() {
            let needed = height.saturating_sub(lines.len());
            if needed == 0 {
                break;
            }
            let mut earlier = node_lines(&child.node, width, self.theme, frames);
            let skip = earlier.len().saturating_sub(needed);
            earlier.drain(..skip);
            earlier.append(&mut lines);
            lines = earlier;
        }

        Paragraph::new(lines).render(area, buf);
    }

    fn render_divider(&self, area: Rect, buf: &mut Buffer) {
        let divider = line::HORIZONTAL.repeat(usize::from(area.width));
        Paragraph::new(Line::from(Span::styled(
            divider,
            Style::default().fg(self.theme.border),
        )))
        .render(area, buf);
    }
}

impl Widget for ChatPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(self.theme.border_focused)
        } else {
            Style::default().fg(self.theme.border)
        };

        let block = Block::default()
            .title(" Chat ")
            .title_style(Style::default().fg(self.theme.text))
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(self.theme.base));

        let inner = block.inner(area);
        block.render(area, buf);

        let input = TextInput::new(self.input, self.theme)
            .placeholder(self.placeholder)
            .focused(self.focused);

        if inner.height < INPUT_HEIGHT + DIVIDER_HEIGHT + 1 {
            input.render(inner, buf);
            return;
        }

        let transcript_height = inner.height - INPUT_HEIGHT - DIVIDER_HEIGHT;
        let divider_y = inner.y + transcript_height;
        let input_y = divider_y + DIVIDER_HEIGHT;

        self.render_transcript(
            Rect::new(inner.x, inner.y, inner.width, transcript_height),
            buf,
        );
        self.render_divider(Rect::new(inner.x, divider_y, inner.width, DIVIDER_HEIGHT), buf);
        input.render(Rect::new(inner.x, input_y, inner.width, INPUT_HEIGHT), buf);
    }
}

/// Lines for one container child at the given width.
pub fn node_lines(
    node: &Node,
    width: usize,
    theme: &Theme,
    entry_frames: u8,
) -> Vec<Line<'static>> {
    match node {
        Node::Message(element) => message_lines(element, width, theme, entry_frames),
        Node::Typing(indicator) => typing_lines(indicator, theme),
    }
}

fn message_lines(
    element: &MessageElement,
    width: usize,
    theme: &Theme,
    entry_frames: u8,
) -> Vec<Line<'static>> {
    let shift = match element.entry() {
        Entry::Hidden => return Vec::new(),
        Entry::Entering { frame } => usize::from(entry_frames.saturating_sub(frame)),
        Entry::Visible => 0,
    };
    let body_width = width.saturating_sub(shift + BODY_INDENT.len()).max(1);
    let is_error = element.has_class(Class::Error);

    let (label, color) = match element.role() {
        Role::User => ("You", theme.user),
        Role::Assistant | Role::System => ("Assistant", theme.assistant),
    };
    let header_style = Style::default()
        .fg(if is_error { theme.error } else { color })
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![Line::from(Span::styled(label, header_style))];

    let body = if is_error || element.role() == Role::User {
        let style = Style::default().fg(if is_error { theme.error } else { theme.text });
        wrap_text(element.text(), body_width)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, style)))
            .collect()
    } else {
        let styles = MarkdownStyles::from_theme(theme);
        wrap_lines(render_markdown(element.text(), &styles), body_width)
    };
    lines.extend(body.into_iter().map(|l| indented(BODY_INDENT, l)));

    let citations = element.citations();
    if !citations.is_empty() {
        let marker = if element.sources_collapsed { "▸" } else { "▾" };
        lines.push(Line::from(Span::styled(
            format!("{BODY_INDENT}{marker} Sources ({})", citations.len()),
            Style::default().fg(theme.muted),
        )));
        if !element.sources_collapsed {
            for (i, citation) in citations.iter().enumerate() {
                let mut entry = format!("[{}] {}", i + 1, citation.source);
                if !citation.content.is_empty() {
                    entry.push_str(": ");
                    entry.push_str(&citation.content.replace('\n', " "));
                }
                let entry = truncate_to_width(&entry, body_width.saturating_sub(2));
                lines.push(Line::from(Span::styled(
                    format!("{BODY_INDENT}  {entry}"),
                    Style::default().fg(theme.subtext),
                )));
            }
        }
    }

    lines.push(Line::from(""));

    if shift == 0 {
        return lines;
    }
    let pad = " ".repeat(shift);
    lines
        .into_iter()
        .map(|line| {
            let muted = Line::from(
                line.spans
                    .into_iter()
                    .map(|span| span.style(Style::default().fg(theme.muted)))
                    .collect::<Vec<_>>(),
            );
            indented(&pad, muted)
        })
        .collect()
}

fn typing_lines(indicator: &TypingIndicator, theme: &Theme) -> Vec<Line<'static>> {
    let dots = ".".repeat(indicator.frame() % 4);
    vec![
        Line::from(Span::styled(
            format!("{} {dots}", indicator.label()),
            Style::default()
                .fg(theme.muted)
                .add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
    ]
}

fn indented(prefix: &str, line: Line<'static>) -> Line<'static> {
    let mut spans = Vec::with_capacity(line.spans.len() + 1);
    spans.push(Span::raw(prefix.to_string()));
    spans.extend(line.spans);
    Line::from(spans)
}
