//! Markdown rendering using pulldown-cmark.
//!
//! Assistant replies are markdown; [`render_markdown`] turns them into
//! styled ratatui lines. Wrapping happens afterwards in [`super::wrap_lines`].

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::Style,
    text::{Line, Span},
};

use super::styles::MarkdownStyles;

/// Render markdown text to styled lines.
///
/// Trailing blank lines are dropped so a reply ends on its last content line.
pub fn render_markdown(input: &str, styles: &MarkdownStyles) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(input, options);
    let mut renderer = MarkdownRenderer::new(styles.clone());
    renderer.run(parser);

    let mut lines = renderer.lines;
    while lines.last().is_some_and(|l| l.width() == 0) {
        lines.pop();
    }
    lines
}

struct MarkdownRenderer {
    lines: Vec<Line<'static>>,
    styles: MarkdownStyles,
    /// Active inline styles, innermost last.
    style_stack: Vec<Style>,
    current_spans: Vec<Span<'static>>,
    /// Open lists; `Some(n)` is an ordered list at item `n`.
    lists: Vec<Option<u64>>,
    in_code_block: bool,
    in_blockquote: bool,
    pending_list_marker: Option<String>,
    task_checkbox: Option<bool>,
}

impl MarkdownRenderer {
    fn new(styles: MarkdownStyles) -> Self {
        Self {
            lines: Vec::new(),
            styles,
            style_stack: Vec::new(),
            current_spans: Vec::new(),
            lists: Vec::new(),
            in_code_block: false,
            in_blockquote: false,
            pending_list_marker: None,
            task_checkbox: None,
        }
    }

    fn run<'a>(&mut self, parser: impl Iterator<Item = Event<'a>>) {
        for event in parser {
            self.handle_event(event);
        }
        self.flush_line();
    }

    fn handle_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),

            Event::Text(text) => self.add_text(&text),
            Event::Code(code) => {
                self.take_list_marker();
                self.current_spans
                    .push(Span::styled(format!("`{code}`"), self.styles.code));
            }
            Event::SoftBreak => self.add_text(" "),
            Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_line();
                self.lines
                    .push(Line::from(Span::styled("───", self.styles.list_marker)));
            }
            Event::TaskListMarker(checked) => self.task_checkbox = Some(checked),

            // Raw HTML is shown as typed
            Event::Html(html) | Event::InlineHtml(html) => self.add_text(&html),
            Event::FootnoteReference(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_line();
                let style = self.heading_style(level);
                self.style_stack.push(style);
            }
            Tag::Emphasis => self.style_stack.push(self.styles.emphasis),
            Tag::Strong => self.style_stack.push(self.styles.strong),
            Tag::Strikethrough => self.style_stack.push(self.styles.strikethrough),
            Tag::Link { .. } => self.style_stack.push(self.styles.link),
            Tag::CodeBlock(_) => {
                self.flush_line();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                self.flush_line();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush_line();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.pending_list_marker = Some(marker);
            }
            Tag::BlockQuote => {
                self.flush_line();
                self.in_blockquote = true;
            }
            Tag::Paragraph
            | Tag::Image { .. }
            | Tag::Table(_)
            | Tag::TableHead
            | Tag::TableRow
            | Tag::TableCell
            | Tag::FootnoteDefinition(_)
            | Tag::MetadataBlock(_)
            | Tag::HtmlBlock => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.flush_line();
                self.style_stack.pop();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.style_stack.pop();
            }
            TagEnd::CodeBlock => {
                self.flush_line();
                self.in_code_block = false;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.lines.push(Line::from(""));
                }
            }
            TagEnd::Item => {
                self.flush_line();
                self.task_checkbox = None;
            }
            TagEnd::BlockQuote => {
                self.flush_line();
                self.in_blockquote = false;
            }
            TagEnd::Paragraph => {
                self.flush_line();
                // Paragraphs inside list items stay tight
                if self.lists.is_empty() {
                    self.lines.push(Line::from(""));
                }
            }
            TagEnd::TableCell => self.add_text(" "),
            TagEnd::TableRow | TagEnd::TableHead => self.flush_line(),
            TagEnd::Image
            | TagEnd::Table
            | TagEnd::FootnoteDefinition
            | TagEnd::MetadataBlock(_)
            | TagEnd::HtmlBlock => {}
        }
    }

    fn take_list_marker(&mut self) {
        if let Some(marker) = self.pending_list_marker.take() {
            self.current_spans
                .push(Span::styled(marker, self.styles.list_marker));
            if let Some(checked) = self.task_checkbox.take() {
                let checkbox = if checked { "[x] " } else { "[ ] " };
                self.current_spans
                    .push(Span::styled(checkbox, self.styles.list_marker));
            }
        }
    }

    fn add_text(&mut self, text: &str) {
        if self.in_code_block {
            for line in text.lines() {
                let indent = "  ".repeat(self.lists.len());
                self.current_spans.push(Span::styled(
                    format!("{indent}  {line}"),
                    self.styles.code_block,
                ));
                self.flush_line();
            }
            return;
        }

        self.take_list_marker();

        if self.in_blockquote && self.current_spans.is_empty() {
            self.current_spans
                .push(Span::styled("> ".to_string(), self.styles.blockquote));
        }

        let style = self.current_style();
        self.current_spans.push(Span::styled(text.to_string(), style));
    }

    fn current_style(&self) -> Style {
        let base = if self.in_blockquote {
            self.styles.blockquote
        } else {
            self.styles.text
        };
        self.style_stack.iter().fold(base, |style, s| style.patch(*s))
    }

    fn heading_style(&self, level: HeadingLevel) -> Style {
        match level {
            HeadingLevel::H1 => self.styles.h1,
            HeadingLevel::H2 => self.styles.h2,
            _ => self.styles.h3,
        }
    }

    fn flush_line(&mut self) {
        if !self.current_spans.is_empty() {
            let spans = std::mem::take(&mut self.current_spans);
            self.lines.push(Line::from(spans));
        }
    }
}
