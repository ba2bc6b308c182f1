//! Wrapping for plain and styled text.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

/// Wrap plain text to `width` columns.
///
/// Newlines in the input are kept as line breaks; an empty input yields one
/// empty line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return text.lines().map(str::to_string).collect();
    }
    textwrap::wrap(text, width)
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect()
}

/// Wrap styled lines to `width` columns, keeping span styles.
pub fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return lines;
    }
    lines
        .into_iter()
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if line.width() <= width {
        return vec![line];
    }

    let styled: Vec<(char, Style)> = line
        .spans
        .iter()
        .flat_map(|span| span.content.chars().map(move |ch| (ch, span.style)))
        .collect();
    let plain: String = styled.iter().map(|(ch, _)| ch).collect();

    let mut result = Vec::new();
    let mut idx = 0;

    for wrapped in textwrap::wrap(&plain, width) {
        // Whitespace swallowed at the break point
        while let Some(&(ch, _)) = styled.get(idx) {
            if ch.is_whitespace() && !wrapped.starts_with(ch) {
                idx += 1;
            } else {
                break;
            }
        }

        let mut spans: Vec<Span<'static>> = Vec::new();
        let mut run = String::new();
        let mut run_style: Option<Style> = None;

        for expected in wrapped.chars() {
            let (ch, style) = styled.get(idx).copied().unwrap_or((expected, Style::default()));
            idx += 1;

            if let Some(previous) = run_style.filter(|s| *s != style) {
                spans.push(Span::styled(std::mem::take(&mut run), previous));
            }
            run_style = Some(style);
            run.push(ch);
        }

        if let Some(s) = run_style {
            spans.push(Span::styled(run, s));
        }
        if !spans.is_empty() {
            result.push(Line::from(spans));
        }
    }

    if result.is_empty() {
        result.push(Line::from(""));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_wrap_text_short() {
        assert_eq!(wrap_text("Hello", 10), vec!["Hello"]);
    }

    #[test]
    fn test_wrap_text_long() {
        let lines = wrap_text("Hello world this is a long line", 10);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.chars().count() <= 10);
        }
    }

    #[test]
    fn test_wrap_text_keeps_newlines() {
        assert_eq!(wrap_text("one\ntwo", 20), vec!["one", "two"]);
        assert_eq!(wrap_text("", 20), vec![""]);
    }

    #[test]
    fn test_wrap_line_short_untouched() {
        let line = Line::from(vec![
            Span::styled("Hello ", Style::default().fg(Color::Red)),
            Span::styled("world", Style::default().fg(Color::Blue)),
        ]);
        let wrapped = wrap_line(line, 100);
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].spans.len(), 2);
    }

    #[test]
    fn test_wrap_line_splits_and_keeps_styles() {
        let red = Style::default().fg(Color::Red);
        let blue = Style::default().fg(Color::Blue);
        let line = Line::from(vec![
            Span::styled("alpha beta ", red),
            Span::styled("gamma delta", blue),
        ]);

        let wrapped = wrap_line(line, 11);
        let texts: Vec<String> = wrapped.iter().map(text_of).collect();
        assert_eq!(texts, vec!["alpha beta", "gamma delta"]);
        assert_eq!(wrapped[0].spans[0].style, red);
        assert_eq!(wrapped[1].spans[0].style, blue);
    }

    #[test]
    fn test_wrap_line_unicode() {
        let line = Line::from(vec![
            Span::styled("Hello 🎉 ", Style::default().fg(Color::Red)),
            Span::styled("你好世界", Style::default().fg(Color::Blue)),
        ]);
        let wrapped = wrap_line(line, 10);
        let all: String = wrapped.iter().map(text_of).collect();
        assert!(all.contains("🎉"));
        assert!(all.contains("你好"));
    }

    #[test]
    fn test_wrap_lines_multiple() {
        let lines = vec![
            Line::from("Short line"),
            Line::from("This is a very long line that should definitely be wrapped to fit"),
        ];
        assert!(wrap_lines(lines, 20).len() > 2);
    }
}
