use ratatui::layout::Alignment;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Wrap};
use stowage_app::NoticeLevel;

use crate::theme;

pub(crate) fn wrapped_paragraph<'a, T>(text: T) -> Paragraph<'a>
where
    T: Into<Text<'a>>,
{
    Paragraph::new(text).wrap(Wrap { trim: false })
}

pub(crate) fn key_hint_paragraph<'a, T>(text: T) -> Paragraph<'a>
where
    T: Into<Text<'a>>,
{
    wrapped_paragraph(text).alignment(Alignment::Center)
}

pub(crate) fn key_hint_height(total_width: u16, text: &str) -> u16 {
    let content_width = total_width.saturating_sub(2).max(1) as usize;
    let lines = wrapped_line_count(text, content_width);
    lines.saturating_add(2).max(3)
}

pub(crate) fn compact_hint<'a>(
    width: u16,
    full: &'a str,
    medium: &'a str,
    compact: &'a str,
) -> &'a str {
    if width >= 110 {
        full
    } else if width >= 78 {
        medium
    } else {
        compact
    }
}

pub(crate) fn focus_line(message: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(message.into(), theme::focus_prompt()))
}

pub(crate) fn label_value_line(
    label: impl Into<String>,
    value: impl Into<String>,
) -> Line<'static> {
    let label = label.into();
    let value = value.into();
    Line::from(vec![
        Span::styled(format!("{label}: "), theme::muted()),
        Span::raw(value),
    ])
}

pub(crate) fn notice_line(level: NoticeLevel, message: &str) -> Line<'static> {
    let style = match level {
        NoticeLevel::Success => theme::success_prompt(),
        NoticeLevel::Error => theme::error_prompt(),
        NoticeLevel::Info => theme::pending_prompt(),
    };
    Line::from(Span::styled(message.to_string(), style))
}

pub(crate) fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

fn wrapped_line_count(text: &str, width: usize) -> u16 {
    text.split('\n')
        .map(|line| wrapped_line_count_single(line, width))
        .fold(0u16, u16::saturating_add)
        .max(1)
}

fn wrapped_line_count_single(line: &str, width: usize) -> u16 {
    let chars = line.chars().count();
    if chars == 0 || width == 0 {
        return 1;
    }
    u16::try_from(chars.div_ceil(width)).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use ratatui::style::{Color, Modifier};

    use super::*;

    #[test]
    fn compact_hint_selects_variant_by_width() {
        assert_eq!(compact_hint(120, "full", "medium", "compact"), "full");
        assert_eq!(compact_hint(90, "full", "medium", "compact"), "medium");
        assert_eq!(compact_hint(60, "full", "medium", "compact"), "compact");
    }

    #[test]
    fn key_hint_height_grows_when_hint_wraps() {
        assert_eq!(key_hint_height(80, "Enter: next    Esc: back"), 3);
        assert!(key_hint_height(20, "Enter: next    Space: toggle    Esc: back") > 3);
    }

    #[test]
    fn focus_line_uses_blue_bold_style() {
        let line = focus_line("choose a tote");
        assert_eq!(line.spans[0].content.as_ref(), "choose a tote");
        assert_eq!(line.spans[0].style.fg, Some(Color::Blue));
        assert!(line.spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn label_value_line_formats_with_colon() {
        let line = label_value_line("Location", "Garage");
        assert_eq!(line.spans[0].content.as_ref(), "Location: ");
        assert_eq!(line.spans[1].content.as_ref(), "Garage");
    }

    #[test]
    fn error_notices_are_red() {
        let line = notice_line(NoticeLevel::Error, "nope");
        assert_eq!(line.spans[0].style.fg, Some(Color::Red));
    }

    #[test]
    fn line_count_rounds_up_per_line() {
        assert_eq!(wrapped_line_count_single("abcd", 3), 2);
        assert_eq!(wrapped_line_count_single("", 3), 1);
        assert_eq!(wrapped_line_count("ab\ncd", 5), 2);
    }

    #[test]
    fn yes_no_maps_boolean_values() {
        assert_eq!(yes_no(true), "Yes");
        assert_eq!(yes_no(false), "No");
    }
}
