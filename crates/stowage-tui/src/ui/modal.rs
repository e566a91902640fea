use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Clear;

use crate::centered_rect;
use crate::theme;
use crate::ui::text::{key_hint_height, key_hint_paragraph, wrapped_paragraph};

pub(crate) struct ModalSpec<'a> {
    pub(crate) title: &'a str,
    pub(crate) title_style: Style,
    pub(crate) body: Text<'a>,
    pub(crate) key_hint: &'a str,
    pub(crate) width_pct: u16,
    pub(crate) height_pct: u16,
}

/// Draws a centered box over whatever is on screen, with its key hints
/// placed below it when there is room and inside it otherwise.
pub(crate) fn render_modal(frame: &mut Frame<'_>, spec: ModalSpec<'_>) {
    let area = centered_rect(spec.width_pct, spec.height_pct, frame.area());
    let title = Line::from(Span::styled(spec.title.to_string(), spec.title_style));
    let footer_height = key_hint_height(area.width, spec.key_hint);

    let (body_area, key_area) = match choose_key_area(frame.area(), area, footer_height) {
        Some(key_area) => (area, key_area),
        None => {
            let [inner_body, inner_key] = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(footer_height)])
                .areas(area);
            (inner_body, inner_key)
        }
    };

    frame.render_widget(Clear, body_area);
    frame.render_widget(
        wrapped_paragraph(spec.body).block(theme::chrome(title)),
        body_area,
    );
    frame.render_widget(Clear, key_area);
    frame.render_widget(
        key_hint_paragraph(spec.key_hint).block(theme::key_block()),
        key_area,
    );
}

pub(crate) fn render_message_modal(
    frame: &mut Frame<'_>,
    title: &str,
    title_style: Style,
    message: &str,
    footer: &str,
) {
    render_modal(
        frame,
        ModalSpec {
            title,
            title_style,
            body: text_from_message(message),
            key_hint: footer,
            width_pct: 70,
            height_pct: 40,
        },
    );
}

fn choose_key_area(screen: Rect, body: Rect, footer_height: u16) -> Option<Rect> {
    let screen_bottom = screen.y.saturating_add(screen.height);
    let below_y = body.y.saturating_add(body.height);
    if below_y.saturating_add(footer_height) <= screen_bottom {
        return Some(Rect::new(body.x, below_y, body.width, footer_height));
    }

    let above_y = body.y.saturating_sub(footer_height);
    if above_y >= screen.y {
        return Some(Rect::new(body.x, above_y, body.width, footer_height));
    }

    None
}

fn text_from_message(message: &str) -> Text<'static> {
    let base = message.trim_end();
    if base.is_empty() {
        return Text::from(vec![Line::from("")]);
    }
    Text::from(
        base.lines()
            .map(|line| Line::from(line.to_string()))
            .collect::<Vec<_>>(),
    )
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;

    use super::{choose_key_area, text_from_message};

    #[test]
    fn text_from_message_preserves_lines() {
        let text = text_from_message("packed\n3 items");
        assert_eq!(text.lines.len(), 2);
        assert_eq!(text.lines[1].spans[0].content.as_ref(), "3 items");
    }

    #[test]
    fn text_from_message_handles_empty_message() {
        let text = text_from_message("");
        assert_eq!(text.lines.len(), 1);
        assert!(text.lines[0].spans.is_empty());
    }

    #[test]
    fn key_area_goes_below_when_it_fits() {
        let screen = Rect::new(0, 0, 80, 30);
        let body = Rect::new(10, 5, 60, 10);
        assert_eq!(
            choose_key_area(screen, body, 3),
            Some(Rect::new(10, 15, 60, 3))
        );
    }

    #[test]
    fn key_area_is_none_without_room_outside() {
        let screen = Rect::new(10, 20, 80, 10);
        let body = Rect::new(15, 22, 60, 8);
        assert_eq!(choose_key_area(screen, body, 3), None);
    }
}
