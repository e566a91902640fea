use ratatui::Frame;
use ratatui::layout::{Constraint, Margin, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{
    Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState, Table, TableState,
};
use stowage_core::candidate::Selectable;
use stowage_core::selector::{LoadStatus, PaginatedSelector};
use tui_input::Input;

use crate::theme;
use crate::ui::loading::LoadingState;

#[derive(Debug, Clone, Copy)]
pub(crate) struct TableColumn {
    pub(crate) title: &'static str,
    pub(crate) width: Constraint,
}

#[derive(Debug, Clone)]
pub(crate) struct SelectorTableRender<'a> {
    pub(crate) title: Line<'a>,
    pub(crate) empty_message: &'a str,
    pub(crate) columns: &'a [TableColumn],
    pub(crate) highlight_style: Style,
}

/// Single-line text box bound to a `tui_input::Input`, with the terminal
/// cursor placed inside it when focused.
pub(crate) fn render_input(
    frame: &mut Frame<'_>,
    area: Rect,
    input: &Input,
    title: Line<'_>,
    show_cursor: bool,
) {
    let width = area.width.saturating_sub(2) as usize;
    let scroll = input.visual_scroll(width);
    let paragraph = Paragraph::new(input.value())
        .scroll((0, scroll as u16))
        .block(theme::chrome(title));
    frame.render_widget(paragraph, area);

    if !show_cursor || width == 0 {
        return;
    }

    let visual = input.visual_cursor();
    let relative = visual.saturating_sub(scroll).min(width.saturating_sub(1));
    frame.set_cursor_position((area.x + 1 + relative as u16, area.y + 1));
}

/// Draws the rendered window of `selector`. Only rows already loaded into
/// the window are shown; the footer row reports how many remain.
pub(crate) fn render_selector<T, F>(
    frame: &mut Frame<'_>,
    area: Rect,
    selector: &PaginatedSelector<T>,
    render: SelectorTableRender<'_>,
    loading: &LoadingState,
    row_builder: F,
) where
    T: Selectable,
    F: Fn(&T, bool) -> Vec<String>,
{
    let placeholder = match selector.status() {
        LoadStatus::Loading => Some(format!("{} Loading...", loading.current_frame())),
        LoadStatus::Failed(message) => Some(format!("Failed to load: {message}\nPress r to retry.")),
        LoadStatus::Ready if selector.rendered_len() == 0 => {
            Some(render.empty_message.to_string())
        }
        LoadStatus::Ready => None,
    };

    if let Some(placeholder) = placeholder {
        let paragraph = Paragraph::new(placeholder).block(theme::chrome(render.title));
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(render.columns.iter().map(|column| column.title))
        .style(theme::table_header());
    let mut rows: Vec<Row<'_>> = selector
        .rendered()
        .map(|entry| Row::new(row_builder(entry, selector.is_selected(entry.id()))))
        .collect();
    if selector.has_more() {
        let remaining = selector.filtered_len() - selector.rendered_len();
        let label = if selector.page_load_in_flight() {
            format!("{} loading more", loading.current_frame())
        } else {
            format!("... {remaining} more")
        };
        rows.push(Row::new(vec![String::new(), label]).style(theme::muted()));
    }
    let widths: Vec<Constraint> = render.columns.iter().map(|column| column.width).collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(theme::chrome(render.title))
        .row_highlight_style(render.highlight_style)
        .highlight_symbol(">> ");

    let mut state = TableState::new();
    state.select(Some(selector.cursor()));
    frame.render_stateful_widget(table, area, &mut state);

    let viewport = area.height.saturating_sub(3) as usize;
    let mut scrollbar_state = ScrollbarState::new(selector.filtered_len())
        .position(selector.cursor())
        .viewport_content_length(viewport);
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None),
        area.inner(Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut scrollbar_state,
    );
}

pub(crate) fn check_mark(selected: bool) -> String {
    if selected { "[x]" } else { "[ ]" }.to_string()
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::style::Color;
    use stowage_core::candidate::CandidateEntity;

    use super::*;

    const COLUMNS: [TableColumn; 2] = [
        TableColumn {
            title: "",
            width: Constraint::Length(3),
        },
        TableColumn {
            title: "Name",
            width: Constraint::Min(10),
        },
    ];

    fn entity(id: &str, name: &str) -> CandidateEntity {
        CandidateEntity {
            id: id.to_string(),
            display_name: name.to_string(),
            class: None,
            class_type: None,
            packable: None,
            packing_status: false,
            single_packed: false,
            deployed: false,
        }
    }

    fn draw(selector: &PaginatedSelector<CandidateEntity>) -> String {
        let backend = TestBackend::new(40, 10);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|frame| {
                render_selector(
                    frame,
                    frame.area(),
                    selector,
                    SelectorTableRender {
                        title: Line::from("Items"),
                        empty_message: "Nothing here",
                        columns: &COLUMNS,
                        highlight_style: theme::table_highlight(Color::Cyan),
                    },
                    &LoadingState::default(),
                    |entity, selected| vec![check_mark(selected), entity.display_name.clone()],
                )
            })
            .expect("draw");
        format!("{}", terminal.backend())
    }

    #[test]
    fn failed_status_offers_retry() {
        let mut selector = PaginatedSelector::<CandidateEntity>::new(10);
        selector.mark_failed("timeout");

        let output = draw(&selector);
        assert!(output.contains("Failed to load: timeout"));
        assert!(output.contains("Press r to retry."));
    }

    #[test]
    fn ready_rows_show_selection_and_remaining_count() {
        let mut selector = PaginatedSelector::new(2);
        selector.set_candidates(vec![
            entity("a", "Lantern"),
            entity("b", "Tent"),
            entity("c", "Stove"),
        ]);
        selector.toggle_select("b");

        let output = draw(&selector);
        assert!(output.contains("[x]"));
        assert!(output.contains("Tent"));
        assert!(!output.contains("Stove"));
        assert!(output.contains("... 1 more"));
    }

    #[test]
    fn empty_ready_pool_shows_message() {
        let mut selector = PaginatedSelector::<CandidateEntity>::new(10);
        selector.set_candidates(Vec::new());
        assert!(draw(&selector).contains("Nothing here"));
    }
}
