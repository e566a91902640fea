use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Color;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use stowage_app::NoticeLevel;
use stowage_core::candidate::{CandidateEntity, StorageUnit};
use stowage_core::machine::{Phase, StepRenderer, WizardStepMachine};
use stowage_core::mode::{StepDefinition, StepKind, WizardMode};
use stowage_core::payload::assemble;
use stowage_core::state::LocationChoice;

use super::WizardFlow;
use crate::theme;
use crate::ui::modal::{ModalSpec, render_message_modal, render_modal};
use crate::ui::selector_table::{
    SelectorTableRender, TableColumn, check_mark, render_input, render_selector,
};
use crate::ui::text::{
    compact_hint, focus_line, key_hint_height, key_hint_paragraph, label_value_line, notice_line,
    wrapped_paragraph, yes_no,
};

const ITEM_COLUMNS: [TableColumn; 4] = [
    TableColumn {
        title: "",
        width: Constraint::Length(4),
    },
    TableColumn {
        title: "Name",
        width: Constraint::Percentage(45),
    },
    TableColumn {
        title: "Class",
        width: Constraint::Percentage(25),
    },
    TableColumn {
        title: "Id",
        width: Constraint::Percentage(25),
    },
];

const STORAGE_COLUMNS: [TableColumn; 4] = [
    TableColumn {
        title: "",
        width: Constraint::Length(4),
    },
    TableColumn {
        title: "Tote",
        width: Constraint::Percentage(45),
    },
    TableColumn {
        title: "Location",
        width: Constraint::Percentage(30),
    },
    TableColumn {
        title: "Items",
        width: Constraint::Length(6),
    },
];

/// Draws the active step's body; the machine picks which step that is.
struct BodyRenderer<'f, 'a> {
    frame: &'f mut Frame<'a>,
    area: Rect,
    flow: &'f WizardFlow,
}

impl StepRenderer for BodyRenderer<'_, '_> {
    fn render_step(&mut self, step: &StepDefinition, machine: &WizardStepMachine) {
        match step.kind {
            StepKind::ChooseMode => self.render_mode_chooser(),
            StepKind::SelectStorage => self.render_storage(machine),
            StepKind::SelectItems => self.render_items(machine, step),
            StepKind::Location => self.render_location(machine),
            StepKind::Photo => self.render_photo(machine),
            StepKind::Review => self.render_review(machine),
        }
    }
}

impl BodyRenderer<'_, '_> {
    fn render_mode_chooser(&mut self) {
        let items = WizardMode::CHOOSER_OPTIONS
            .iter()
            .map(|mode| ListItem::new(mode.title()))
            .collect::<Vec<_>>();
        let list = List::new(items)
            .block(theme::chrome("What are you doing?"))
            .highlight_style(theme::table_highlight(Color::Blue))
            .highlight_symbol(">> ");
        let mut state = ListState::default();
        state.select(Some(self.flow.mode_cursor));
        self.frame.render_stateful_widget(list, self.area, &mut state);
    }

    fn split_filter(&self) -> (Rect, Rect) {
        let [filter, table] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .areas(self.area);
        (filter, table)
    }

    fn filter_title(&self, label: &str) -> Line<'static> {
        if self.flow.filter_focused {
            focus_line(format!("{label} (typing)"))
        } else {
            Line::from(format!("{label} (Tab to type)"))
        }
    }

    fn render_storage(&mut self, machine: &WizardStepMachine) {
        let (filter_area, table_area) = self.split_filter();
        let filter_title = self.filter_title("Filter totes");
        render_input(
            self.frame,
            filter_area,
            &self.flow.storage_search,
            filter_title,
            self.flow.filter_focused,
        );

        let target = machine.state().selected_storage_target.as_deref();
        render_selector(
            self.frame,
            table_area,
            machine.storage(),
            SelectorTableRender {
                title: Line::from(format!("Totes ({})", machine.storage().filtered_len())),
                empty_message: "No totes match. Create one with --mode create-tote.",
                columns: &STORAGE_COLUMNS,
                highlight_style: theme::table_highlight(Color::Blue),
            },
            &self.flow.loading,
            |unit: &StorageUnit, _| {
                vec![
                    check_mark(target == Some(unit.id.as_str())),
                    unit.display_name.clone(),
                    unit.location.clone().unwrap_or_default(),
                    unit.item_ids.len().to_string(),
                ]
            },
        );
    }

    fn render_items(&mut self, machine: &WizardStepMachine, step: &StepDefinition) {
        let (filter_area, table_area) = self.split_filter();
        let filter_title = self.filter_title("Search items");
        render_input(
            self.frame,
            filter_area,
            &self.flow.item_search,
            filter_title,
            self.flow.filter_focused,
        );

        let items = machine.items();
        let mut title = format!(
            "{} ({} selected, {} shown)",
            step.label,
            items.selection().len(),
            items.filtered_len()
        );
        if let Some(class) = items.class_filter() {
            title.push_str(&format!(" class: {class}"));
        }

        render_selector(
            self.frame,
            table_area,
            items,
            SelectorTableRender {
                title: Line::from(title),
                empty_message: "No eligible items.",
                columns: &ITEM_COLUMNS,
                highlight_style: theme::table_highlight(Color::Green),
            },
            &self.flow.loading,
            |entity: &CandidateEntity, selected| {
                vec![
                    check_mark(selected),
                    entity.display_name.clone(),
                    entity.class.clone().unwrap_or_default(),
                    entity.id.clone(),
                ]
            },
        );
    }

    fn render_location(&mut self, machine: &WizardStepMachine) {
        let [list_area, input_area] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .areas(self.area);

        let mut rows = machine
            .location_presets()
            .iter()
            .map(|preset| ListItem::new(preset.clone()))
            .collect::<Vec<_>>();
        rows.push(ListItem::new("Custom..."));

        let list = List::new(rows)
            .block(theme::chrome("Location"))
            .highlight_style(theme::table_highlight(Color::Blue))
            .highlight_symbol(">> ");
        let mut state = ListState::default();
        state.select(Some(self.flow.location_cursor));
        self.frame.render_stateful_widget(list, list_area, &mut state);

        let on_custom = self.flow.on_custom_row();
        let title = format!(
            "Custom location ({}/{})",
            machine.state().custom_location.chars().count(),
            machine.state().custom_location_max
        );
        let title = if on_custom {
            focus_line(title)
        } else {
            Line::from(Span::styled(title, theme::muted()))
        };
        render_input(
            self.frame,
            input_area,
            &self.flow.custom_location,
            title,
            on_custom,
        );
    }

    fn render_photo(&mut self, machine: &WizardStepMachine) {
        let [info_area, input_area] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .areas(self.area);

        let state = machine.state();
        let status = if state.photo_pending {
            Line::from(Span::styled(
                format!("{} Uploading photo...", self.flow.loading.current_frame()),
                theme::pending_prompt(),
            ))
        } else if let Some(path) = &self.flow.attached_photo {
            Line::from(Span::styled(
                format!("Attached: {}", path.display()),
                theme::success_prompt(),
            ))
        } else {
            Line::from(Span::styled("No photo attached.", theme::muted()))
        };

        let text = Text::from(vec![
            Line::from("Type a photo path and press Enter to upload it."),
            Line::from("Press Enter with an empty path to skip."),
            Line::from(""),
            status,
        ]);
        self.frame.render_widget(
            wrapped_paragraph(text).block(theme::chrome("Photo (optional)")),
            info_area,
        );
        render_input(
            self.frame,
            input_area,
            &self.flow.photo_path,
            focus_line("Photo path"),
            true,
        );
    }

    fn render_review(&mut self, machine: &WizardStepMachine) {
        let state = machine.state();
        let mut lines = Vec::new();

        if let Some(mode) = machine.mode() {
            lines.push(label_value_line("Action", mode.title()));
        }
        if let Some(target) = &state.selected_storage_target {
            let name = machine
                .storage()
                .find(target)
                .map_or_else(|| target.clone(), |unit| unit.display_name.clone());
            lines.push(label_value_line("Tote", name));
        }

        let names = state
            .selected_entity_ids
            .iter()
            .map(|id| {
                machine
                    .items()
                    .find(id)
                    .map_or_else(|| id.clone(), |entity| entity.display_name.clone())
            })
            .collect::<Vec<_>>();
        lines.push(label_value_line(
            format!("Items ({})", names.len()),
            if names.is_empty() {
                "none".to_string()
            } else {
                names.join(", ")
            },
        ));

        if state.location_choice.is_some() {
            let location = match (&state.location_choice, state.resolved_location()) {
                (_, Some(location)) => location,
                (Some(LocationChoice::Custom), None) => "(custom, empty)".to_string(),
                _ => String::new(),
            };
            lines.push(label_value_line("Location", location));
        }
        if matches!(
            machine.mode(),
            Some(WizardMode::CreateTote | WizardMode::CreateSelf | WizardMode::ToteConfirm)
        ) {
            lines.push(label_value_line("Photo", yes_no(state.photo_attached)));
        }
        if machine.mode() == Some(WizardMode::TotePack) {
            lines.push(label_value_line("Mark as packed", yes_no(state.mark_final)));
        }

        lines.push(Line::from(""));
        if let Some(mode) = machine.mode() {
            match assemble(mode, state) {
                Ok(payload) => lines.push(focus_line(format!("Will submit: {}", payload.summary()))),
                Err(error) => lines.push(Line::from(Span::styled(
                    format!("Cannot submit: {error}"),
                    theme::error_prompt(),
                ))),
            }
        }

        self.frame.render_widget(
            wrapped_paragraph(Text::from(lines)).block(theme::chrome("Review")),
            self.area,
        );
    }
}

impl WizardFlow {
    pub(crate) fn render(&self, frame: &mut Frame<'_>) {
        let hint = self.key_hint(frame.area().width);
        let footer_height = key_hint_height(frame.area().width, hint);
        let [header_area, body_area, status_area, footer_area] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(6),
                Constraint::Length(3),
                Constraint::Length(footer_height),
            ])
            .areas(frame.area());

        self.render_header(frame, header_area);

        let mut body = BodyRenderer {
            frame: &mut *frame,
            area: body_area,
            flow: self,
        };
        self.machine.render(&mut body);

        self.render_status(frame, status_area);
        frame.render_widget(
            key_hint_paragraph(hint).block(theme::key_block()),
            footer_area,
        );

        self.render_overlay(frame);
    }

    fn render_header(&self, frame: &mut Frame<'_>, area: Rect) {
        let title = self
            .machine
            .mode()
            .map_or("Stowage", |mode| mode.title());
        let step = self.machine.active_step();

        let (heading, progress) = match self.machine.definition() {
            Some(definition) if self.machine.current_step_index() > 0 => {
                let heading = format!(
                    "Step {} of {}: {}",
                    self.machine.current_step_index(),
                    definition.len(),
                    step.label
                );
                let progress = definition
                    .steps()
                    .iter()
                    .enumerate()
                    .flat_map(|(position, candidate)| {
                        let style = if candidate.index == step.index {
                            theme::focus_prompt()
                        } else {
                            theme::muted()
                        };
                        let separator = if position == 0 { "" } else { " > " };
                        [
                            Span::styled(separator, theme::muted()),
                            Span::styled(candidate.label, style),
                        ]
                    })
                    .collect::<Vec<_>>();
                (heading, Line::from(progress))
            }
            _ => (step.label.to_string(), Line::from("")),
        };

        frame.render_widget(
            Paragraph::new(Text::from(vec![focus_line(heading), progress]))
                .block(theme::chrome(title)),
            area,
        );
    }

    fn render_status(&self, frame: &mut Frame<'_>, area: Rect) {
        let line = if let Some(message) = self.machine.message() {
            notice_line(NoticeLevel::Error, message)
        } else if let Some((level, message)) = &self.notice {
            notice_line(*level, message)
        } else {
            Line::from("")
        };
        frame.render_widget(
            wrapped_paragraph(line).block(theme::chrome("Status")),
            area,
        );
    }

    fn render_overlay(&self, frame: &mut Frame<'_>) {
        if let Some(prompt) = &self.cancel_prompt {
            render_modal(
                frame,
                ModalSpec {
                    title: "Cancel wizard?",
                    title_style: theme::error_prompt(),
                    body: Text::from(vec![
                        Line::from("Nothing will be submitted."),
                        Line::from(""),
                        label_value_line("Current selection", prompt.selected_label()),
                    ]),
                    key_hint: "y: cancel    n/Esc: keep going    Space: toggle    Enter: confirm",
                    width_pct: 60,
                    height_pct: 30,
                },
            );
            return;
        }

        match self.machine.phase() {
            Phase::Active => {}
            Phase::Submitting => render_message_modal(
                frame,
                "Submitting",
                theme::pending_prompt(),
                &format!("{} Saving to inventory...", self.loading.current_frame()),
                "Please wait",
            ),
            Phase::Completed => {
                let message = match &self.receipt {
                    Some(receipt) => format!(
                        "{}\nRecorded at {}",
                        receipt.summary, receipt.recorded_at
                    ),
                    None => "Submitted.".to_string(),
                };
                render_message_modal(
                    frame,
                    "Done",
                    theme::success_prompt(),
                    &message,
                    "Enter: close",
                );
            }
            Phase::Cancelled => {
                let message = self
                    .notice
                    .as_ref()
                    .map_or("Wizard cancelled.", |(_, message)| message.as_str());
                render_message_modal(
                    frame,
                    "Cancelled",
                    theme::muted(),
                    message,
                    "Enter: close",
                );
            }
        }
    }

    fn key_hint(&self, width: u16) -> &'static str {
        match self.machine.active_step().kind {
            StepKind::ChooseMode => compact_hint(
                width,
                "Up/Down: move    Enter: choose    q: cancel",
                "Up/Down: move    Enter: choose    q: cancel",
                "Up/Down | Enter choose | q cancel",
            ),
            StepKind::SelectStorage => compact_hint(
                width,
                "Up/Down: move    Enter: pick tote    Tab: filter    r: retry    Esc: back    q: cancel",
                "Up/Down    Enter: pick    Tab: filter    r: retry    Esc: back",
                "Enter pick | Tab filter | Esc back",
            ),
            StepKind::SelectItems => compact_hint(
                width,
                "Up/Down: move    Space: select    Tab: search    c: class    r: retry    Enter: next    Esc: back",
                "Space: select    Tab: search    c: class    Enter: next    Esc: back",
                "Space select | Tab search | Enter next",
            ),
            StepKind::Location => compact_hint(
                width,
                "Up/Down: move    Type on Custom to edit    Enter: next    Esc: back",
                "Up/Down    Type on Custom    Enter: next    Esc: back",
                "Up/Down | Enter next | Esc back",
            ),
            StepKind::Photo => compact_hint(
                width,
                "Type a path    Enter: upload or continue    Esc: back",
                "Type a path    Enter: upload/continue    Esc: back",
                "Enter upload/continue | Esc back",
            ),
            StepKind::Review => compact_hint(
                width,
                "Enter: submit    Space: toggle mark as packed    Esc: back    q: cancel",
                "Enter: submit    Space: mark packed    Esc: back",
                "Enter submit | Esc back",
            ),
        }
    }
}
