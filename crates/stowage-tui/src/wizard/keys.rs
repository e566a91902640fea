use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEvent};
use stowage_core::machine::Phase;
use stowage_core::mode::{StepKind, WizardMode};
use stowage_core::state::LocationChoice;
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use super::{FlowSignal, WizardFlow};
use crate::keymap;
use crate::ui::binary_choice::{BinaryChoice, BinaryChoiceEvent};

impl WizardFlow {
    pub(crate) fn on_key(&mut self, key: KeyEvent) -> FlowSignal {
        match self.machine.phase() {
            Phase::Submitting => return FlowSignal::Continue,
            Phase::Completed | Phase::Cancelled => {
                if keymap::is_confirm(key) || keymap::is_back(key) || keymap::is_quit(key) {
                    if let Some(exit) = self.finished_exit() {
                        return FlowSignal::Exit(exit);
                    }
                }
                return FlowSignal::Continue;
            }
            Phase::Active => {}
        }

        if let Some(prompt) = self.cancel_prompt.as_mut() {
            match prompt.on_key(key) {
                BinaryChoiceEvent::ConfirmYes => self.cancel(),
                BinaryChoiceEvent::ConfirmNo | BinaryChoiceEvent::Back => {
                    self.cancel_prompt = None;
                }
                BinaryChoiceEvent::Continue => {}
            }
            return FlowSignal::Continue;
        }

        let kind = self.machine.active_step().kind;

        if keymap::is_back(key) {
            if self.filter_focused {
                self.filter_focused = false;
            } else {
                self.retreat();
            }
            return FlowSignal::Continue;
        }

        if keymap::is_quit(key) && !self.text_entry_active(kind) {
            self.cancel_prompt = Some(BinaryChoice::new(false));
            return FlowSignal::Continue;
        }

        match kind {
            StepKind::ChooseMode => self.on_choose_mode_key(key),
            StepKind::SelectStorage => self.on_storage_key(key),
            StepKind::SelectItems => self.on_items_key(key),
            StepKind::Location => self.on_location_key(key),
            StepKind::Photo => self.on_photo_key(key),
            StepKind::Review => self.on_review_key(key),
        }

        FlowSignal::Continue
    }

    pub(super) fn text_entry_active(&self, kind: StepKind) -> bool {
        match kind {
            StepKind::SelectStorage | StepKind::SelectItems => self.filter_focused,
            StepKind::Location => self.on_custom_row(),
            StepKind::Photo => true,
            StepKind::ChooseMode | StepKind::Review => false,
        }
    }

    pub(super) fn on_custom_row(&self) -> bool {
        self.location_cursor == self.machine.location_presets().len()
    }

    fn on_choose_mode_key(&mut self, key: KeyEvent) {
        let options = WizardMode::CHOOSER_OPTIONS;
        if keymap::is_up(key) {
            self.mode_cursor = self.mode_cursor.saturating_sub(1);
        } else if keymap::is_down(key) {
            self.mode_cursor = (self.mode_cursor + 1).min(options.len() - 1);
        } else if keymap::is_confirm(key) {
            if let Some(mode) = options.get(self.mode_cursor) {
                self.machine.choose_mode(*mode);
            }
            self.advance();
        }
    }

    fn on_storage_key(&mut self, key: KeyEvent) {
        if keymap::is_focus_switch(key) {
            self.filter_focused = !self.filter_focused;
            return;
        }

        if self.filter_focused {
            if keymap::is_confirm(key) {
                self.filter_focused = false;
                return;
            }
            if self.storage_search.handle_event(&Event::Key(key)).is_some() {
                let term = self.storage_search.value().to_string();
                self.machine.update_storage(|storage| storage.apply_search(&term));
            }
            return;
        }

        if keymap::is_up(key) {
            self.machine.update_storage(|storage| storage.move_up());
        } else if keymap::is_down(key) {
            self.machine.update_storage(|storage| {
                storage.move_down();
                if storage.at_last_rendered() && storage.has_more() {
                    storage.load_next_page();
                }
            });
        } else if keymap::is_retry(key) {
            self.retry_failed_list(StepKind::SelectStorage);
        } else if keymap::is_confirm(key) {
            self.machine.select_highlighted_storage();
            self.advance();
        }
    }

    fn on_items_key(&mut self, key: KeyEvent) {
        if keymap::is_focus_switch(key) {
            self.filter_focused = !self.filter_focused;
            return;
        }

        if self.filter_focused {
            if keymap::is_confirm(key) {
                self.filter_focused = false;
                return;
            }
            if self.item_search.handle_event(&Event::Key(key)).is_some() {
                let term = self.item_search.value().to_string();
                self.machine.apply_item_search(&term);
            }
            return;
        }

        if keymap::is_up(key) {
            self.machine.move_item_cursor(false);
        } else if keymap::is_down(key) {
            self.machine.move_item_cursor(true);
            let items = self.machine.items();
            if items.at_last_rendered() && items.has_more() {
                self.machine.begin_item_page_load();
            }
        } else if keymap::is_toggle(key) {
            self.machine.toggle_highlighted_item();
        } else if keymap::is_class_cycle(key) {
            self.cycle_class_filter();
        } else if keymap::is_retry(key) {
            self.retry_failed_list(StepKind::SelectItems);
        } else if keymap::is_confirm(key) {
            self.advance();
        }
    }

    fn cycle_class_filter(&mut self) {
        let classes = self.machine.items().classes();
        let next = match self.machine.items().class_filter() {
            None => classes.first().cloned(),
            Some(current) => classes
                .iter()
                .position(|class| class == current)
                .and_then(|index| classes.get(index + 1))
                .cloned(),
        };
        self.machine.apply_item_class_filter(next.as_deref());
    }

    fn on_location_key(&mut self, key: KeyEvent) {
        let rows = self.machine.location_presets().len() + 1;
        match key.code {
            KeyCode::Up => {
                self.location_cursor = self.location_cursor.saturating_sub(1);
                return;
            }
            KeyCode::Down => {
                self.location_cursor = (self.location_cursor + 1).min(rows - 1);
                return;
            }
            _ => {}
        }

        if keymap::is_confirm(key) {
            let choice = match self.machine.location_presets().get(self.location_cursor) {
                Some(preset) => LocationChoice::Preset(preset.clone()),
                None => LocationChoice::Custom,
            };
            self.machine.choose_location(choice);
            self.advance();
            return;
        }

        if self.on_custom_row() {
            if self.custom_location.handle_event(&Event::Key(key)).is_some() {
                let value = self.custom_location.value().to_string();
                self.machine.set_custom_location(&value);
                self.custom_location = Input::new(self.machine.state().custom_location.clone());
            }
        } else if keymap::is_up(key) {
            self.location_cursor = self.location_cursor.saturating_sub(1);
        } else if keymap::is_down(key) {
            self.location_cursor = (self.location_cursor + 1).min(rows - 1);
        }
    }

    fn on_photo_key(&mut self, key: KeyEvent) {
        if !keymap::is_confirm(key) {
            self.photo_path.handle_event(&Event::Key(key));
            return;
        }

        let path = self.photo_path.value().trim().to_string();
        if self.machine.state().photo_pending || path.is_empty() {
            self.advance();
            return;
        }
        self.start_photo_upload(PathBuf::from(path));
    }

    fn on_review_key(&mut self, key: KeyEvent) {
        if keymap::is_toggle(key) && self.machine.mode() == Some(WizardMode::TotePack) {
            self.machine.toggle_mark_final();
        } else if keymap::is_confirm(key) {
            self.advance();
        }
    }
}
