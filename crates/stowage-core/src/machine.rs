use crate::candidate::{CandidateEntity, StorageUnit};
use crate::eligibility::eligible_pool;
use crate::mode::{CHOOSE_MODE_STEP, StepDefinition, WizardDefinition, WizardMode};
use crate::payload::{AssemblyError, SubmissionPayload, assemble};
use crate::selector::{DEFAULT_PAGE_SIZE, PageLoad, PaginatedSelector, ToggleOutcome};
use crate::state::{CUSTOM_LOCATION_MAX, LocationChoice, WizardState};
use crate::validation::ValidationError;

/// Terminal callbacks of a run. Once `on_complete` fires, `on_cancel` cannot
/// until the submission is settled as failed, which reopens the final step.
pub trait WizardHooks {
    fn on_complete(&mut self, payload: SubmissionPayload);
    fn on_cancel(&mut self);
}

/// Draws the body of the active step.
pub trait StepRenderer {
    fn render_step(&mut self, step: &StepDefinition, machine: &WizardStepMachine);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    /// `on_complete` fired; waiting for the caller to settle the submission.
    Submitting,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Advanced { to: usize },
    Retreated { to: usize },
    Invalid(ValidationError),
    Rejected(AssemblyError),
    Submitted,
    Completed,
    SubmissionFailed(String),
    Cancelled,
    /// `previous` on the first step.
    Unavailable,
    Busy,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Applied,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineOptions {
    pub page_size: usize,
    pub custom_location_max: usize,
    pub location_presets: Vec<String>,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            custom_location_max: CUSTOM_LOCATION_MAX,
            location_presets: vec![
                "Garage".to_string(),
                "Attic".to_string(),
                "Basement".to_string(),
            ],
        }
    }
}

/// Step state machine for one wizard run.
///
/// Steps are `1..=N` of the chosen mode's definition; index 0 exists only when
/// the run started without a mode. The item pool is a snapshot taken once at
/// mount and re-filtered through the mode's eligibility rule.
#[derive(Debug)]
pub struct WizardStepMachine {
    definition: Option<WizardDefinition>,
    current: usize,
    state: WizardState,
    phase: Phase,
    message: Option<String>,
    pool: Option<Vec<CandidateEntity>>,
    items: PaginatedSelector<CandidateEntity>,
    storage: PaginatedSelector<StorageUnit>,
    location_presets: Vec<String>,
}

impl WizardStepMachine {
    pub fn new(mode: Option<WizardMode>, options: MachineOptions) -> Self {
        let definition = mode.map(WizardMode::definition);
        let current = if definition.is_some() { 1 } else { 0 };

        Self {
            definition,
            current,
            state: WizardState::new(mode, options.custom_location_max),
            phase: Phase::Active,
            message: None,
            pool: None,
            items: PaginatedSelector::new(options.page_size),
            storage: PaginatedSelector::new(options.page_size),
            location_presets: options.location_presets,
        }
    }

    pub fn mode(&self) -> Option<WizardMode> {
        self.definition.map(|definition| definition.mode)
    }

    pub fn definition(&self) -> Option<&WizardDefinition> {
        self.definition.as_ref()
    }

    pub fn current_step_index(&self) -> usize {
        self.current
    }

    pub fn step_count(&self) -> usize {
        self.definition.map_or(0, |definition| definition.len())
    }

    pub fn active_step(&self) -> &'static StepDefinition {
        if self.current == 0 {
            return &CHOOSE_MODE_STEP;
        }
        self.definition
            .and_then(|definition| definition.step(self.current))
            .unwrap_or(&CHOOSE_MODE_STEP)
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Completed | Phase::Cancelled)
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn items(&self) -> &PaginatedSelector<CandidateEntity> {
        &self.items
    }

    pub fn storage(&self) -> &PaginatedSelector<StorageUnit> {
        &self.storage
    }

    pub fn location_presets(&self) -> &[String] {
        &self.location_presets
    }

    pub fn can_go_back(&self) -> bool {
        self.phase == Phase::Active && self.current > 1
    }

    pub fn render(&self, renderer: &mut dyn StepRenderer) {
        renderer.render_step(self.active_step(), self);
    }

    pub fn next(&mut self, hooks: &mut dyn WizardHooks) -> Transition {
        if let Some(blocked) = self.blocked() {
            return blocked;
        }

        if self.current == 0 {
            return self.leave_mode_chooser();
        }

        let Some(definition) = self.definition else {
            return Transition::Invalid(ValidationError::ModeRequired);
        };
        let step = self.active_step();

        if let Err(error) = step.validate(&self.state) {
            tracing::debug!(step = step.index, %error, "step validation failed");
            self.message = Some(error.to_string());
            return Transition::Invalid(error);
        }
        self.message = None;

        if self.current < definition.len() {
            self.current += 1;
            tracing::debug!(mode = %definition.mode, to = self.current, "advanced wizard step");
            return Transition::Advanced { to: self.current };
        }

        match assemble(definition.mode, &self.state) {
            Ok(payload) => {
                self.phase = Phase::Submitting;
                tracing::debug!(mode = %definition.mode, "wizard assembled submission");
                hooks.on_complete(payload);
                Transition::Submitted
            }
            Err(error) => {
                self.message = Some(error.to_string());
                Transition::Rejected(error)
            }
        }
    }

    pub fn previous(&mut self) -> Transition {
        if let Some(blocked) = self.blocked() {
            return blocked;
        }
        if self.current <= 1 {
            return Transition::Unavailable;
        }

        self.current -= 1;
        self.message = None;
        Transition::Retreated { to: self.current }
    }

    /// Refused while a submission is in flight: `on_complete` already fired.
    pub fn cancel(&mut self, hooks: &mut dyn WizardHooks) -> Transition {
        if let Some(blocked) = self.blocked() {
            return blocked;
        }

        self.phase = Phase::Cancelled;
        tracing::debug!(step = self.current, "wizard cancelled");
        hooks.on_cancel();
        Transition::Cancelled
    }

    /// Reports the outcome of the caller's network write. A failure returns
    /// the run to its final step so the user can resubmit.
    pub fn settle_submission(&mut self, result: Result<(), String>) -> Transition {
        if self.phase != Phase::Submitting {
            return Transition::Finished;
        }

        match result {
            Ok(()) => {
                self.phase = Phase::Completed;
                Transition::Completed
            }
            Err(message) => {
                self.phase = Phase::Active;
                self.message = Some(message.clone());
                Transition::SubmissionFailed(message)
            }
        }
    }

    pub fn choose_mode(&mut self, mode: WizardMode) -> EventOutcome {
        if self.phase != Phase::Active || self.current != 0 {
            return EventOutcome::Ignored;
        }
        self.state.mode = Some(mode);
        self.message = None;
        EventOutcome::Applied
    }

    pub fn pool_loaded(&mut self, result: Result<Vec<CandidateEntity>, String>) -> EventOutcome {
        if self.is_terminal() {
            return EventOutcome::Ignored;
        }

        match result {
            Ok(pool) => {
                tracing::debug!(count = pool.len(), "item pool loaded");
                self.pool = Some(pool);
                self.refresh_eligible_items();
            }
            Err(message) => self.items.mark_failed(message),
        }
        EventOutcome::Applied
    }

    pub fn storage_loaded(&mut self, result: Result<Vec<StorageUnit>, String>) -> EventOutcome {
        if self.is_terminal() {
            return EventOutcome::Ignored;
        }

        match result {
            Ok(units) => {
                let totes = units.into_iter().filter(StorageUnit::is_tote).collect();
                self.storage.set_candidates(totes);
                if let Some(target) = &self.state.selected_storage_target
                    && self.storage.find(target).is_none()
                {
                    self.state.selected_storage_target = None;
                }
            }
            Err(message) => self.storage.mark_failed(message),
        }
        EventOutcome::Applied
    }

    pub fn retry_items(&mut self) -> EventOutcome {
        if self.is_terminal() {
            return EventOutcome::Ignored;
        }
        self.items.mark_loading();
        EventOutcome::Applied
    }

    pub fn retry_storage(&mut self) -> EventOutcome {
        if self.is_terminal() {
            return EventOutcome::Ignored;
        }
        self.storage.mark_loading();
        EventOutcome::Applied
    }

    pub fn toggle_item(&mut self, id: &str) -> ToggleOutcome {
        self.update_items(|items| items.toggle_select(id))
            .unwrap_or(ToggleOutcome::Ignored)
    }

    pub fn toggle_highlighted_item(&mut self) -> ToggleOutcome {
        self.update_items(PaginatedSelector::toggle_highlighted)
            .unwrap_or(ToggleOutcome::Ignored)
    }

    pub fn apply_item_search(&mut self, term: &str) -> EventOutcome {
        self.update_items(|items| items.apply_search(term))
            .map_or(EventOutcome::Ignored, |_| EventOutcome::Applied)
    }

    pub fn apply_item_class_filter(&mut self, class: Option<&str>) -> EventOutcome {
        self.update_items(|items| items.apply_class_filter(class))
            .map_or(EventOutcome::Ignored, |_| EventOutcome::Applied)
    }

    pub fn begin_item_page_load(&mut self) -> PageLoad {
        self.update_items(PaginatedSelector::begin_page_load)
            .unwrap_or(PageLoad::InFlight)
    }

    pub fn finish_item_page_load(&mut self) -> PageLoad {
        self.update_items(PaginatedSelector::finish_page_load)
            .unwrap_or(PageLoad::Exhausted)
    }

    pub fn load_next_item_page(&mut self) -> PageLoad {
        self.update_items(PaginatedSelector::load_next_page)
            .unwrap_or(PageLoad::InFlight)
    }

    pub fn move_item_cursor(&mut self, down: bool) {
        let _ = self.update_items(|items| {
            if down {
                items.move_down();
            } else {
                items.move_up();
            }
        });
    }

    /// Search, paging and cursor movement over the tote list.
    pub fn update_storage<R>(
        &mut self,
        update: impl FnOnce(&mut PaginatedSelector<StorageUnit>) -> R,
    ) -> Option<R> {
        if self.phase != Phase::Active {
            return None;
        }
        Some(update(&mut self.storage))
    }

    pub fn select_storage(&mut self, id: &str) -> EventOutcome {
        if self.phase != Phase::Active || self.storage.find(id).is_none() {
            tracing::warn!(id, "ignoring unknown storage target");
            return EventOutcome::Ignored;
        }
        self.state.selected_storage_target = Some(id.to_string());
        self.message = None;
        EventOutcome::Applied
    }

    pub fn select_highlighted_storage(&mut self) -> EventOutcome {
        let Some(id) = self.storage.highlighted().map(|unit| unit.id.clone()) else {
            return EventOutcome::Ignored;
        };
        self.select_storage(&id)
    }

    pub fn choose_location(&mut self, choice: LocationChoice) -> EventOutcome {
        if self.phase != Phase::Active {
            return EventOutcome::Ignored;
        }
        self.state.location_choice = Some(choice);
        self.message = None;
        EventOutcome::Applied
    }

    pub fn set_custom_location(&mut self, value: &str) -> EventOutcome {
        if self.phase != Phase::Active {
            return EventOutcome::Ignored;
        }
        self.state.set_custom_location(value);
        EventOutcome::Applied
    }

    pub fn toggle_mark_final(&mut self) -> EventOutcome {
        if self.phase != Phase::Active {
            return EventOutcome::Ignored;
        }
        self.state.mark_final = !self.state.mark_final;
        EventOutcome::Applied
    }

    pub fn photo_upload_started(&mut self) -> EventOutcome {
        if self.phase != Phase::Active {
            return EventOutcome::Ignored;
        }
        self.state.photo_pending = true;
        self.state.photo_attached = false;
        EventOutcome::Applied
    }

    /// Upload results may arrive after the run ended; those leave the state untouched.
    pub fn photo_upload_finished(&mut self, result: Result<(), String>) -> EventOutcome {
        if self.is_terminal() {
            tracing::debug!("dropping photo upload result for a finished wizard");
            return EventOutcome::Ignored;
        }

        self.state.photo_pending = false;
        match result {
            Ok(()) => {
                self.state.photo_attached = true;
                self.message = None;
            }
            Err(message) => {
                self.state.photo_attached = false;
                self.message = Some(message);
            }
        }
        EventOutcome::Applied
    }

    fn blocked(&self) -> Option<Transition> {
        match self.phase {
            Phase::Active => None,
            Phase::Submitting => Some(Transition::Busy),
            Phase::Completed | Phase::Cancelled => Some(Transition::Finished),
        }
    }

    fn leave_mode_chooser(&mut self) -> Transition {
        if let Err(error) = CHOOSE_MODE_STEP.validate(&self.state) {
            self.message = Some(error.to_string());
            return Transition::Invalid(error);
        }
        let Some(mode) = self.state.mode else {
            return Transition::Invalid(ValidationError::ModeRequired);
        };

        self.definition = Some(mode.definition());
        self.current = 1;
        self.message = None;
        self.refresh_eligible_items();
        tracing::debug!(%mode, "mode chosen");
        Transition::Advanced { to: 1 }
    }

    fn refresh_eligible_items(&mut self) {
        let (Some(pool), Some(definition)) = (&self.pool, self.definition) else {
            return;
        };
        let eligible = eligible_pool(definition.rule, pool);
        self.items.set_candidates(eligible);
        self.sync_selection();
    }

    fn update_items<R>(
        &mut self,
        update: impl FnOnce(&mut PaginatedSelector<CandidateEntity>) -> R,
    ) -> Option<R> {
        if self.phase != Phase::Active {
            return None;
        }
        let result = update(&mut self.items);
        self.sync_selection();
        Some(result)
    }

    fn sync_selection(&mut self) {
        self.state.selected_entity_ids = self.items.selection().to_vec();
    }
}
