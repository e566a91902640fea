mod keys;
mod render;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};

use stowage_app::{NoticeLevel, Notifier, Receipt};
use stowage_core::machine::{
    EventOutcome, MachineOptions, Phase, Transition, WizardHooks, WizardStepMachine,
};
use stowage_core::mode::{StepKind, WizardMode};
use stowage_core::payload::SubmissionPayload;
use stowage_core::selector::LoadStatus;
use stowage_core::state::LocationChoice;
use tui_input::Input;

use crate::ui::binary_choice::BinaryChoice;
use crate::ui::loading::{LoadingState, WizardLoadEvent, WizardLoader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardExit {
    Completed(Receipt),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FlowSignal {
    Continue,
    Exit(WizardExit),
}

/// Captures what the machine hands out on its terminal transitions.
#[derive(Default)]
struct CollectedHooks {
    payload: Option<SubmissionPayload>,
    cancelled: bool,
}

impl WizardHooks for CollectedHooks {
    fn on_complete(&mut self, payload: SubmissionPayload) {
        self.payload = Some(payload);
    }

    fn on_cancel(&mut self) {
        self.cancelled = true;
    }
}

pub(crate) struct WizardFlow {
    machine: WizardStepMachine,
    loader: Arc<dyn WizardLoader>,
    notifier: Box<dyn Notifier>,
    next_token: u64,
    items_token: Option<u64>,
    storage_token: Option<u64>,
    photo_token: Option<u64>,
    submit_token: Option<u64>,
    receivers: Vec<Receiver<WizardLoadEvent>>,
    loading: LoadingState,
    mode_cursor: usize,
    item_search: Input,
    storage_search: Input,
    filter_focused: bool,
    location_cursor: usize,
    custom_location: Input,
    photo_path: Input,
    attached_photo: Option<PathBuf>,
    cancel_prompt: Option<BinaryChoice>,
    receipt: Option<Receipt>,
    notice: Option<(NoticeLevel, String)>,
}

impl WizardFlow {
    /// Mounts the wizard and starts fetching the item pool and the totes.
    pub(crate) fn new(
        mode: Option<WizardMode>,
        options: MachineOptions,
        loader: Arc<dyn WizardLoader>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let mut flow = Self {
            machine: WizardStepMachine::new(mode, options),
            loader,
            notifier,
            next_token: 1,
            items_token: None,
            storage_token: None,
            photo_token: None,
            submit_token: None,
            receivers: Vec::new(),
            loading: LoadingState::default(),
            mode_cursor: 0,
            item_search: Input::default(),
            storage_search: Input::default(),
            filter_focused: false,
            location_cursor: 0,
            custom_location: Input::default(),
            photo_path: Input::default(),
            attached_photo: None,
            cancel_prompt: None,
            receipt: None,
            notice: None,
        };
        flow.request_items();
        flow.request_storage();
        flow
    }

    pub(crate) fn has_pending_work(&self) -> bool {
        !self.receivers.is_empty() || self.machine.items().page_load_in_flight()
    }

    fn issue_token(&mut self) -> u64 {
        let token = self.next_token;
        self.next_token = self.next_token.saturating_add(1);
        token
    }

    fn request_items(&mut self) {
        let token = self.issue_token();
        self.items_token = Some(token);
        self.receivers.push(self.loader.spawn_items(token));
    }

    fn request_storage(&mut self) {
        let token = self.issue_token();
        self.storage_token = Some(token);
        self.receivers.push(self.loader.spawn_storage(token));
    }

    fn retry_failed_list(&mut self, kind: StepKind) {
        match kind {
            StepKind::SelectItems
                if matches!(self.machine.items().status(), LoadStatus::Failed(_)) =>
            {
                if self.machine.retry_items() == EventOutcome::Applied {
                    self.request_items();
                }
            }
            StepKind::SelectStorage
                if matches!(self.machine.storage().status(), LoadStatus::Failed(_)) =>
            {
                if self.machine.retry_storage() == EventOutcome::Applied {
                    self.request_storage();
                }
            }
            _ => {}
        }
    }

    fn start_photo_upload(&mut self, path: PathBuf) {
        if self.machine.photo_upload_started() == EventOutcome::Ignored {
            return;
        }
        let token = self.issue_token();
        self.photo_token = Some(token);
        self.attached_photo = None;
        self.notify(
            NoticeLevel::Info,
            format!("Uploading photo {}", path.display()),
        );
        self.receivers.push(self.loader.spawn_photo(path, token));
    }

    fn advance(&mut self) {
        let mut hooks = CollectedHooks::default();
        let transition = self.machine.next(&mut hooks);
        tracing::debug!(?transition, "wizard next");

        match transition {
            Transition::Advanced { .. } => self.enter_step(),
            Transition::Submitted => {
                if let Some(payload) = hooks.payload {
                    self.submit(payload);
                }
            }
            _ => {}
        }
    }

    fn retreat(&mut self) {
        match self.machine.previous() {
            Transition::Retreated { .. } => self.enter_step(),
            Transition::Unavailable => self.cancel_prompt = Some(BinaryChoice::new(false)),
            _ => {}
        }
    }

    fn enter_step(&mut self) {
        self.filter_focused = false;
        if self.machine.active_step().kind == StepKind::Location {
            self.location_cursor = self.location_cursor_for_state();
        }
    }

    fn location_cursor_for_state(&self) -> usize {
        let presets = self.machine.location_presets();
        match &self.machine.state().location_choice {
            Some(LocationChoice::Preset(name)) => presets
                .iter()
                .position(|preset| preset == name)
                .unwrap_or(0),
            Some(LocationChoice::Custom) => presets.len(),
            None => 0,
        }
    }

    fn submit(&mut self, payload: SubmissionPayload) {
        let token = self.issue_token();
        self.submit_token = Some(token);
        self.notify(NoticeLevel::Info, format!("Submitting: {}", payload.summary()));
        self.receivers.push(self.loader.spawn_submit(payload, token));
    }

    fn cancel(&mut self) {
        let mut hooks = CollectedHooks::default();
        self.cancel_prompt = None;
        if self.machine.cancel(&mut hooks) != Transition::Cancelled {
            return;
        }

        self.items_token = None;
        self.storage_token = None;
        if hooks.cancelled {
            self.notify(NoticeLevel::Info, "Wizard cancelled; nothing was submitted");
        }
    }

    /// Ctrl-C from the run loop. An in-flight submission is waited out, since
    /// the sink may still commit it.
    pub(crate) fn abort(&mut self) -> FlowSignal {
        if self.machine.phase() == Phase::Submitting {
            self.notify(
                NoticeLevel::Info,
                "Submission in progress; waiting for the result before exiting",
            );
            return FlowSignal::Continue;
        }

        self.cancel();
        self.finished_exit()
            .map_or(FlowSignal::Continue, FlowSignal::Exit)
    }

    pub(crate) fn on_tick(&mut self) {
        self.loading.next_frame();

        if self.machine.items().page_load_in_flight() {
            self.machine.finish_item_page_load();
        }

        let mut events = Vec::<WizardLoadEvent>::new();
        self.receivers.retain(|receiver| loop {
            match receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break true,
                Err(TryRecvError::Disconnected) => break false,
            }
        });

        for event in events {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: WizardLoadEvent) {
        match event {
            WizardLoadEvent::Items { token, result } => {
                if Some(token) != self.items_token {
                    tracing::debug!(token, "dropping stale item fetch");
                    return;
                }
                self.items_token = None;
                if let Err(message) = &result {
                    self.notify(NoticeLevel::Error, format!("Failed to load items: {message}"));
                }
                self.machine.pool_loaded(result);
            }
            WizardLoadEvent::Storage { token, result } => {
                if Some(token) != self.storage_token {
                    tracing::debug!(token, "dropping stale storage fetch");
                    return;
                }
                self.storage_token = None;
                if let Err(message) = &result {
                    self.notify(NoticeLevel::Error, format!("Failed to load totes: {message}"));
                }
                self.machine.storage_loaded(result);
            }
            WizardLoadEvent::Photo { token, result } => {
                if Some(token) != self.photo_token {
                    return;
                }
                self.photo_token = None;
                let settled = result.as_ref().map(|_| ()).map_err(Clone::clone);

                if self.machine.photo_upload_finished(settled) == EventOutcome::Ignored {
                    let message = match &result {
                        Ok(photo) => format!(
                            "Photo {} finished uploading after the wizard closed",
                            photo.path.display()
                        ),
                        Err(message) => format!("Photo upload failed after the wizard closed: {message}"),
                    };
                    self.notify(NoticeLevel::Info, message);
                    return;
                }

                match result {
                    Ok(photo) => {
                        self.notify(
                            NoticeLevel::Success,
                            format!("Photo attached as {}", photo.path.display()),
                        );
                        self.attached_photo = Some(photo.path);
                        self.photo_path = Input::default();
                    }
                    Err(message) => {
                        self.notify(NoticeLevel::Error, format!("Photo upload failed: {message}"));
                    }
                }
            }
            WizardLoadEvent::Submitted { token, result } => {
                if Some(token) != self.submit_token {
                    return;
                }
                self.submit_token = None;

                match result {
                    Ok(receipt) => {
                        self.machine.settle_submission(Ok(()));
                        self.notify(NoticeLevel::Success, receipt.summary.clone());
                        self.receipt = Some(receipt);
                    }
                    Err(message) => {
                        self.notify(NoticeLevel::Error, format!("Submission failed: {message}"));
                        self.machine.settle_submission(Err(message));
                    }
                }
            }
        }
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        self.notifier.notify(level, &message);
        self.notice = Some((level, message));
    }

    fn finished_exit(&self) -> Option<WizardExit> {
        match self.machine.phase() {
            Phase::Completed => Some(
                self.receipt
                    .clone()
                    .map_or(WizardExit::Cancelled, WizardExit::Completed),
            ),
            Phase::Cancelled => Some(WizardExit::Cancelled),
            Phase::Active | Phase::Submitting => None,
        }
    }
}
