use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};

use stowage_app::{App, PhotoRef, Receipt};
use stowage_core::candidate::{CandidateEntity, StorageUnit};
use stowage_core::payload::SubmissionPayload;

const FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

#[derive(Debug, Clone, Default)]
pub(crate) struct LoadingState {
    frame_index: usize,
}

impl LoadingState {
    pub(crate) fn next_frame(&mut self) {
        self.frame_index = (self.frame_index + 1) % FRAMES.len();
    }

    pub(crate) fn current_frame(&self) -> &'static str {
        FRAMES[self.frame_index]
    }
}

/// Result of one background request. `token` identifies the request that
/// produced it; results for superseded tokens are dropped by the flow.
#[derive(Debug)]
pub(crate) enum WizardLoadEvent {
    Items {
        token: u64,
        result: Result<Vec<CandidateEntity>, String>,
    },
    Storage {
        token: u64,
        result: Result<Vec<StorageUnit>, String>,
    },
    Photo {
        token: u64,
        result: Result<PhotoRef, String>,
    },
    Submitted {
        token: u64,
        result: Result<Receipt, String>,
    },
}

pub(crate) trait WizardLoader: Send + Sync {
    fn spawn_items(&self, token: u64) -> Receiver<WizardLoadEvent>;
    fn spawn_storage(&self, token: u64) -> Receiver<WizardLoadEvent>;
    fn spawn_photo(&self, path: PathBuf, token: u64) -> Receiver<WizardLoadEvent>;
    fn spawn_submit(&self, payload: SubmissionPayload, token: u64) -> Receiver<WizardLoadEvent>;
}

pub(crate) struct SystemWizardLoader {
    app: App,
}

impl SystemWizardLoader {
    pub(crate) fn new(app: App) -> Self {
        Self { app }
    }

    fn spawn<F>(&self, work: F) -> Receiver<WizardLoadEvent>
    where
        F: FnOnce(App) -> WizardLoadEvent + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let app = self.app.clone();
        std::thread::spawn(move || {
            let _ = sender.send(work(app));
        });
        receiver
    }
}

impl WizardLoader for SystemWizardLoader {
    fn spawn_items(&self, token: u64) -> Receiver<WizardLoadEvent> {
        self.spawn(move |app| WizardLoadEvent::Items {
            token,
            result: app.pack_fetch_items().map_err(|error| format!("{error:#}")),
        })
    }

    fn spawn_storage(&self, token: u64) -> Receiver<WizardLoadEvent> {
        self.spawn(move |app| WizardLoadEvent::Storage {
            token,
            result: app.pack_fetch_totes().map_err(|error| format!("{error:#}")),
        })
    }

    fn spawn_photo(&self, path: PathBuf, token: u64) -> Receiver<WizardLoadEvent> {
        self.spawn(move |app| WizardLoadEvent::Photo {
            token,
            result: app
                .pack_attach_photo(&path)
                .map_err(|error| format!("{error:#}")),
        })
    }

    fn spawn_submit(&self, payload: SubmissionPayload, token: u64) -> Receiver<WizardLoadEvent> {
        self.spawn(move |app| WizardLoadEvent::Submitted {
            token,
            result: app.pack_submit(&payload).map_err(|error| format!("{error:#}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Duration;

    use super::*;

    #[test]
    fn spinner_wraps_around() {
        let mut loading = LoadingState::default();
        let first = loading.current_frame();
        for _ in 0..FRAMES.len() {
            loading.next_frame();
        }
        assert_eq!(loading.current_frame(), first);
    }

    #[test]
    fn system_loader_reports_items_with_token() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("inventory.toml");
        fs::write(
            &path,
            "version = 1\n\n[[item]]\nid = \"itm-1\"\nname = \"Lantern\"\n",
        )
        .expect("write inventory");

        let loader = SystemWizardLoader::new(App::with_inventory(&path));
        let event = loader
            .spawn_items(7)
            .recv_timeout(Duration::from_secs(5))
            .expect("event");

        match event {
            WizardLoadEvent::Items { token, result } => {
                assert_eq!(token, 7);
                assert_eq!(result.expect("items").len(), 1);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn system_loader_reports_fetch_failures_as_text() {
        let temp = tempfile::tempdir().expect("temp dir");
        let loader = SystemWizardLoader::new(App::with_inventory(&temp.path().join("none.toml")));

        let event = loader
            .spawn_storage(1)
            .recv_timeout(Duration::from_secs(5))
            .expect("event");

        let WizardLoadEvent::Storage { result, .. } = event else {
            panic!("unexpected event");
        };
        assert!(result.expect_err("missing").contains("failed to load totes"));
    }
}
