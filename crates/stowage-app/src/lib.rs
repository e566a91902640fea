mod file_store;
mod pack;
pub mod ports;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use stowage_core::config::{StowageConfig, load_config_or_default, resolve_config_path};
use stowage_core::doctor::{DoctorReport, run_doctor};

pub use file_store::{DirPhotoStore, FileInventory};
pub use ports::{
    CandidateSource, ItemFilters, NoticeLevel, Notifier, PhotoRef, PhotoStore, Receipt,
    StorageFilters, SubmissionSink, TracingNotifier,
};

/// Facade over the external collaborators. Cheap to clone so worker threads
/// can take their own handle.
#[derive(Clone)]
pub struct App {
    pub source: Arc<dyn CandidateSource>,
    pub sink: Arc<dyn SubmissionSink>,
    pub photos: Arc<dyn PhotoStore>,
}

impl App {
    pub fn new(
        source: Arc<dyn CandidateSource>,
        sink: Arc<dyn SubmissionSink>,
        photos: Arc<dyn PhotoStore>,
    ) -> Self {
        Self {
            source,
            sink,
            photos,
        }
    }

    /// Wires a file inventory as both source and sink, with photos stored beside it.
    pub fn with_inventory(inventory_path: &Path) -> Self {
        let inventory = Arc::new(FileInventory::new(inventory_path));
        Self::new(
            inventory.clone(),
            inventory,
            Arc::new(DirPhotoStore::beside(inventory_path)),
        )
    }

    pub fn doctor(&self, inventory_path: &Path) -> Result<DoctorReport> {
        Ok(run_doctor(resolve_config_path(), inventory_path))
    }

    /// Fails with setup guidance when the inventory file is absent.
    pub fn ensure_inventory_ready(&self, inventory_path: &Path) -> Result<()> {
        if inventory_path.is_file() {
            return Ok(());
        }
        Err(anyhow!(
            "missing inventory at {}\nCreate it and retry. See README.md for the inventory format.",
            inventory_path.display()
        ))
    }

    /// Loads the user config, falling back to defaults when none exists.
    pub fn ensure_config_ready(&self) -> Result<StowageConfig> {
        let config_path = resolve_config_path().context("failed to resolve config path")?;

        load_config_or_default(&config_path).map_err(|error| {
            anyhow!(
                "invalid config at {}: {error}\nFix the config and retry. See README.md for setup instructions.",
                config_path.display()
            )
        })
    }
}
