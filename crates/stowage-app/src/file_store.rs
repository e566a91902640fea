use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow, bail};
use stowage_core::candidate::{CandidateEntity, StorageUnit};
use stowage_core::inventory::{load_inventory, now_utc_rfc3339, save_inventory};
use stowage_core::payload::SubmissionPayload;

use crate::ports::{
    CandidateSource, ItemFilters, PhotoRef, PhotoStore, Receipt, StorageFilters, SubmissionSink,
};

/// Candidate source and submission sink over one TOML inventory file.
pub struct FileInventory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileInventory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CandidateSource for FileInventory {
    fn fetch_items(&self, filters: &ItemFilters) -> Result<Vec<CandidateEntity>> {
        let inventory = load_inventory(&self.path)
            .with_context(|| format!("failed to load items from {}", self.path.display()))?;

        Ok(inventory
            .candidates()
            .into_iter()
            .filter(|item| filters.include_packed || !item.packing_status)
            .filter(|item| match &filters.class {
                Some(class) => item.class.as_deref() == Some(class.as_str()),
                None => true,
            })
            .collect())
    }

    fn fetch_storage(&self, filters: &StorageFilters) -> Result<Vec<StorageUnit>> {
        let inventory = load_inventory(&self.path)
            .with_context(|| format!("failed to load storage from {}", self.path.display()))?;

        Ok(inventory
            .storage
            .into_iter()
            .filter(|unit| filters.kind.is_none_or(|kind| unit.kind == kind))
            .collect())
    }
}

impl SubmissionSink for FileInventory {
    fn submit(&self, payload: &SubmissionPayload) -> Result<Receipt> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow!("inventory write lock poisoned"))?;

        let mut inventory = load_inventory(&self.path)
            .with_context(|| format!("failed to reload {}", self.path.display()))?;
        let recorded_at = now_utc_rfc3339()?;

        let applied = inventory
            .apply(payload, recorded_at.clone())
            .context("submission rejected")?;
        save_inventory(&self.path, &inventory)
            .with_context(|| format!("failed to write {}", self.path.display()))?;

        tracing::info!(
            path = %self.path.display(),
            summary = %applied.summary,
            "submission recorded"
        );

        Ok(Receipt {
            summary: applied.summary,
            storage_id: applied.storage_id,
            recorded_at,
        })
    }
}

/// Copies attached photos into a directory, prefixing the file name with a
/// counter so repeated uploads never overwrite each other.
pub struct DirPhotoStore {
    dir: PathBuf,
}

impl DirPhotoStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `photos/` next to the inventory file.
    pub fn beside(inventory_path: &Path) -> Self {
        let parent = inventory_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::new(parent.join("photos"))
    }
}

impl PhotoStore for DirPhotoStore {
    fn attach(&self, path: &Path) -> Result<PhotoRef> {
        if !path.is_file() {
            bail!("photo not found at {}", path.display());
        }
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            bail!("photo path has no file name: {}", path.display());
        };

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let mut counter = 1usize;
        let target = loop {
            let candidate = self.dir.join(format!("{counter:03}-{file_name}"));
            if !candidate.exists() {
                break candidate;
            }
            counter += 1;
        };

        fs::copy(path, &target).with_context(|| {
            format!(
                "failed to copy photo {} to {}",
                path.display(),
                target.display()
            )
        })?;

        tracing::debug!(target = %target.display(), "photo attached");
        Ok(PhotoRef { path: target })
    }
}
