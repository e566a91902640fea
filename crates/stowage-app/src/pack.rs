use std::path::Path;

use anyhow::{Context, Result};
use stowage_core::candidate::{CandidateEntity, StorageKind, StorageUnit};
use stowage_core::payload::SubmissionPayload;

use crate::App;
use crate::ports::{ItemFilters, PhotoRef, Receipt, StorageFilters};

impl App {
    /// Unpacked items only; the wizard applies its eligibility rule on top.
    pub fn pack_fetch_items(&self) -> Result<Vec<CandidateEntity>> {
        let items = self
            .source
            .fetch_items(&ItemFilters::default())
            .context("failed to load items")?;
        tracing::debug!(count = items.len(), "items fetched");
        Ok(items)
    }

    pub fn pack_fetch_totes(&self) -> Result<Vec<StorageUnit>> {
        let totes = self
            .source
            .fetch_storage(&StorageFilters {
                kind: Some(StorageKind::Tote),
            })
            .context("failed to load totes")?;
        tracing::debug!(count = totes.len(), "totes fetched");
        Ok(totes)
    }

    pub fn pack_attach_photo(&self, path: &Path) -> Result<PhotoRef> {
        self.photos
            .attach(path)
            .with_context(|| format!("failed to attach photo {}", path.display()))
    }

    pub fn pack_submit(&self, payload: &SubmissionPayload) -> Result<Receipt> {
        tracing::info!(summary = %payload.summary(), "submitting");
        self.sink.submit(payload)
    }
}
