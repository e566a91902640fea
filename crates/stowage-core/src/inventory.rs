use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::candidate::{CandidateEntity, StorageKind, StorageUnit};
use crate::eligibility::EligibilityRule;
use crate::payload::SubmissionPayload;

const INVENTORY_VERSION: i64 = 1;

/// An item as stored on disk: the candidate projection plus where it lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packable: Option<bool>,
    #[serde(default)]
    pub packed: bool,
    #[serde(default)]
    pub single_packed: bool,
    #[serde(default)]
    pub deployed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_id: Option<String>,
}

impl InventoryItem {
    pub fn to_candidate(&self) -> CandidateEntity {
        CandidateEntity {
            id: self.id.clone(),
            display_name: self.name.clone(),
            class: self.class.clone(),
            class_type: self.class_type.clone(),
            packable: self.packable,
            packing_status: self.packed,
            single_packed: self.single_packed,
            deployed: self.deployed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub recorded_at: String,
    pub action: String,
    pub summary: String,
    pub item_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryFile {
    pub version: i64,
    #[serde(default, rename = "item")]
    pub items: Vec<InventoryItem>,
    #[serde(default, rename = "storage")]
    pub storage: Vec<StorageUnit>,
    #[serde(default, rename = "submission")]
    pub submissions: Vec<SubmissionRecord>,
}

impl Default for InventoryFile {
    fn default() -> Self {
        Self {
            version: INVENTORY_VERSION,
            items: Vec::new(),
            storage: Vec::new(),
            submissions: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("inventory not found at {path}")]
    Missing { path: PathBuf },
    #[error("failed to read inventory at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse inventory at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write inventory at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize inventory: {0}")]
    Serialize(toml::ser::Error),
    #[error("failed to format timestamp: {0}")]
    Timestamp(time::error::Format),
    #[error("{message}")]
    InvalidSchema { message: String },
    #[error("item '{id}' does not exist")]
    UnknownItem { id: String },
    #[error("storage '{id}' does not exist or is not a tote")]
    UnknownTote { id: String },
    #[error("item '{id}' is no longer eligible for {rule}")]
    Ineligible { id: String, rule: EligibilityRule },
}

/// Result of applying one payload to the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedSubmission {
    pub summary: String,
    pub storage_id: Option<String>,
}

impl InventoryFile {
    pub fn candidates(&self) -> Vec<CandidateEntity> {
        self.items.iter().map(InventoryItem::to_candidate).collect()
    }

    /// Checks every referenced item against the current records, then applies
    /// the change and appends a ledger entry. Nothing is mutated on error.
    pub fn apply(
        &mut self,
        payload: &SubmissionPayload,
        recorded_at: String,
    ) -> Result<AppliedSubmission, InventoryError> {
        let rule = match payload {
            SubmissionPayload::TotePack { .. }
            | SubmissionPayload::CreateStorage { .. }
            | SubmissionPayload::ToteConfirm { .. } => EligibilityRule::TotePack,
            SubmissionPayload::SinglePack { .. } => EligibilityRule::SinglePack,
            SubmissionPayload::Store { .. } => EligibilityRule::Store,
        };
        self.ensure_items_eligible(payload.item_ids(), rule)?;

        let storage_id = match payload {
            SubmissionPayload::TotePack {
                storage_id,
                item_ids,
                mark_as_packed,
            } => {
                let location = self
                    .storage
                    .iter()
                    .find(|unit| unit.id == *storage_id && unit.is_tote())
                    .ok_or_else(|| InventoryError::UnknownTote {
                        id: storage_id.clone(),
                    })?
                    .location
                    .clone();
                // Unpacked items stay eligible, so a repack moves them between totes.
                for unit in &mut self.storage {
                    if unit.id == *storage_id {
                        push_unique(&mut unit.item_ids, item_ids);
                    } else {
                        unit.item_ids.retain(|id| !item_ids.contains(id));
                    }
                }
                self.update_items(item_ids, |item| {
                    item.storage_id = Some(storage_id.clone());
                    item.location = location.clone();
                    if *mark_as_packed {
                        item.packed = true;
                    }
                });
                Some(storage_id.clone())
            }
            SubmissionPayload::SinglePack { item_ids, location }
            | SubmissionPayload::Store { item_ids, location } => {
                self.update_items(item_ids, |item| {
                    item.packed = true;
                    item.location = Some(location.clone());
                });
                None
            }
            SubmissionPayload::CreateStorage {
                kind,
                location,
                item_ids,
                ..
            } => {
                let id = self.next_storage_id(*kind);
                self.storage.push(StorageUnit {
                    id: id.clone(),
                    display_name: default_storage_name(*kind, self.storage.len() + 1),
                    kind: *kind,
                    location: Some(location.clone()),
                    class: None,
                    item_ids: item_ids.clone(),
                });
                let single = *kind == StorageKind::SelfContained;
                self.update_items(item_ids, |item| {
                    item.packed = true;
                    item.single_packed = single;
                    item.storage_id = Some(id.clone());
                    item.location = Some(location.clone());
                });
                Some(id)
            }
            SubmissionPayload::ToteConfirm {
                confirmed_item_ids, ..
            } => {
                self.update_items(confirmed_item_ids, |item| item.packed = true);
                None
            }
        };

        let summary = payload.summary();
        self.submissions.push(SubmissionRecord {
            recorded_at,
            action: action_name(payload).to_string(),
            summary: summary.clone(),
            item_ids: payload.item_ids().to_vec(),
            storage_id: storage_id.clone(),
        });

        Ok(AppliedSubmission {
            summary,
            storage_id,
        })
    }

    fn ensure_items_eligible(
        &self,
        item_ids: &[String],
        rule: EligibilityRule,
    ) -> Result<(), InventoryError> {
        for id in item_ids {
            let item = self
                .items
                .iter()
                .find(|item| item.id == *id)
                .ok_or_else(|| InventoryError::UnknownItem { id: id.clone() })?;
            if !rule.admits(&item.to_candidate()) {
                return Err(InventoryError::Ineligible {
                    id: id.clone(),
                    rule,
                });
            }
        }
        Ok(())
    }

    fn update_items(&mut self, item_ids: &[String], mut update: impl FnMut(&mut InventoryItem)) {
        for item in self
            .items
            .iter_mut()
            .filter(|item| item_ids.contains(&item.id))
        {
            update(item);
        }
    }

    fn next_storage_id(&self, kind: StorageKind) -> String {
        let prefix = match kind {
            StorageKind::Tote => "tote",
            StorageKind::SelfContained => "unit",
        };
        let mut counter = self.storage.len() + 1;
        loop {
            let candidate = format!("{prefix}-{counter}");
            if !self.storage.iter().any(|unit| unit.id == candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}

fn push_unique(target: &mut Vec<String>, ids: &[String]) {
    for id in ids {
        if !target.contains(id) {
            target.push(id.clone());
        }
    }
}

fn default_storage_name(kind: StorageKind, ordinal: usize) -> String {
    match kind {
        StorageKind::Tote => format!("Tote {ordinal}"),
        StorageKind::SelfContained => format!("Unit {ordinal}"),
    }
}

fn action_name(payload: &SubmissionPayload) -> &'static str {
    match payload {
        SubmissionPayload::TotePack { .. } => "tote-pack",
        SubmissionPayload::SinglePack { .. } => "single-pack",
        SubmissionPayload::Store { .. } => "store",
        SubmissionPayload::CreateStorage {
            kind: StorageKind::Tote,
            ..
        } => "create-tote",
        SubmissionPayload::CreateStorage {
            kind: StorageKind::SelfContained,
            ..
        } => "create-self",
        SubmissionPayload::ToteConfirm { .. } => "tote-confirm",
    }
}

pub fn now_utc_rfc3339() -> Result<String, InventoryError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(InventoryError::Timestamp)
}

pub fn load_inventory(path: &Path) -> Result<InventoryFile, InventoryError> {
    if !path.exists() {
        return Err(InventoryError::Missing {
            path: path.to_path_buf(),
        });
    }

    let raw = fs::read_to_string(path).map_err(|source| InventoryError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: InventoryFile = toml::from_str(&raw).map_err(|source| InventoryError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_inventory(&parsed)?;
    Ok(parsed)
}

pub fn save_inventory(path: &Path, inventory: &InventoryFile) -> Result<(), InventoryError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| InventoryError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let serialized = toml::to_string(inventory).map_err(InventoryError::Serialize)?;
    let temp_path = path.with_extension("toml.tmp");

    fs::write(&temp_path, serialized).map_err(|source| InventoryError::Write {
        path: temp_path.clone(),
        source,
    })?;

    fs::rename(&temp_path, path).map_err(|source| InventoryError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

fn validate_inventory(inventory: &InventoryFile) -> Result<(), InventoryError> {
    if inventory.version != INVENTORY_VERSION {
        return Err(schema_error(format!(
            "invalid inventory schema: unsupported version (expected {INVENTORY_VERSION}, found {})",
            inventory.version
        )));
    }

    for (index, item) in inventory.items.iter().enumerate() {
        if item.id.trim().is_empty() {
            return Err(schema_error(format!(
                "invalid inventory schema: item[{index}] id must be non-empty"
            )));
        }
        if inventory.items[..index].iter().any(|other| other.id == item.id) {
            return Err(schema_error(format!(
                "invalid inventory schema: duplicate item id '{}'",
                item.id
            )));
        }
    }

    for (index, unit) in inventory.storage.iter().enumerate() {
        if unit.id.trim().is_empty() {
            return Err(schema_error(format!(
                "invalid inventory schema: storage[{index}] id must be non-empty"
            )));
        }
        if inventory.storage[..index]
            .iter()
            .any(|other| other.id == unit.id)
        {
            return Err(schema_error(format!(
                "invalid inventory schema: duplicate storage id '{}'",
                unit.id
            )));
        }
    }

    Ok(())
}

fn schema_error(message: String) -> InventoryError {
    InventoryError::InvalidSchema { message }
}
