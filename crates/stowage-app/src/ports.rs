use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use stowage_core::candidate::{CandidateEntity, StorageKind, StorageUnit};
use stowage_core::payload::SubmissionPayload;

/// Narrowing applied by the source before the wizard's own eligibility rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilters {
    pub include_packed: bool,
    pub class: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageFilters {
    pub kind: Option<StorageKind>,
}

/// What the sink reports after accepting a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub summary: String,
    pub storage_id: Option<String>,
    pub recorded_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    pub path: PathBuf,
}

pub trait CandidateSource: Send + Sync {
    fn fetch_items(&self, filters: &ItemFilters) -> Result<Vec<CandidateEntity>>;
    fn fetch_storage(&self, filters: &StorageFilters) -> Result<Vec<StorageUnit>>;
}

pub trait SubmissionSink: Send + Sync {
    fn submit(&self, payload: &SubmissionPayload) -> Result<Receipt>;
}

pub trait PhotoStore: Send + Sync {
    fn attach(&self, path: &Path) -> Result<PhotoRef>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::Info => write!(f, "info"),
        }
    }
}

pub trait Notifier {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Forwards notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Error => tracing::warn!(%level, "{message}"),
            NoticeLevel::Success | NoticeLevel::Info => tracing::info!(%level, "{message}"),
        }
    }
}
