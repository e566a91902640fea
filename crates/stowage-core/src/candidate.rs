use std::fmt;

use serde::{Deserialize, Serialize};

pub const RECEPTACLE_CLASS_TYPE: &str = "Receptacle";

/// Anything a [`crate::selector::PaginatedSelector`] can list, search and select.
pub trait Selectable {
    fn id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn class(&self) -> Option<&str>;
}

/// Read-only projection of an item record supplied by the entity source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEntity {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub class_type: Option<String>,
    /// `None` means the item was never annotated with packing metadata.
    #[serde(default)]
    pub packable: Option<bool>,
    #[serde(default, rename = "packed")]
    pub packing_status: bool,
    #[serde(default)]
    pub single_packed: bool,
    #[serde(default)]
    pub deployed: bool,
}

impl CandidateEntity {
    pub fn is_receptacle(&self) -> bool {
        self.class_type.as_deref() == Some(RECEPTACLE_CLASS_TYPE)
    }
}

impl Selectable for CandidateEntity {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageKind {
    Tote,
    SelfContained,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tote => write!(f, "tote"),
            Self::SelfContained => write!(f, "self-contained"),
        }
    }
}

/// Read-only projection of a storage record; the tote-pack flow picks one as its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageUnit {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub kind: StorageKind,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub item_ids: Vec<String>,
}

impl StorageUnit {
    pub fn is_tote(&self) -> bool {
        self.kind == StorageKind::Tote
    }
}

impl Selectable for StorageUnit {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }
}
