use serde::Serialize;
use thiserror::Error;

use crate::candidate::StorageKind;
use crate::mode::WizardMode;
use crate::state::WizardState;

/// What a completed run hands to the submission sink. The shape depends on the mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum SubmissionPayload {
    TotePack {
        storage_id: String,
        item_ids: Vec<String>,
        mark_as_packed: bool,
    },
    SinglePack {
        item_ids: Vec<String>,
        location: String,
    },
    Store {
        item_ids: Vec<String>,
        location: String,
    },
    CreateStorage {
        kind: StorageKind,
        location: String,
        item_ids: Vec<String>,
        photo_uploaded: bool,
    },
    ToteConfirm {
        confirmed_item_ids: Vec<String>,
        photo_uploaded: bool,
    },
}

impl SubmissionPayload {
    pub fn item_ids(&self) -> &[String] {
        match self {
            Self::TotePack { item_ids, .. }
            | Self::SinglePack { item_ids, .. }
            | Self::Store { item_ids, .. }
            | Self::CreateStorage { item_ids, .. } => item_ids,
            Self::ToteConfirm {
                confirmed_item_ids, ..
            } => confirmed_item_ids,
        }
    }

    pub fn summary(&self) -> String {
        let count = self.item_ids().len();
        match self {
            Self::TotePack { storage_id, .. } => format!("packed {count} item(s) into {storage_id}"),
            Self::SinglePack { location, .. } => {
                format!("packed {count} single-packed item(s) at {location}")
            }
            Self::Store { location, .. } => format!("stored {count} item(s) at {location}"),
            Self::CreateStorage { kind, location, .. } => {
                format!("created {kind} at {location} with {count} item(s)")
            }
            Self::ToteConfirm { .. } => format!("confirmed {count} item(s)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("no mode chosen")]
    MissingMode,
    #[error("{mode} requires a storage target")]
    MissingStorageTarget { mode: WizardMode },
    #[error("{mode} requires at least one item")]
    MissingItems { mode: WizardMode },
    #[error("{mode} requires a location")]
    MissingLocation { mode: WizardMode },
    #[error("{mode} requires exactly one item, got {count}")]
    ItemCount { mode: WizardMode, count: usize },
}

/// Builds the payload for `mode` from the accumulated state. Pure.
pub fn assemble(mode: WizardMode, state: &WizardState) -> Result<SubmissionPayload, AssemblyError> {
    let item_ids = state.selected_entity_ids.clone();

    match mode {
        WizardMode::TotePack => {
            let storage_id = state
                .selected_storage_target
                .clone()
                .filter(|id| !id.trim().is_empty())
                .ok_or(AssemblyError::MissingStorageTarget { mode })?;
            require_items(mode, &item_ids)?;
            Ok(SubmissionPayload::TotePack {
                storage_id,
                item_ids,
                mark_as_packed: state.mark_final,
            })
        }
        WizardMode::SinglePack | WizardMode::Store => {
            require_items(mode, &item_ids)?;
            let location = require_location(mode, state)?;
            if mode == WizardMode::Store {
                Ok(SubmissionPayload::Store { item_ids, location })
            } else {
                Ok(SubmissionPayload::SinglePack { item_ids, location })
            }
        }
        WizardMode::CreateTote => Ok(SubmissionPayload::CreateStorage {
            kind: StorageKind::Tote,
            location: require_location(mode, state)?,
            item_ids,
            photo_uploaded: state.photo_attached,
        }),
        WizardMode::CreateSelf => {
            if item_ids.len() != 1 {
                return Err(AssemblyError::ItemCount {
                    mode,
                    count: item_ids.len(),
                });
            }
            Ok(SubmissionPayload::CreateStorage {
                kind: StorageKind::SelfContained,
                location: require_location(mode, state)?,
                item_ids,
                photo_uploaded: state.photo_attached,
            })
        }
        WizardMode::ToteConfirm => {
            require_items(mode, &item_ids)?;
            Ok(SubmissionPayload::ToteConfirm {
                confirmed_item_ids: item_ids,
                photo_uploaded: state.photo_attached,
            })
        }
    }
}

fn require_items(mode: WizardMode, item_ids: &[String]) -> Result<(), AssemblyError> {
    if item_ids.is_empty() {
        return Err(AssemblyError::MissingItems { mode });
    }
    Ok(())
}

fn require_location(mode: WizardMode, state: &WizardState) -> Result<String, AssemblyError> {
    state
        .resolved_location()
        .ok_or(AssemblyError::MissingLocation { mode })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LocationChoice;

    fn state(mode: WizardMode, items: &[&str]) -> WizardState {
        let mut state = WizardState::new(Some(mode), 20);
        state.selected_entity_ids = items.iter().map(|id| id.to_string()).collect();
        state
    }

    #[test]
    fn tote_pack_without_storage_is_rejected_even_with_items() {
        let state = state(WizardMode::TotePack, &["itm-1", "itm-2"]);

        assert_eq!(
            assemble(WizardMode::TotePack, &state),
            Err(AssemblyError::MissingStorageTarget {
                mode: WizardMode::TotePack
            })
        );
    }

    #[test]
    fn tote_pack_carries_storage_items_and_flag() {
        let mut state = state(WizardMode::TotePack, &["itm-1"]);
        state.selected_storage_target = Some("tote-7".to_string());
        state.mark_final = false;

        assert_eq!(
            assemble(WizardMode::TotePack, &state),
            Ok(SubmissionPayload::TotePack {
                storage_id: "tote-7".to_string(),
                item_ids: vec!["itm-1".to_string()],
                mark_as_packed: false,
            })
        );
    }

    #[test]
    fn single_pack_resolves_custom_location_text() {
        let mut state = state(WizardMode::SinglePack, &["itm-1", "itm-2"]);
        state.location_choice = Some(LocationChoice::Custom);
        state.set_custom_location(" Loft shelf ");

        let payload = assemble(WizardMode::SinglePack, &state).expect("payload");
        assert_eq!(
            payload,
            SubmissionPayload::SinglePack {
                item_ids: vec!["itm-1".to_string(), "itm-2".to_string()],
                location: "Loft shelf".to_string(),
            }
        );
    }

    #[test]
    fn store_requires_location() {
        let state = state(WizardMode::Store, &["itm-1"]);
        assert_eq!(
            assemble(WizardMode::Store, &state),
            Err(AssemblyError::MissingLocation {
                mode: WizardMode::Store
            })
        );
    }

    #[test]
    fn create_self_needs_exactly_one_item() {
        let mut state = state(WizardMode::CreateSelf, &["itm-1", "itm-2"]);
        state.location_choice = Some(LocationChoice::Preset("Attic".to_string()));

        assert_eq!(
            assemble(WizardMode::CreateSelf, &state),
            Err(AssemblyError::ItemCount {
                mode: WizardMode::CreateSelf,
                count: 2
            })
        );
    }

    #[test]
    fn create_tote_may_start_empty() {
        let mut state = state(WizardMode::CreateTote, &[]);
        state.location_choice = Some(LocationChoice::Preset("Garage".to_string()));
        state.photo_attached = true;

        assert_eq!(
            assemble(WizardMode::CreateTote, &state),
            Ok(SubmissionPayload::CreateStorage {
                kind: StorageKind::Tote,
                location: "Garage".to_string(),
                item_ids: Vec::new(),
                photo_uploaded: true,
            })
        );
    }

    #[test]
    fn tote_confirm_reports_photo_flag() {
        let state = state(WizardMode::ToteConfirm, &["itm-4"]);
        let payload = assemble(WizardMode::ToteConfirm, &state).expect("payload");

        assert_eq!(
            payload,
            SubmissionPayload::ToteConfirm {
                confirmed_item_ids: vec!["itm-4".to_string()],
                photo_uploaded: false,
            }
        );
        assert_eq!(payload.summary(), "confirmed 1 item(s)");
    }

    #[test]
    fn payload_serializes_with_action_tag() {
        let payload = SubmissionPayload::Store {
            item_ids: vec!["itm-1".to_string()],
            location: "Barn".to_string(),
        };

        let rendered = toml::to_string(&payload).expect("serialize");
        assert!(rendered.contains("action = \"store\""));
        assert!(rendered.contains("location = \"Barn\""));
    }
}
