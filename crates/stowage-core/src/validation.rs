use thiserror::Error;

use crate::state::{LocationChoice, WizardState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("choose a mode to continue")]
    ModeRequired,
    #[error("choose a tote to pack into")]
    StorageTargetRequired,
    #[error("select at least one item")]
    ItemsRequired,
    #[error("select exactly one item (currently {selected})")]
    SingleItemRequired { selected: usize },
    #[error("choose a location")]
    LocationRequired,
    #[error("custom location required")]
    CustomLocationRequired,
    #[error("custom location must be at most {max} characters")]
    CustomLocationTooLong { max: usize },
    #[error("wait for the photo upload to finish")]
    PhotoUploadPending,
}

pub type StepValidator = fn(&WizardState) -> Result<(), ValidationError>;

pub fn storage_target_chosen(state: &WizardState) -> Result<(), ValidationError> {
    match state.selected_storage_target.as_deref() {
        Some(id) if !id.trim().is_empty() => Ok(()),
        _ => Err(ValidationError::StorageTargetRequired),
    }
}

pub fn items_selected(state: &WizardState) -> Result<(), ValidationError> {
    if state.selected_entity_ids.is_empty() {
        return Err(ValidationError::ItemsRequired);
    }
    Ok(())
}

pub fn single_item_selected(state: &WizardState) -> Result<(), ValidationError> {
    match state.selected_entity_ids.len() {
        1 => Ok(()),
        selected => Err(ValidationError::SingleItemRequired { selected }),
    }
}

pub fn location_chosen(state: &WizardState) -> Result<(), ValidationError> {
    match &state.location_choice {
        None => Err(ValidationError::LocationRequired),
        Some(LocationChoice::Preset(_)) => Ok(()),
        Some(LocationChoice::Custom) => {
            let trimmed = state.custom_location.trim();
            if trimmed.is_empty() {
                return Err(ValidationError::CustomLocationRequired);
            }
            if trimmed.chars().count() > state.custom_location_max {
                return Err(ValidationError::CustomLocationTooLong {
                    max: state.custom_location_max,
                });
            }
            Ok(())
        }
    }
}

pub fn photo_settled(state: &WizardState) -> Result<(), ValidationError> {
    if state.photo_pending {
        return Err(ValidationError::PhotoUploadPending);
    }
    Ok(())
}

pub fn always_valid(_state: &WizardState) -> Result<(), ValidationError> {
    Ok(())
}
