use crate::mode::WizardMode;

pub const CUSTOM_LOCATION_MAX: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationChoice {
    Preset(String),
    Custom,
}

/// Everything one wizard run accumulates. Owned by the running machine and
/// dropped with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    pub mode: Option<WizardMode>,
    pub selected_storage_target: Option<String>,
    pub selected_entity_ids: Vec<String>,
    pub location_choice: Option<LocationChoice>,
    pub custom_location: String,
    pub custom_location_max: usize,
    pub mark_final: bool,
    pub photo_attached: bool,
    pub photo_pending: bool,
}

impl WizardState {
    pub fn new(mode: Option<WizardMode>, custom_location_max: usize) -> Self {
        Self {
            mode,
            selected_storage_target: None,
            selected_entity_ids: Vec::new(),
            location_choice: None,
            custom_location: String::new(),
            custom_location_max: custom_location_max.clamp(1, CUSTOM_LOCATION_MAX),
            mark_final: true,
            photo_attached: false,
            photo_pending: false,
        }
    }

    /// Replaces the free text, keeping at most `custom_location_max` characters.
    pub fn set_custom_location(&mut self, value: &str) {
        self.custom_location = value.chars().take(self.custom_location_max).collect();
    }

    /// `None` while no location is chosen or the custom text is blank.
    pub fn resolved_location(&self) -> Option<String> {
        match self.location_choice.as_ref()? {
            LocationChoice::Preset(name) => Some(name.clone()),
            LocationChoice::Custom => {
                let trimmed = self.custom_location.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }
}
