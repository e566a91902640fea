use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::eligibility::EligibilityRule;
use crate::state::WizardState;
use crate::validation::{
    StepValidator, ValidationError, always_valid, items_selected, location_chosen, photo_settled,
    single_item_selected, storage_target_chosen,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardMode {
    TotePack,
    SinglePack,
    Store,
    CreateTote,
    CreateSelf,
    ToteConfirm,
}

impl WizardMode {
    pub const ALL: [Self; 6] = [
        Self::TotePack,
        Self::SinglePack,
        Self::Store,
        Self::CreateTote,
        Self::CreateSelf,
        Self::ToteConfirm,
    ];

    /// Offered by step 0 when no mode was supplied up front.
    pub const CHOOSER_OPTIONS: [Self; 3] = [Self::TotePack, Self::SinglePack, Self::Store];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TotePack => "tote-pack",
            Self::SinglePack => "single-pack",
            Self::Store => "store",
            Self::CreateTote => "create-tote",
            Self::CreateSelf => "create-self",
            Self::ToteConfirm => "tote-confirm",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::TotePack => "Pack items into a tote",
            Self::SinglePack => "Pack single-packed items",
            Self::Store => "Store unpackable items",
            Self::CreateTote => "Create a tote",
            Self::CreateSelf => "Create a self-contained unit",
            Self::ToteConfirm => "Confirm tote contents",
        }
    }

    pub fn eligibility_rule(self) -> EligibilityRule {
        match self {
            Self::SinglePack => EligibilityRule::SinglePack,
            Self::Store => EligibilityRule::Store,
            Self::TotePack | Self::CreateTote | Self::CreateSelf | Self::ToteConfirm => {
                EligibilityRule::TotePack
            }
        }
    }

    pub fn definition(self) -> WizardDefinition {
        let steps: &'static [StepDefinition] = match self {
            Self::TotePack => TOTE_PACK_STEPS,
            Self::SinglePack | Self::Store => LOCATION_PACK_STEPS,
            Self::CreateTote => CREATE_TOTE_STEPS,
            Self::CreateSelf => CREATE_SELF_STEPS,
            Self::ToteConfirm => TOTE_CONFIRM_STEPS,
        };

        WizardDefinition {
            mode: self,
            rule: self.eligibility_rule(),
            steps,
        }
    }
}

impl fmt::Display for WizardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown wizard mode '{value}' (expected one of: {expected})")]
pub struct ModeParseError {
    pub value: String,
    pub expected: String,
}

impl FromStr for WizardMode {
    type Err = ModeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| ModeParseError {
                value: value.to_string(),
                expected: Self::ALL
                    .iter()
                    .map(|mode| mode.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// What a step's body is about; renderers dispatch on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    ChooseMode,
    SelectStorage,
    SelectItems,
    Location,
    Photo,
    Review,
}

#[derive(Debug, Clone, Copy)]
pub struct StepDefinition {
    pub index: usize,
    pub label: &'static str,
    pub kind: StepKind,
    validator: StepValidator,
}

impl StepDefinition {
    const fn new(index: usize, label: &'static str, kind: StepKind, validator: StepValidator) -> Self {
        Self {
            index,
            label,
            kind,
            validator,
        }
    }

    pub fn validate(&self, state: &WizardState) -> Result<(), ValidationError> {
        (self.validator)(state)
    }
}

pub const CHOOSE_MODE_STEP: StepDefinition =
    StepDefinition::new(0, "Choose what to do", StepKind::ChooseMode, mode_chosen);

fn mode_chosen(state: &WizardState) -> Result<(), ValidationError> {
    state.mode.map(|_| ()).ok_or(ValidationError::ModeRequired)
}

const TOTE_PACK_STEPS: &[StepDefinition] = &[
    StepDefinition::new(1, "Choose tote", StepKind::SelectStorage, storage_target_chosen),
    StepDefinition::new(2, "Select items", StepKind::SelectItems, items_selected),
    StepDefinition::new(3, "Review", StepKind::Review, always_valid),
];

const LOCATION_PACK_STEPS: &[StepDefinition] = &[
    StepDefinition::new(1, "Select items", StepKind::SelectItems, items_selected),
    StepDefinition::new(2, "Location", StepKind::Location, location_chosen),
    StepDefinition::new(3, "Review", StepKind::Review, always_valid),
];

const CREATE_TOTE_STEPS: &[StepDefinition] = &[
    StepDefinition::new(1, "Tote location", StepKind::Location, location_chosen),
    StepDefinition::new(2, "Select items", StepKind::SelectItems, always_valid),
    StepDefinition::new(3, "Photo", StepKind::Photo, photo_settled),
    StepDefinition::new(4, "Review", StepKind::Review, always_valid),
];

const CREATE_SELF_STEPS: &[StepDefinition] = &[
    StepDefinition::new(1, "Select item", StepKind::SelectItems, single_item_selected),
    StepDefinition::new(2, "Location", StepKind::Location, location_chosen),
    StepDefinition::new(3, "Photo", StepKind::Photo, photo_settled),
    StepDefinition::new(4, "Review", StepKind::Review, always_valid),
];

const TOTE_CONFIRM_STEPS: &[StepDefinition] = &[
    StepDefinition::new(1, "Confirm items", StepKind::SelectItems, items_selected),
    StepDefinition::new(2, "Photo", StepKind::Photo, photo_settled),
    StepDefinition::new(3, "Review", StepKind::Review, always_valid),
];

/// The fixed step sequence for one mode.
#[derive(Debug, Clone, Copy)]
pub struct WizardDefinition {
    pub mode: WizardMode,
    pub rule: EligibilityRule,
    steps: &'static [StepDefinition],
}

impl WizardDefinition {
    pub fn steps(&self) -> &'static [StepDefinition] {
        self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// `index` is 1-based.
    pub fn step(&self, index: usize) -> Option<&'static StepDefinition> {
        index.checked_sub(1).and_then(|offset| self.steps.get(offset))
    }

    pub fn has_step(&self, kind: StepKind) -> bool {
        self.steps.iter().any(|step| step.kind == kind)
    }
}
