pub(crate) mod binary_choice;
pub(crate) mod loading;
pub(crate) mod modal;
pub(crate) mod selector_table;
pub(crate) mod text;
