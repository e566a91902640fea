pub mod candidate;
pub mod config;
pub mod doctor;
pub mod eligibility;
pub mod inventory;
pub mod machine;
pub mod mode;
pub mod payload;
pub mod selector;
pub mod state;
#[cfg(test)]
pub(crate) mod test_support;
pub mod validation;
