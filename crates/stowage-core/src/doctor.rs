use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::load_config;
use crate::eligibility::{RuleCounts, rule_counts};
use crate::inventory::load_inventory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Pass,
    Fail,
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorCheck {
    pub name: String,
    pub state: CheckState,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub checks: Vec<DoctorCheck>,
    /// Present when the inventory loaded.
    pub counts: Option<RuleCounts>,
}

impl DoctorReport {
    pub fn has_failures(&self) -> bool {
        self.checks
            .iter()
            .any(|check| check.state == CheckState::Fail)
    }

    pub fn summary(&self) -> String {
        let passed = self
            .checks
            .iter()
            .filter(|check| check.state == CheckState::Pass)
            .count();
        let failed = self.checks.len().saturating_sub(passed);
        format!("{passed} passed, {failed} failed")
    }
}

/// `config_path` is `Err` when the home directory could not be resolved.
pub fn run_doctor(config_path: anyhow::Result<PathBuf>, inventory_path: &Path) -> DoctorReport {
    let mut checks = Vec::new();

    match config_path {
        Ok(config_path) => {
            if config_path.exists() {
                checks.push(pass_check(
                    "config file exists",
                    format!("found at {}", config_path.display()),
                ));
                checks.push(match load_config(&config_path) {
                    Ok(_) => pass_check("config parses and validates", "config is valid"),
                    Err(error) => fail_check("config parses and validates", error.to_string()),
                });
            } else {
                checks.push(fail_check(
                    "config file exists",
                    format!("expected at {} (defaults are used)", config_path.display()),
                ));
                checks.push(skipped_check(
                    "config parses and validates",
                    "config file is missing",
                ));
            }
        }
        Err(error) => {
            checks.push(fail_check("config path resolves", error.to_string()));
            checks.push(skipped_check(
                "config parses and validates",
                "config path could not be resolved",
            ));
        }
    }

    let counts = match load_inventory(inventory_path) {
        Ok(inventory) => {
            checks.push(pass_check(
                "inventory loads",
                format!(
                    "{} item(s), {} storage unit(s) at {}",
                    inventory.items.len(),
                    inventory.storage.len(),
                    inventory_path.display()
                ),
            ));
            Some(rule_counts(&inventory.candidates()))
        }
        Err(error) => {
            checks.push(fail_check("inventory loads", error.to_string()));
            None
        }
    };

    DoctorReport { checks, counts }
}

fn pass_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Pass,
        details: details.into(),
    }
}

fn fail_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Fail,
        details: details.into(),
    }
}

fn skipped_check(name: &str, reason: &str) -> DoctorCheck {
    fail_check(name, format!("skipped because {reason}"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn check_state_display_is_uppercase_label() {
        assert_eq!(CheckState::Pass.to_string(), "PASS");
        assert_eq!(CheckState::Fail.to_string(), "FAIL");
    }

    #[test]
    fn doctor_summary_counts_pass_and_fail() {
        let report = DoctorReport {
            checks: vec![
                pass_check("a", "ok"),
                fail_check("b", "no"),
                pass_check("c", "ok"),
            ],
            counts: None,
        };

        assert_eq!(report.summary(), "2 passed, 1 failed");
        assert!(report.has_failures());
    }

    #[test]
    fn healthy_setup_reports_rule_counts() {
        let temp = tempfile::tempdir().expect("temp dir");
        let config_path = temp.path().join("config.toml");
        let inventory_path = temp.path().join("inventory.toml");
        fs::write(&config_path, "version = 1\n").expect("write config");
        fs::write(
            &inventory_path,
            r#"
version = 1

[[item]]
id = "itm-1"
name = "Lantern"

[[item]]
id = "itm-2"
name = "Kayak"
packable = false

[[item]]
id = "itm-3"
name = "Crate"
class_type = "Receptacle"
"#,
        )
        .expect("write inventory");

        let report = run_doctor(Ok(config_path), &inventory_path);

        assert!(!report.has_failures(), "{report:?}");
        let counts = report.counts.expect("counts");
        assert_eq!(counts.tote_pack, 1);
        assert_eq!(counts.store, 1);
        assert_eq!(counts.ineligible, 1);
    }

    #[test]
    fn missing_files_are_reported_as_failures() {
        let temp = tempfile::tempdir().expect("temp dir");

        let report = run_doctor(
            Ok(temp.path().join("config.toml")),
            &temp.path().join("inventory.toml"),
        );

        assert!(report.has_failures());
        assert!(report.counts.is_none());
        assert_eq!(report.checks.len(), 3);
        assert!(report.checks[1].details.contains("skipped because"));
    }
}
