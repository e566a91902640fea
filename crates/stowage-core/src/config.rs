use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::machine::MachineOptions;
use crate::selector::DEFAULT_PAGE_SIZE;
use crate::state::CUSTOM_LOCATION_MAX;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StowageConfig {
    pub version: u32,
    #[serde(default)]
    pub wizard: WizardSettings,
    #[serde(default)]
    pub locations: LocationSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WizardSettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_custom_location_max")]
    pub custom_location_max: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocationSettings {
    #[serde(default = "default_presets")]
    pub presets: Vec<String>,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_custom_location_max() -> usize {
    CUSTOM_LOCATION_MAX
}

fn default_presets() -> Vec<String> {
    MachineOptions::default().location_presets
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            custom_location_max: default_custom_location_max(),
        }
    }
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            presets: default_presets(),
        }
    }
}

impl Default for StowageConfig {
    fn default() -> Self {
        Self {
            version: 1,
            wizard: WizardSettings::default(),
            locations: LocationSettings::default(),
        }
    }
}

impl StowageConfig {
    pub fn machine_options(&self) -> MachineOptions {
        MachineOptions {
            page_size: self.wizard.page_size,
            custom_location_max: self.wizard.custom_location_max,
            location_presets: self.locations.presets.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not resolve home directory for config path")]
    HomeDirectoryUnavailable,
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {message}")]
    Validation { message: String },
}

pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(base_dirs
        .home_dir()
        .join(".config")
        .join("stowage")
        .join("config.toml"))
}

/// Default inventory location, used when `--inventory` is not given.
pub fn resolve_inventory_path() -> anyhow::Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(base_dirs
        .home_dir()
        .join(".config")
        .join("stowage")
        .join("inventory.toml"))
}

pub fn load_config(path: &Path) -> Result<StowageConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: StowageConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&parsed)?;
    Ok(parsed)
}

/// Loads the config at `path`, or the defaults when no file exists there.
pub fn load_config_or_default(path: &Path) -> Result<StowageConfig, ConfigError> {
    if !path.exists() {
        return Ok(StowageConfig::default());
    }
    load_config(path)
}

pub fn validate_config(config: &StowageConfig) -> Result<(), ConfigError> {
    if config.version != 1 {
        return Err(ConfigError::Validation {
            message: "version must be 1".to_string(),
        });
    }

    if config.wizard.page_size == 0 {
        return Err(ConfigError::Validation {
            message: "wizard.page_size must be greater than 0".to_string(),
        });
    }

    if config.wizard.custom_location_max == 0
        || config.wizard.custom_location_max > CUSTOM_LOCATION_MAX
    {
        return Err(ConfigError::Validation {
            message: format!(
                "wizard.custom_location_max must be between 1 and {CUSTOM_LOCATION_MAX}"
            ),
        });
    }

    if config.locations.presets.is_empty() {
        return Err(ConfigError::Validation {
            message: "at least one location preset must be configured".to_string(),
        });
    }

    let mut seen = BTreeSet::new();
    for (index, preset) in config.locations.presets.iter().enumerate() {
        let trimmed = preset.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Validation {
                message: format!("locations.presets[{index}] must be non-empty"),
            });
        }
        if !seen.insert(trimmed.to_lowercase()) {
            return Err(ConfigError::Validation {
                message: format!("locations.presets[{index}] duplicates '{trimmed}'"),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_config_from_toml(raw: &str) -> Result<StowageConfig, ConfigError> {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        fs::write(file.path(), raw).expect("write temp config");
        load_config(file.path())
    }

    #[test]
    fn accepts_full_config() {
        let raw = r#"
version = 1

[wizard]
page_size = 25
custom_location_max = 12

[locations]
presets = ["Garage", "Shed"]
"#;

        let config = load_config_from_toml(raw).expect("valid config");
        let options = config.machine_options();
        assert_eq!(options.page_size, 25);
        assert_eq!(options.custom_location_max, 12);
        assert_eq!(options.location_presets, vec!["Garage", "Shed"]);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = load_config_from_toml("version = 1\n").expect("valid config");
        assert_eq!(config, StowageConfig::default());
        assert_eq!(config.wizard.page_size, 10);
    }

    #[test]
    fn rejects_unknown_version() {
        let error = load_config_from_toml("version = 2\n").expect_err("config should fail");
        assert!(error.to_string().contains("version must be 1"));
    }

    #[test]
    fn rejects_zero_page_size() {
        let raw = r#"
version = 1

[wizard]
page_size = 0
"#;

        let error = load_config_from_toml(raw).expect_err("config should fail");
        assert!(error.to_string().contains("page_size must be greater than 0"));
    }

    #[test]
    fn rejects_custom_location_limit_above_twenty() {
        let raw = r#"
version = 1

[wizard]
custom_location_max = 40
"#;

        let error = load_config_from_toml(raw).expect_err("config should fail");
        assert!(error.to_string().contains("between 1 and 20"));
    }

    #[test]
    fn rejects_duplicate_presets() {
        let raw = r#"
version = 1

[locations]
presets = ["Garage", "garage "]
"#;

        let error = load_config_from_toml(raw).expect_err("config should fail");
        assert!(error.to_string().contains("duplicates"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempfile::tempdir().expect("temp dir");
        let config =
            load_config_or_default(&temp.path().join("config.toml")).expect("default config");
        assert_eq!(config, StowageConfig::default());
    }
}
