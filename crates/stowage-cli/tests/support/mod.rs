use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

pub fn new_command_with_temp_home() -> (Command, tempfile::TempDir) {
    let temp_home = tempfile::tempdir().expect("temp home");
    let binary = assert_cmd::cargo::cargo_bin!("stowage");
    let mut command = Command::new(binary);
    command.env("HOME", temp_home.path());
    command.env("XDG_CONFIG_HOME", temp_home.path().join(".config"));
    command.env_remove("RUST_LOG");
    (command, temp_home)
}

pub fn write_config(home: &Path, raw: &str) {
    let config_dir = home.join(".config").join("stowage");
    fs::create_dir_all(&config_dir).expect("create config dir");
    fs::write(config_dir.join("config.toml"), raw).expect("write config");
}

pub fn write_inventory(home: &Path) -> PathBuf {
    let inventory_dir = home.join(".config").join("stowage");
    fs::create_dir_all(&inventory_dir).expect("create inventory dir");
    let path = inventory_dir.join("inventory.toml");
    fs::write(
        &path,
        r#"
version = 1

[[item]]
id = "itm-1"
name = "Lantern"
class = "Camping"

[[item]]
id = "itm-2"
name = "Kayak"
packable = false

[[item]]
id = "itm-3"
name = "Skis"
single_packed = true

[[storage]]
id = "tote-1"
name = "Tote 1"
kind = "tote"
location = "Garage"
"#,
    )
    .expect("write inventory");
    path
}

pub fn assert_timestamp_log_names(entries: &[std::fs::DirEntry]) {
    assert!(!entries.is_empty(), "expected at least one diagnostics log");

    for entry in entries {
        let name = entry
            .file_name()
            .into_string()
            .expect("diagnostics filename utf8");
        let stem = name
            .strip_suffix(".log")
            .expect("diagnostics filename .log suffix");
        assert!(
            !stem.is_empty() && stem.chars().all(|character| character.is_ascii_digit()),
            "diagnostics filename must be <timestamp>.log, got: {name}"
        );
    }
}
