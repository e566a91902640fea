use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use stowage_app::{PhotoRef, PhotoStore, Receipt, SubmissionSink};
use stowage_core::payload::SubmissionPayload;

pub static ENV_LOCK: Mutex<()> = Mutex::new(());

pub const SAMPLE_INVENTORY: &str = r#"
version = 1

[[item]]
id = "itm-1"
name = "Lantern"
class = "Camping"

[[item]]
id = "itm-2"
name = "Tent"
class = "Camping"

[[item]]
id = "itm-3"
name = "Kayak"
packable = false

[[item]]
id = "itm-4"
name = "Skis"
single_packed = true

[[item]]
id = "itm-5"
name = "Stove"
packed = true

[[storage]]
id = "tote-1"
name = "Blue tote"
kind = "tote"
location = "Garage"

[[storage]]
id = "unit-1"
name = "Ski bag"
kind = "self-contained"
"#;

pub fn write_inventory(dir: &Path) -> PathBuf {
    let path = dir.join("inventory.toml");
    fs::write(&path, SAMPLE_INVENTORY).expect("write inventory");
    path
}

pub fn write_config(home: &Path, raw: &str) {
    let config_dir = home.join(".config").join("stowage");
    fs::create_dir_all(&config_dir).expect("create config dir");
    fs::write(config_dir.join("config.toml"), raw).expect("write config");
}

/// Sink that records payloads and answers from a fixed script.
#[derive(Default)]
pub struct RecordingSink {
    pub payloads: Mutex<Vec<SubmissionPayload>>,
    pub fail_with: Option<String>,
}

impl SubmissionSink for RecordingSink {
    fn submit(&self, payload: &SubmissionPayload) -> Result<Receipt> {
        self.payloads
            .lock()
            .expect("payloads lock")
            .push(payload.clone());

        match &self.fail_with {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(Receipt {
                summary: payload.summary(),
                storage_id: None,
                recorded_at: "2026-10-19T10:00:00Z".to_string(),
            }),
        }
    }
}

#[derive(Default)]
pub struct NullPhotos;

impl PhotoStore for NullPhotos {
    fn attach(&self, path: &Path) -> Result<PhotoRef> {
        Ok(PhotoRef {
            path: path.to_path_buf(),
        })
    }
}
