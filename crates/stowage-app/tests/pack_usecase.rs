#[allow(dead_code)]
mod support;

use std::fs;
use std::sync::Arc;

use stowage_app::{App, CandidateSource, FileInventory, StorageFilters};
use stowage_core::candidate::StorageKind;
use stowage_core::inventory::load_inventory;
use stowage_core::payload::SubmissionPayload;

use support::{ENV_LOCK, NullPhotos, RecordingSink, write_config, write_inventory};

#[test]
fn fetch_items_skips_packed_entries() {
    let temp = tempfile::tempdir().expect("temp dir");
    let app = App::with_inventory(&write_inventory(temp.path()));

    let items = app.pack_fetch_items().expect("items");
    let ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();

    assert_eq!(ids, vec!["itm-1", "itm-2", "itm-3", "itm-4"]);
}

#[test]
fn fetch_totes_excludes_self_contained_units() {
    let temp = tempfile::tempdir().expect("temp dir");
    let app = App::with_inventory(&write_inventory(temp.path()));

    let totes = app.pack_fetch_totes().expect("totes");

    assert_eq!(totes.len(), 1);
    assert_eq!(totes[0].id, "tote-1");
}

#[test]
fn storage_filter_without_kind_returns_everything() {
    let temp = tempfile::tempdir().expect("temp dir");
    let inventory = FileInventory::new(write_inventory(temp.path()));

    let all = inventory
        .fetch_storage(&StorageFilters::default())
        .expect("storage");
    let units = inventory
        .fetch_storage(&StorageFilters {
            kind: Some(StorageKind::SelfContained),
        })
        .expect("storage");

    assert_eq!(all.len(), 2);
    assert_eq!(units.len(), 1);
}

#[test]
fn submit_updates_inventory_and_appends_ledger() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = write_inventory(temp.path());
    let app = App::with_inventory(&path);

    let receipt = app
        .pack_submit(&SubmissionPayload::TotePack {
            storage_id: "tote-1".to_string(),
            item_ids: vec!["itm-1".to_string(), "itm-2".to_string()],
            mark_as_packed: true,
        })
        .expect("submit");

    assert_eq!(receipt.summary, "packed 2 item(s) into tote-1");
    assert_eq!(receipt.storage_id.as_deref(), Some("tote-1"));

    let stored = load_inventory(&path).expect("reload");
    assert!(stored.items[0].packed);
    assert!(stored.items[1].packed);
    assert_eq!(stored.storage[0].item_ids, vec!["itm-1", "itm-2"]);
    assert_eq!(stored.submissions.len(), 1);
    assert_eq!(stored.submissions[0].recorded_at, receipt.recorded_at);
}

#[test]
fn second_submission_of_same_items_is_rejected() {
    let temp = tempfile::tempdir().expect("temp dir");
    let path = write_inventory(temp.path());
    let app = App::with_inventory(&path);
    let payload = SubmissionPayload::Store {
        item_ids: vec!["itm-3".to_string()],
        location: "Barn".to_string(),
    };

    app.pack_submit(&payload).expect("first submit");
    let error = app.pack_submit(&payload).expect_err("second submit");

    assert!(format!("{error:#}").contains("no longer eligible for store"));
    assert_eq!(load_inventory(&path).expect("reload").submissions.len(), 1);
}

#[test]
fn sink_errors_are_passed_through() {
    let temp = tempfile::tempdir().expect("temp dir");
    let sink = Arc::new(RecordingSink {
        fail_with: Some("server said no".to_string()),
        ..RecordingSink::default()
    });
    let app = App::new(
        Arc::new(FileInventory::new(write_inventory(temp.path()))),
        sink.clone(),
        Arc::new(NullPhotos),
    );

    let error = app
        .pack_submit(&SubmissionPayload::ToteConfirm {
            confirmed_item_ids: vec!["itm-1".to_string()],
            photo_uploaded: false,
        })
        .expect_err("sink rejects");

    assert!(error.to_string().contains("server said no"));
    assert_eq!(sink.payloads.lock().expect("payloads lock").len(), 1);
}

#[test]
fn attach_photo_copies_beside_inventory() {
    let temp = tempfile::tempdir().expect("temp dir");
    let app = App::with_inventory(&write_inventory(temp.path()));
    let photo = temp.path().join("tote.png");
    fs::write(&photo, b"png").expect("write photo");

    let stored = app.pack_attach_photo(&photo).expect("attach");

    assert!(stored.path.starts_with(temp.path().join("photos")));
    assert!(stored.path.exists());
}

#[test]
fn missing_inventory_is_gated_before_the_wizard() {
    let temp = tempfile::tempdir().expect("temp dir");
    let missing = temp.path().join("inventory.toml");
    let app = App::with_inventory(&missing);

    let error = app
        .ensure_inventory_ready(&missing)
        .expect_err("missing inventory should fail");
    assert!(error.to_string().contains("missing inventory at"));

    let present = write_inventory(temp.path());
    app.ensure_inventory_ready(&present)
        .expect("written inventory passes");
}

#[test]
fn config_defaults_apply_when_file_is_missing() {
    let _guard = ENV_LOCK.lock().expect("env lock");
    let temp = tempfile::tempdir().expect("temp dir");
    unsafe {
        std::env::set_var("HOME", temp.path());
    }

    let app = App::with_inventory(&write_inventory(temp.path()));
    let config = app.ensure_config_ready().expect("defaults");

    assert_eq!(config.wizard.page_size, 10);
}

#[test]
fn invalid_config_mentions_its_path() {
    let _guard = ENV_LOCK.lock().expect("env lock");
    let temp = tempfile::tempdir().expect("temp dir");
    write_config(temp.path(), "version = 3\n");
    unsafe {
        std::env::set_var("HOME", temp.path());
    }

    let app = App::with_inventory(&write_inventory(temp.path()));
    let error = app.ensure_config_ready().expect_err("invalid config");

    assert!(error.to_string().contains("invalid config at"));
    assert!(error.to_string().contains("version must be 1"));
}

#[test]
fn doctor_reports_counts_for_inventory() {
    let _guard = ENV_LOCK.lock().expect("env lock");
    let temp = tempfile::tempdir().expect("temp dir");
    write_config(temp.path(), "version = 1\n");
    unsafe {
        std::env::set_var("HOME", temp.path());
    }

    let path = write_inventory(temp.path());
    let report = App::with_inventory(&path).doctor(&path).expect("doctor");

    assert!(!report.has_failures(), "{report:?}");
    let counts = report.counts.expect("counts");
    assert_eq!(counts.tote_pack, 2);
    assert_eq!(counts.single_pack, 1);
    assert_eq!(counts.store, 1);
    assert_eq!(counts.ineligible, 1);
}
