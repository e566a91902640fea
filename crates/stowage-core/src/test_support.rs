use crate::candidate::{CandidateEntity, StorageKind, StorageUnit};

pub(crate) fn item(id: &str, name: &str) -> CandidateEntity {
    CandidateEntity {
        id: id.to_string(),
        display_name: name.to_string(),
        class: None,
        class_type: None,
        packable: None,
        packing_status: false,
        single_packed: false,
        deployed: false,
    }
}

pub(crate) fn classed_item(id: &str, name: &str, class: &str) -> CandidateEntity {
    CandidateEntity {
        class: Some(class.to_string()),
        ..item(id, name)
    }
}

pub(crate) fn numbered_items(count: usize) -> Vec<CandidateEntity> {
    (1..=count)
        .map(|index| item(&format!("itm-{index:02}"), &format!("Item {index}")))
        .collect()
}

pub(crate) fn tote(id: &str, name: &str) -> StorageUnit {
    StorageUnit {
        id: id.to_string(),
        display_name: name.to_string(),
        kind: StorageKind::Tote,
        location: Some("Garage".to_string()),
        class: None,
        item_ids: Vec::new(),
    }
}
