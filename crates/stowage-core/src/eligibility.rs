use std::fmt;

use crate::candidate::CandidateEntity;

/// Predicate deciding which items a mode may offer for selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EligibilityRule {
    TotePack,
    SinglePack,
    Store,
}

impl EligibilityRule {
    pub const ALL: [Self; 3] = [Self::TotePack, Self::SinglePack, Self::Store];

    /// Stateless; never touches `entity`.
    ///
    /// An item without `packable` counts as packable, so it lands in the
    /// tote-pack bucket and never in the store bucket.
    pub fn admits(self, entity: &CandidateEntity) -> bool {
        if entity.packing_status || entity.is_receptacle() {
            return false;
        }

        match self {
            Self::TotePack => entity.packable != Some(false) && !entity.single_packed,
            Self::SinglePack => entity.single_packed,
            Self::Store => entity.packable == Some(false),
        }
    }
}

impl fmt::Display for EligibilityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TotePack => write!(f, "tote-pack"),
            Self::SinglePack => write!(f, "single-pack"),
            Self::Store => write!(f, "store"),
        }
    }
}

pub fn eligible_pool(rule: EligibilityRule, pool: &[CandidateEntity]) -> Vec<CandidateEntity> {
    pool.iter()
        .filter(|entity| rule.admits(entity))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleCounts {
    pub tote_pack: usize,
    pub single_pack: usize,
    pub store: usize,
    pub ineligible: usize,
}

impl RuleCounts {
    pub fn get(&self, rule: EligibilityRule) -> usize {
        match rule {
            EligibilityRule::TotePack => self.tote_pack,
            EligibilityRule::SinglePack => self.single_pack,
            EligibilityRule::Store => self.store,
        }
    }
}

pub fn rule_counts(pool: &[CandidateEntity]) -> RuleCounts {
    let mut counts = RuleCounts::default();
    for entity in pool {
        let mut matched = false;
        for rule in EligibilityRule::ALL {
            if !rule.admits(entity) {
                continue;
            }
            matched = true;
            match rule {
                EligibilityRule::TotePack => counts.tote_pack += 1,
                EligibilityRule::SinglePack => counts.single_pack += 1,
                EligibilityRule::Store => counts.store += 1,
            }
        }
        if !matched {
            counts.ineligible += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::item;

    fn admitted_by(entity: &CandidateEntity) -> Vec<EligibilityRule> {
        EligibilityRule::ALL
            .into_iter()
            .filter(|rule| rule.admits(entity))
            .collect()
    }

    #[test]
    fn unpackable_unpacked_item_is_store_only() {
        let mut entity = item("itm-1", "Kayak");
        entity.packable = Some(false);

        assert_eq!(admitted_by(&entity), vec![EligibilityRule::Store]);
    }

    #[test]
    fn missing_packable_defaults_to_tote_pack_not_store() {
        let entity = item("itm-1", "Lantern");
        assert_eq!(entity.packable, None);

        assert!(EligibilityRule::TotePack.admits(&entity));
        assert!(!EligibilityRule::Store.admits(&entity));
    }

    #[test]
    fn single_packed_item_leaves_tote_pack_bucket() {
        let mut entity = item("itm-1", "Drone");
        entity.packable = Some(true);
        entity.single_packed = true;

        assert_eq!(admitted_by(&entity), vec![EligibilityRule::SinglePack]);
    }

    #[test]
    fn packed_items_and_receptacles_are_never_eligible() {
        let mut packed = item("itm-1", "Tent");
        packed.packing_status = true;
        assert!(admitted_by(&packed).is_empty());

        let mut receptacle = item("itm-2", "Bin");
        receptacle.class_type = Some("Receptacle".to_string());
        assert!(admitted_by(&receptacle).is_empty());
    }

    #[test]
    fn explicit_packable_rules_are_mutually_exclusive() {
        for packable in [true, false] {
            for packing_status in [true, false] {
                for single_packed in [true, false] {
                    for class_type in [None, Some("Receptacle"), Some("Gear")] {
                        let mut entity = item("itm", "Thing");
                        entity.packable = Some(packable);
                        entity.packing_status = packing_status;
                        entity.single_packed = single_packed;
                        entity.class_type = class_type.map(str::to_string);

                        assert!(
                            admitted_by(&entity).len() <= 1,
                            "more than one rule admitted {entity:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn eligible_pool_keeps_pool_order() {
        let mut kayak = item("itm-2", "Kayak");
        kayak.packable = Some(false);
        let pool = vec![item("itm-1", "Lantern"), kayak, item("itm-3", "Stove")];

        let ids: Vec<String> = eligible_pool(EligibilityRule::TotePack, &pool)
            .into_iter()
            .map(|entity| entity.id)
            .collect();
        assert_eq!(ids, vec!["itm-1", "itm-3"]);
    }

    #[test]
    fn rule_counts_tallies_each_bucket() {
        let mut kayak = item("itm-2", "Kayak");
        kayak.packable = Some(false);
        let mut drone = item("itm-3", "Drone");
        drone.single_packed = true;
        let mut tent = item("itm-4", "Tent");
        tent.packing_status = true;

        let counts = rule_counts(&[item("itm-1", "Lantern"), kayak, drone, tent]);
        assert_eq!(
            counts,
            RuleCounts {
                tote_pack: 1,
                single_pack: 1,
                store: 1,
                ineligible: 1,
            }
        );
        assert_eq!(counts.get(EligibilityRule::Store), 1);
    }
}
