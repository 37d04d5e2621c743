//! Snapshot merge: flat records → studio → equipment → unit tree.
//!
//! The three source collections change independently and in no particular
//! order, so [`derive_tree`] makes no assumption about their relative
//! freshness. Children whose parent is absent are left out of the tree and
//! counted in the [`DeriveReport`]; they are never an error.

use std::collections::{HashMap, HashSet};

use studioinv_core::{find_by_id, DomainError, DomainResult, Entity, EquipmentId, StudioId, UnitId};

use crate::record::{EquipmentRecord, StudioRecord, Unit};
use crate::status::EquipmentCategory;

/// Studio with its equipment attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Studio {
    pub id: StudioId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub theme_color: String,
    pub assignees: Vec<String>,
    pub equipment: Vec<Equipment>,
}

impl Studio {
    pub fn find_equipment(&self, id: &EquipmentId) -> Option<&Equipment> {
        find_by_id(&self.equipment, id)
    }

    /// All units of all equipment in this studio.
    pub fn units(&self) -> impl Iterator<Item = (&Equipment, &Unit)> {
        self.equipment
            .iter()
            .flat_map(|e| e.units.iter().map(move |u| (e, u)))
    }
}

impl Entity for Studio {
    type Id = StudioId;

    fn id(&self) -> &StudioId {
        &self.id
    }
}

/// Equipment with its units attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equipment {
    pub id: EquipmentId,
    pub studio_id: StudioId,
    pub name: String,
    pub category: EquipmentCategory,
    pub quantity: u32,
    pub unit: String,
    pub units: Vec<Unit>,
}

impl Equipment {
    pub fn find_unit(&self, id: &UnitId) -> Option<&Unit> {
        find_by_id(&self.units, id)
    }

    /// Actual number of unit documents (may differ from `quantity`).
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

impl Entity for Equipment {
    type Id = EquipmentId;

    fn id(&self) -> &EquipmentId {
        &self.id
    }
}

/// Anomalies absorbed while deriving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeriveReport {
    /// Equipment whose studio is not in the studios snapshot.
    pub orphaned_equipment: usize,
    /// Units whose equipment did not make it into the tree.
    pub orphaned_units: usize,
}

impl DeriveReport {
    pub fn is_clean(&self) -> bool {
        self.orphaned_equipment == 0 && self.orphaned_units == 0
    }
}

/// Result of one derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    pub studios: Vec<Studio>,
    pub report: DeriveReport,
}

/// Merge the three snapshots into the nested view.
///
/// Pure: the output depends only on the inputs, so recomputing on every
/// change cannot drift. Order follows snapshot arrival order at every level.
pub fn derive_tree(studios: &[StudioRecord], equipment: &[EquipmentRecord], units: &[Unit]) -> Derivation {
    let mut units_by_equipment: HashMap<&EquipmentId, Vec<&Unit>> = HashMap::new();
    for unit in units {
        units_by_equipment.entry(&unit.equipment_id).or_default().push(unit);
    }

    let mut equipment_by_studio: HashMap<&StudioId, Vec<&EquipmentRecord>> = HashMap::new();
    for item in equipment {
        equipment_by_studio.entry(&item.studio_id).or_default().push(item);
    }

    let known_studios: HashSet<&StudioId> = studios.iter().map(|s| &s.id).collect();
    let mut attached_equipment: HashSet<&EquipmentId> = HashSet::new();

    let tree: Vec<Studio> = studios
        .iter()
        .map(|studio| {
            let items = equipment_by_studio
                .get(&studio.id)
                .map(|items| {
                    items
                        .iter()
                        .map(|&item| {
                            attached_equipment.insert(&item.id);
                            Equipment {
                                id: item.id.clone(),
                                studio_id: item.studio_id.clone(),
                                name: item.name.clone(),
                                category: item.category,
                                quantity: item.quantity,
                                unit: item.unit.clone(),
                                units: units_by_equipment
                                    .get(&item.id)
                                    .map(|us| us.iter().map(|u| (*u).clone()).collect())
                                    .unwrap_or_default(),
                            }
                        })
                        .collect()
                })
                .unwrap_or_default();

            Studio {
                id: studio.id.clone(),
                name: studio.name.clone(),
                description: studio.description.clone(),
                icon: studio.icon.clone(),
                theme_color: studio.theme_color.clone(),
                assignees: dedup_preserving_order(&studio.assignees),
                equipment: items,
            }
        })
        .collect();

    let report = DeriveReport {
        orphaned_equipment: equipment
            .iter()
            .filter(|e| !known_studios.contains(&e.studio_id))
            .count(),
        orphaned_units: units
            .iter()
            .filter(|u| !attached_equipment.contains(&u.equipment_id))
            .count(),
    };

    Derivation { studios: tree, report }
}

fn dedup_preserving_order(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter(|n| seen.insert(n.as_str()))
        .cloned()
        .collect()
}

/// A resolved (studio, equipment, unit) triple.
#[derive(Debug, Clone, Copy)]
pub struct UnitLocation<'a> {
    pub studio: &'a Studio,
    pub equipment: &'a Equipment,
    pub unit: &'a Unit,
}

/// Resolve a mutation target against the derived tree.
///
/// Fails with [`DomainError::NotFound`] naming the first missing level.
pub fn locate_unit<'a>(
    studios: &'a [Studio],
    studio_id: &StudioId,
    equipment_id: &EquipmentId,
    unit_id: &UnitId,
) -> DomainResult<UnitLocation<'a>> {
    let studio = find_by_id(studios, studio_id)
        .ok_or_else(|| DomainError::not_found(format!("studio {studio_id}")))?;
    let equipment = studio
        .find_equipment(equipment_id)
        .ok_or_else(|| DomainError::not_found(format!("equipment {equipment_id} in studio {studio_id}")))?;
    let unit = equipment
        .find_unit(unit_id)
        .ok_or_else(|| DomainError::not_found(format!("unit {unit_id} of equipment {equipment_id}")))?;

    Ok(UnitLocation { studio, equipment, unit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::UnitStatus;
    use proptest::prelude::*;

    fn studio(id: &str) -> StudioRecord {
        StudioRecord {
            id: id.into(),
            name: format!("{id} name"),
            description: String::new(),
            icon: String::new(),
            theme_color: String::new(),
            assignees: vec![],
        }
    }

    fn equipment(id: &str, studio_id: &str, quantity: u32) -> EquipmentRecord {
        EquipmentRecord {
            id: id.into(),
            studio_id: studio_id.into(),
            name: format!("{id} name"),
            category: EquipmentCategory::Camera,
            quantity,
            unit: "台".into(),
        }
    }

    #[test]
    fn nests_units_under_equipment_under_studio() {
        let studios = vec![studio("s1"), studio("s2")];
        let items = vec![equipment("e1", "s1", 2), equipment("e2", "s2", 1)];
        let units = vec![Unit::new("u1", "e1", 0), Unit::new("u2", "e1", 1), Unit::new("u3", "e2", 0)];

        let Derivation { studios: tree, report } = derive_tree(&studios, &items, &units);

        assert!(report.is_clean());
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].equipment.len(), 1);
        let ids: Vec<_> = tree[0].equipment[0].units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["u1", "u2"]);
        assert_eq!(tree[1].equipment[0].units[0].id.as_str(), "u3");
    }

    #[test]
    fn missing_children_default_to_empty() {
        let studios = vec![studio("s1")];
        let items = vec![equipment("e1", "s1", 4)];

        let derived = derive_tree(&studios, &items, &[]);
        assert_eq!(derived.studios[0].equipment[0].units.len(), 0);

        let derived = derive_tree(&studios, &[], &[]);
        assert!(derived.studios[0].equipment.is_empty());
    }

    #[test]
    fn orphans_are_excluded_and_counted() {
        let studios = vec![studio("s1")];
        let items = vec![equipment("e1", "s1", 1), equipment("e-orphan", "gone", 1)];
        let units = vec![
            Unit::new("u1", "e1", 0),
            Unit::new("u-under-orphan", "e-orphan", 0),
            Unit::new("u-dangling", "nowhere", 0),
        ];

        let derived = derive_tree(&studios, &items, &units);

        assert_eq!(derived.studios.len(), 1);
        assert_eq!(derived.studios[0].equipment.len(), 1);
        assert_eq!(derived.report.orphaned_equipment, 1);
        assert_eq!(derived.report.orphaned_units, 2);
    }

    #[test]
    fn quantity_mismatch_is_tolerated() {
        let studios = vec![studio("s1")];
        let items = vec![equipment("e1", "s1", 3)];
        let units = vec![Unit::new("u1", "e1", 0), Unit::new("u2", "e1", 1)];

        let derived = derive_tree(&studios, &items, &units);
        let e = &derived.studios[0].equipment[0];
        assert_eq!(e.quantity, 3);
        assert_eq!(e.unit_count(), 2);
    }

    #[test]
    fn duplicate_assignees_collapse() {
        let mut s = studio("s1");
        s.assignees = vec!["Alice".into(), "Bob".into(), "Alice".into()];
        let derived = derive_tree(&[s], &[], &[]);
        assert_eq!(derived.studios[0].assignees, ["Alice", "Bob"]);
    }

    #[test]
    fn locate_unit_reports_missing_level() {
        let studios = vec![studio("s1")];
        let items = vec![equipment("e1", "s1", 1)];
        let units = vec![Unit::new("u1", "e1", 0)];
        let tree = derive_tree(&studios, &items, &units).studios;

        let found = locate_unit(&tree, &"s1".into(), &"e1".into(), &"u1".into()).unwrap();
        assert_eq!(found.unit.status, UnitStatus::Unchecked);
        assert_eq!(found.studio.id.as_str(), "s1");

        let err = locate_unit(&tree, &"s9".into(), &"e1".into(), &"u1".into()).unwrap_err();
        assert_eq!(err, DomainError::NotFound("studio s9".into()));

        let err = locate_unit(&tree, &"s1".into(), &"e9".into(), &"u1".into()).unwrap_err();
        assert!(err.is_not_found());

        let err = locate_unit(&tree, &"s1".into(), &"e1".into(), &"u9".into()).unwrap_err();
        assert_eq!(err, DomainError::NotFound("unit u9 of equipment e1".into()));
    }

    proptest! {
        /// Property: every unit whose equipment and studio are present appears
        /// exactly once in the tree, under the right parents.
        #[test]
        fn every_fully_parented_unit_appears_once(
            studio_count in 1usize..4,
            equipment_parents in prop::collection::vec(0usize..5, 0..8),
            unit_parents in prop::collection::vec(0usize..10, 0..20),
        ) {
            let studios: Vec<_> = (0..studio_count).map(|i| studio(&format!("s{i}"))).collect();
            let items: Vec<_> = equipment_parents
                .iter()
                .enumerate()
                .map(|(i, s)| equipment(&format!("e{i}"), &format!("s{s}"), 1))
                .collect();
            let units: Vec<_> = unit_parents
                .iter()
                .enumerate()
                .map(|(i, e)| Unit::new(format!("u{i}"), format!("e{e}"), i as u32))
                .collect();

            let derived = derive_tree(&studios, &items, &units);

            let mut placed = 0usize;
            for unit in &units {
                let parent = items.iter().find(|e| e.id == unit.equipment_id);
                let expected = parent.filter(|e| studios.iter().any(|s| s.id == e.studio_id));
                let hits: Vec<_> = derived
                    .studios
                    .iter()
                    .flat_map(|s| s.units())
                    .filter(|(_, u)| u.id == unit.id)
                    .collect();

                match expected {
                    Some(e) => {
                        prop_assert_eq!(hits.len(), 1);
                        prop_assert_eq!(&hits[0].0.id, &e.id);
                        placed += 1;
                    }
                    None => prop_assert!(hits.is_empty()),
                }
            }
            prop_assert_eq!(derived.report.orphaned_units, units.len() - placed);
        }
    }
}
