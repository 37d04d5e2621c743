//! Fixture loading: fill a fresh store from one JSON file.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use studioinv_inventory::{EquipmentRecord, MaintenanceRecord, StudioRecord, Unit};

use crate::config::CollectionNames;
use crate::document_store::{InMemoryDocumentStore, StoreError};

/// Contents of a seed file, one array per collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeedData {
    pub studios: Vec<StudioRecord>,
    pub equipment: Vec<EquipmentRecord>,
    #[serde(alias = "equipment_units")]
    pub units: Vec<Unit>,
    #[serde(alias = "maintenance_history")]
    pub maintenance_history: Vec<MaintenanceRecord>,
}

impl SeedData {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("parsing seed data")
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).with_context(|| format!("reading seed file {}", path.display()))?;
        Self::from_json(&raw)
    }

    /// Replace every collection of `store` with this data.
    pub fn apply(&self, store: &InMemoryDocumentStore, collections: &CollectionNames) -> Result<(), StoreError> {
        store.seed_records(&collections.studios, &self.studios)?;
        store.seed_records(&collections.equipment, &self.equipment)?;
        store.seed_records(&collections.units, &self.units)?;
        store.seed_records(&collections.maintenance_history, &self.maintenance_history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_collection_names_as_keys() {
        let seed = SeedData::from_json(
            r#"{
                "studios": [{ "id": "s1", "name": "1號棚" }],
                "equipment": [{ "id": "e1", "studioId": "s1", "name": "A7S3", "category": "相機組", "quantity": 2 }],
                "equipment_units": [{ "id": "u1", "equipmentId": "e1", "unitIndex": 0 }]
            }"#,
        )
        .unwrap();

        assert_eq!(seed.studios.len(), 1);
        assert_eq!(seed.units.len(), 1);
        assert!(seed.maintenance_history.is_empty());
    }

    #[test]
    fn apply_fills_each_collection() {
        let seed = SeedData {
            studios: vec![],
            equipment: vec![],
            units: vec![Unit::new("u1", "e1", 0), Unit::new("u2", "e1", 1)],
            maintenance_history: vec![],
        };
        let store = InMemoryDocumentStore::new();
        let names = CollectionNames::default();

        seed.apply(&store, &names).unwrap();

        assert_eq!(store.documents(&names.units).len(), 2);
        assert_eq!(store.revision(&names.studios), 1);
    }

    #[test]
    fn malformed_seed_reports_context() {
        let err = SeedData::from_json("[]").unwrap_err();
        assert!(format!("{err:#}").starts_with("parsing seed data"));
    }
}
