//! Stored record types, one per backing-store collection.
//!
//! Records are flat: equipment points at its studio, units point at their
//! equipment. The nested view is produced by [`crate::tree::derive_tree`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use studioinv_core::{Entity, EquipmentId, MaintenanceRecordId, StudioId, UnitId};

use crate::status::{EquipmentCategory, LabelStatus, UnitStatus};

/// Document field names shared with the infrastructure layer.
pub mod fields {
    pub const ASSIGNEES: &str = "assignees";
    pub const STATUS: &str = "status";
    pub const LABEL_STATUS: &str = "labelStatus";
    pub const LABEL_REMARK: &str = "labelRemark";
    pub const REMARK: &str = "remark";
    pub const REPLACEMENT_PENDING: &str = "replacementPending";
    pub const CHECKED_BY: &str = "checkedBy";

    pub const UNIT_ID: &str = "unitId";
    pub const EQUIPMENT_ID: &str = "equipmentId";
    pub const EQUIPMENT_NAME: &str = "equipmentName";
    pub const UNIT_LABEL: &str = "unitLabel";
    pub const STUDIO_ID: &str = "studioId";
    pub const STUDIO_NAME: &str = "studioName";
    pub const PREVIOUS_STATUS: &str = "previousStatus";
    pub const SENT_TO_MAINTENANCE_AT: &str = "sentToMaintenanceAt";
    pub const SENT_BY: &str = "sentBy";
    pub const RETURNED_AT: &str = "returnedAt";
    pub const RETURNED_BY: &str = "returnedBy";
    pub const NOTES: &str = "notes";
    pub const CREATED_AT: &str = "createdAt";
}

/// Studio document (`studios` collection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioRecord {
    pub id: StudioId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub theme_color: String,
    /// Signed-in checkers, in sign-in order.
    #[serde(default)]
    pub assignees: Vec<String>,
}

impl Entity for StudioRecord {
    type Id = StudioId;

    fn id(&self) -> &StudioId {
        &self.id
    }
}

/// Equipment definition document (`equipment` collection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentRecord {
    pub id: EquipmentId,
    pub studio_id: StudioId,
    pub name: String,
    pub category: EquipmentCategory,
    /// Declared catalog quantity. May disagree with the number of unit documents.
    #[serde(default)]
    pub quantity: u32,
    /// Measure word shown next to counts ("台", "支", "pcs").
    #[serde(default)]
    pub unit: String,
}

impl Entity for EquipmentRecord {
    type Id = EquipmentId;

    fn id(&self) -> &EquipmentId {
        &self.id
    }
}

/// One physical unit (`equipment_units` collection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: UnitId,
    pub equipment_id: EquipmentId,
    #[serde(default)]
    pub unit_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_label: Option<String>,
    #[serde(default)]
    pub status: UnitStatus,
    #[serde(default)]
    pub label_status: LabelStatus,
    #[serde(default)]
    pub replacement_pending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_remark: Option<String>,
    #[serde(default)]
    pub remark: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_by: Option<String>,
}

impl Unit {
    /// A fresh, never-checked unit.
    pub fn new(id: impl Into<UnitId>, equipment_id: impl Into<EquipmentId>, unit_index: u32) -> Self {
        Self {
            id: id.into(),
            equipment_id: equipment_id.into(),
            unit_index,
            unit_label: None,
            status: UnitStatus::Unchecked,
            label_status: LabelStatus::Unlabeled,
            replacement_pending: false,
            label_remark: None,
            remark: String::new(),
            checked_by: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.unit_label = Some(label.into());
        self.label_status = LabelStatus::Labeled;
        self
    }

    /// Label if present and non-blank, else `#<index + 1>`.
    pub fn display_label(&self) -> String {
        match self.unit_label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => format!("#{}", u64::from(self.unit_index) + 1),
        }
    }
}

impl Entity for Unit {
    type Id = UnitId;

    fn id(&self) -> &UnitId {
        &self.id
    }
}

/// Maintenance-return history entry (`maintenance_history` collection).
///
/// Names are copied in at write time so the entry stays readable even if the
/// equipment is later renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRecord {
    pub id: MaintenanceRecordId,
    pub unit_id: UnitId,
    pub equipment_id: EquipmentId,
    pub equipment_name: String,
    pub unit_label: String,
    pub studio_id: StudioId,
    pub studio_name: String,
    /// Unit status immediately before it was marked repaired.
    pub previous_status: UnitStatus,
    pub sent_to_maintenance_at: DateTime<Utc>,
    pub sent_by: String,
    pub returned_at: DateTime<Utc>,
    pub returned_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for MaintenanceRecord {
    type Id = MaintenanceRecordId;

    fn id(&self) -> &MaintenanceRecordId {
        &self.id
    }
}
