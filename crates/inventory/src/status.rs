//! Closed enumerations carried by every unit and equipment record.
//!
//! On the wire each value is a snake_case token. The legacy display labels
//! written by earlier clients are accepted as aliases when decoding.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use studioinv_core::DomainError;

/// Check status of a single physical unit.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    /// Not yet checked in the current round.
    #[default]
    #[serde(alias = "未清點")]
    Unchecked,
    #[serde(alias = "正常")]
    Normal,
    #[serde(alias = "損壞")]
    Damaged,
    #[serde(alias = "遺失")]
    Lost,
    /// Out of the studio (shoot or repair shop).
    #[serde(alias = "外出拍攝")]
    OutForMaintenance,
    /// Back from repair; set by the maintenance-return flow.
    #[serde(alias = "已維修")]
    Repaired,
}

impl UnitStatus {
    pub const ALL: [UnitStatus; 6] = [
        UnitStatus::Unchecked,
        UnitStatus::Normal,
        UnitStatus::Damaged,
        UnitStatus::Lost,
        UnitStatus::OutForMaintenance,
        UnitStatus::Repaired,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UnitStatus::Unchecked => "unchecked",
            UnitStatus::Normal => "normal",
            UnitStatus::Damaged => "damaged",
            UnitStatus::Lost => "lost",
            UnitStatus::OutForMaintenance => "out_for_maintenance",
            UnitStatus::Repaired => "repaired",
        }
    }

    /// Display label used by the original clients.
    pub fn legacy_label(self) -> &'static str {
        match self {
            UnitStatus::Unchecked => "未清點",
            UnitStatus::Normal => "正常",
            UnitStatus::Damaged => "損壞",
            UnitStatus::Lost => "遺失",
            UnitStatus::OutForMaintenance => "外出拍攝",
            UnitStatus::Repaired => "已維修",
        }
    }

    /// Anything other than `Unchecked` counts towards check progress.
    pub fn is_checked(self) -> bool {
        self != UnitStatus::Unchecked
    }
}

impl core::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        UnitStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s || v.legacy_label() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown unit status '{s}'")))
    }
}

/// Physical label condition of a unit.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStatus {
    #[serde(alias = "有標籤")]
    Labeled,
    #[default]
    #[serde(alias = "無標籤")]
    Unlabeled,
    #[serde(alias = "標籤損毀")]
    LabelDamaged,
}

impl LabelStatus {
    pub const ALL: [LabelStatus; 3] = [
        LabelStatus::Labeled,
        LabelStatus::Unlabeled,
        LabelStatus::LabelDamaged,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LabelStatus::Labeled => "labeled",
            LabelStatus::Unlabeled => "unlabeled",
            LabelStatus::LabelDamaged => "label_damaged",
        }
    }

    pub fn legacy_label(self) -> &'static str {
        match self {
            LabelStatus::Labeled => "有標籤",
            LabelStatus::Unlabeled => "無標籤",
            LabelStatus::LabelDamaged => "標籤損毀",
        }
    }
}

impl core::fmt::Display for LabelStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        LabelStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s || v.legacy_label() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown label status '{s}'")))
    }
}

/// Equipment category (closed set, used for grouping on every view).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentCategory {
    #[serde(alias = "相機組")]
    Camera,
    #[serde(alias = "腳架組")]
    Tripod,
    #[serde(alias = "圖傳Monitor")]
    Monitor,
    #[serde(alias = "燈光組")]
    Lighting,
    #[serde(alias = "收音組")]
    Audio,
    #[serde(alias = "線材電池組")]
    CablesBatteries,
    #[serde(alias = "記憶卡")]
    MemoryCards,
}

impl EquipmentCategory {
    pub const ALL: [EquipmentCategory; 7] = [
        EquipmentCategory::Camera,
        EquipmentCategory::Tripod,
        EquipmentCategory::Monitor,
        EquipmentCategory::Lighting,
        EquipmentCategory::Audio,
        EquipmentCategory::CablesBatteries,
        EquipmentCategory::MemoryCards,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EquipmentCategory::Camera => "camera",
            EquipmentCategory::Tripod => "tripod",
            EquipmentCategory::Monitor => "monitor",
            EquipmentCategory::Lighting => "lighting",
            EquipmentCategory::Audio => "audio",
            EquipmentCategory::CablesBatteries => "cables_batteries",
            EquipmentCategory::MemoryCards => "memory_cards",
        }
    }

    pub fn legacy_label(self) -> &'static str {
        match self {
            EquipmentCategory::Camera => "相機組",
            EquipmentCategory::Tripod => "腳架組",
            EquipmentCategory::Monitor => "圖傳Monitor",
            EquipmentCategory::Lighting => "燈光組",
            EquipmentCategory::Audio => "收音組",
            EquipmentCategory::CablesBatteries => "線材電池組",
            EquipmentCategory::MemoryCards => "記憶卡",
        }
    }
}

impl core::fmt::Display for EquipmentCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquipmentCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        EquipmentCategory::ALL
            .into_iter()
            .find(|v| v.as_str() == s || v.legacy_label() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown equipment category '{s}'")))
    }
}
