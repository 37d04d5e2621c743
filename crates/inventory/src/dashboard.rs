//! Read-only dashboard queries over the derived tree.

use core::str::FromStr;

use studioinv_core::DomainError;

use crate::record::Unit;
use crate::status::{EquipmentCategory, LabelStatus, UnitStatus};
use crate::tree::{Equipment, Studio};

/// Headline counts across every studio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub damaged: usize,
    pub lost: usize,
    pub outgoing: usize,
    pub repaired: usize,
    pub replacement_pending: usize,
    pub labeled: usize,
    pub unlabeled: usize,
    pub total_units: usize,
    pub checked_units: usize,
}

impl DashboardStats {
    pub fn collect(studios: &[Studio]) -> Self {
        let mut stats = Self::default();
        for (_, unit) in studios.iter().flat_map(|s| s.units()) {
            stats.total_units += 1;
            match unit.status {
                UnitStatus::Damaged => stats.damaged += 1,
                UnitStatus::Lost => stats.lost += 1,
                UnitStatus::OutForMaintenance => stats.outgoing += 1,
                UnitStatus::Repaired => stats.repaired += 1,
                _ => {}
            }
            if unit.status.is_checked() {
                stats.checked_units += 1;
            }
            if unit.replacement_pending {
                stats.replacement_pending += 1;
            }
            match unit.label_status {
                LabelStatus::Labeled => stats.labeled += 1,
                LabelStatus::Unlabeled => stats.unlabeled += 1,
                LabelStatus::LabelDamaged => {}
            }
        }
        stats
    }
}

/// Which units the issue view lists.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum IssueFilter {
    /// Damaged, lost, out, awaiting label replacement, or unlabeled.
    #[default]
    All,
    Damaged,
    Lost,
    Outgoing,
    LabelReplacement,
    Unlabeled,
    /// Not an issue as such; lets the view list labeled units.
    Labeled,
}

impl IssueFilter {
    pub fn matches(self, unit: &Unit) -> bool {
        match self {
            IssueFilter::All => {
                matches!(
                    unit.status,
                    UnitStatus::Damaged | UnitStatus::Lost | UnitStatus::OutForMaintenance
                ) || unit.replacement_pending
                    || unit.label_status == LabelStatus::Unlabeled
            }
            IssueFilter::Damaged => unit.status == UnitStatus::Damaged,
            IssueFilter::Lost => unit.status == UnitStatus::Lost,
            IssueFilter::Outgoing => unit.status == UnitStatus::OutForMaintenance,
            IssueFilter::LabelReplacement => unit.replacement_pending,
            IssueFilter::Unlabeled => unit.label_status == LabelStatus::Unlabeled,
            IssueFilter::Labeled => unit.label_status == LabelStatus::Labeled,
        }
    }
}

impl FromStr for IssueFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(IssueFilter::All),
            "damaged" => Ok(IssueFilter::Damaged),
            "lost" => Ok(IssueFilter::Lost),
            "outgoing" => Ok(IssueFilter::Outgoing),
            "label" | "label_replacement" => Ok(IssueFilter::LabelReplacement),
            "unlabeled" => Ok(IssueFilter::Unlabeled),
            "has_label" | "labeled" => Ok(IssueFilter::Labeled),
            other => Err(DomainError::validation(format!("unknown issue filter '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Issue<'a> {
    pub equipment: &'a Equipment,
    pub unit: &'a Unit,
}

#[derive(Debug, Clone)]
pub struct StudioIssues<'a> {
    pub studio: &'a Studio,
    pub issues: Vec<Issue<'a>>,
}

/// Units matching `filter`, grouped by studio. Studios with no match are omitted.
pub fn issues(studios: &[Studio], filter: IssueFilter) -> Vec<StudioIssues<'_>> {
    studios
        .iter()
        .filter_map(|studio| {
            let issues: Vec<_> = studio
                .units()
                .filter(|(_, unit)| filter.matches(unit))
                .map(|(equipment, unit)| Issue { equipment, unit })
                .collect();
            (!issues.is_empty()).then_some(StudioIssues { studio, issues })
        })
        .collect()
}

/// Checked units out of the units that actually exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub checked: usize,
    pub total: usize,
}

impl Progress {
    pub fn of_equipment(equipment: &Equipment) -> Self {
        Self {
            checked: equipment.units.iter().filter(|u| u.status.is_checked()).count(),
            total: equipment.unit_count(),
        }
    }

    pub fn of_studio(studio: &Studio) -> Self {
        studio
            .equipment
            .iter()
            .map(Self::of_equipment)
            .fold(Self::default(), |acc, p| Self {
                checked: acc.checked + p.checked,
                total: acc.total + p.total,
            })
    }

    pub fn is_complete(&self) -> bool {
        self.checked == self.total
    }
}

/// Per-equipment row of the summary table and the spreadsheet export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentSummary {
    pub name: String,
    pub category: EquipmentCategory,
    pub normal: usize,
    pub checked: usize,
    pub declared_quantity: u32,
    pub actual_units: usize,
}

impl EquipmentSummary {
    pub fn of(equipment: &Equipment) -> Self {
        Self {
            name: equipment.name.clone(),
            category: equipment.category,
            normal: equipment
                .units
                .iter()
                .filter(|u| u.status == UnitStatus::Normal)
                .count(),
            checked: Progress::of_equipment(equipment).checked,
            declared_quantity: equipment.quantity,
            actual_units: equipment.unit_count(),
        }
    }

    /// Every declared item is accounted for as normal.
    pub fn fully_normal(&self) -> bool {
        self.normal == self.declared_quantity as usize
    }

    pub fn quantity_mismatch(&self) -> bool {
        self.actual_units != self.declared_quantity as usize
    }
}

/// Equipment grouped by category, categories in first-appearance order.
pub fn group_by_category(equipment: &[Equipment]) -> Vec<(EquipmentCategory, Vec<&Equipment>)> {
    let mut groups: Vec<(EquipmentCategory, Vec<&Equipment>)> = Vec::new();
    for item in equipment {
        match groups.iter().position(|(category, _)| *category == item.category) {
            Some(idx) => groups[idx].1.push(item),
            None => groups.push((item.category, vec![item])),
        }
    }
    groups
}
