//! Field-level changes a client can make to a unit.
//!
//! Each variant touches exactly one logical field. The store pairs every
//! change with a `checkedBy` write naming the actor.

use crate::record::fields;
use crate::status::{LabelStatus, UnitStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitChange {
    Status(UnitStatus),
    LabelStatus(LabelStatus),
    LabelRemark(String),
    Remark(String),
    /// Flip `replacementPending`; resolved by the backing store, not the client.
    ToggleReplacementPending,
}

impl UnitChange {
    /// Document field written by this change.
    pub fn field(&self) -> &'static str {
        match self {
            UnitChange::Status(_) => fields::STATUS,
            UnitChange::LabelStatus(_) => fields::LABEL_STATUS,
            UnitChange::LabelRemark(_) => fields::LABEL_REMARK,
            UnitChange::Remark(_) => fields::REMARK,
            UnitChange::ToggleReplacementPending => fields::REPLACEMENT_PENDING,
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UnitChange::Status(_) => "status",
            UnitChange::LabelStatus(_) => "label_status",
            UnitChange::LabelRemark(_) => "label_remark",
            UnitChange::Remark(_) => "remark",
            UnitChange::ToggleReplacementPending => "toggle_replacement_pending",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_change_targets_one_field() {
        let changes = [
            UnitChange::Status(UnitStatus::Normal),
            UnitChange::LabelStatus(LabelStatus::Labeled),
            UnitChange::LabelRemark("x".into()),
            UnitChange::Remark("y".into()),
            UnitChange::ToggleReplacementPending,
        ];
        let mut fields: Vec<_> = changes.iter().map(UnitChange::field).collect();
        fields.sort();
        fields.dedup();
        assert_eq!(fields.len(), changes.len());
        assert!(!fields.contains(&crate::record::fields::CHECKED_BY));
    }
}
