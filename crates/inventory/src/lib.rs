//! Studio inventory domain module.
//!
//! This crate contains the inventory data model and the pure logic built on
//! it: the snapshot merge that produces the studio → equipment → unit tree,
//! dashboard and history queries, and the recent-user list. No IO, no async,
//! no storage.

pub mod change;
pub mod dashboard;
pub mod history;
pub mod record;
pub mod status;
pub mod tree;
pub mod user_history;

pub use change::UnitChange;
pub use dashboard::{
    group_by_category, issues, DashboardStats, EquipmentSummary, Issue, IssueFilter, Progress,
    StudioIssues,
};
pub use history::HistoryQuery;
pub use record::{EquipmentRecord, MaintenanceRecord, StudioRecord, Unit};
pub use status::{EquipmentCategory, LabelStatus, UnitStatus};
pub use tree::{derive_tree, locate_unit, DeriveReport, Derivation, Equipment, Studio, UnitLocation};
pub use user_history::{UserHistory, DEFAULT_USER_HISTORY_CAPACITY};
