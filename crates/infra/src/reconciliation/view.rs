use std::sync::Arc;

use studioinv_core::{find_by_id, DomainResult, EquipmentId, MaintenanceRecordId, StudioId, UnitId};
use studioinv_inventory::{
    locate_unit, DashboardStats, DeriveReport, HistoryQuery, EquipmentRecord, MaintenanceRecord, Studio, StudioRecord, Unit,
    UnitLocation,
};

/// Which source collection a snapshot belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    Studios,
    Equipment,
    Units,
    MaintenanceHistory,
}

impl Source {
    pub const ALL: [Source; 4] = [
        Source::Studios,
        Source::Equipment,
        Source::Units,
        Source::MaintenanceHistory,
    ];

    /// Whether the derived tree depends on this source.
    pub fn feeds_tree(self) -> bool {
        !matches!(self, Source::MaintenanceHistory)
    }
}

/// Latest applied snapshot of one collection.
#[derive(Debug, Clone)]
pub(crate) struct Slot<T> {
    pub(crate) revision: Option<u64>,
    pub(crate) items: Arc<[T]>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            revision: None,
            items: Arc::from(Vec::new()),
        }
    }
}

/// The four snapshots, replaced one slot at a time but always read together.
#[derive(Debug, Default)]
pub(crate) struct SnapshotSet {
    pub(crate) studios: Slot<StudioRecord>,
    pub(crate) equipment: Slot<EquipmentRecord>,
    pub(crate) units: Slot<Unit>,
    pub(crate) history: Slot<MaintenanceRecord>,
    pub(crate) version: u64,
}

impl SnapshotSet {
    pub(crate) fn revision(&self, source: Source) -> Option<u64> {
        match source {
            Source::Studios => self.studios.revision,
            Source::Equipment => self.equipment.revision,
            Source::Units => self.units.revision,
            Source::MaintenanceHistory => self.history.revision,
        }
    }

    pub(crate) fn tree_loaded(&self) -> bool {
        self.studios.revision.is_some() && self.equipment.revision.is_some() && self.units.revision.is_some()
    }
}

/// Immutable, fully derived view handed to observers.
///
/// Every field comes from the same snapshot set; a new value is published
/// whenever any source snapshot is replaced.
#[derive(Debug, Clone, Default)]
pub struct InventoryView {
    pub studios: Arc<[Studio]>,
    pub maintenance_history: Arc<[MaintenanceRecord]>,
    pub report: DeriveReport,
    /// Bumped once per applied snapshot; 0 before anything arrived.
    pub version: u64,
    /// Studios, equipment and units have each delivered at least one snapshot.
    pub loaded: bool,
}

impl InventoryView {
    pub fn studio(&self, id: &StudioId) -> Option<&Studio> {
        find_by_id(&self.studios, id)
    }

    pub fn locate(
        &self,
        studio_id: &StudioId,
        equipment_id: &EquipmentId,
        unit_id: &UnitId,
    ) -> DomainResult<UnitLocation<'_>> {
        locate_unit(&self.studios, studio_id, equipment_id, unit_id)
    }

    pub fn unit(&self, studio_id: &StudioId, equipment_id: &EquipmentId, unit_id: &UnitId) -> Option<&Unit> {
        self.locate(studio_id, equipment_id, unit_id).ok().map(|loc| loc.unit)
    }

    pub fn maintenance_record(&self, id: &MaintenanceRecordId) -> Option<&MaintenanceRecord> {
        find_by_id(&self.maintenance_history, id)
    }

    /// Filtered history, newest first.
    pub fn history(&self, query: &HistoryQuery) -> Vec<&MaintenanceRecord> {
        query.apply(&self.maintenance_history)
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::collect(&self.studios)
    }
}
