use std::sync::{Arc, RwLock};

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use studioinv_core::{require_name, DomainError, EquipmentId, MaintenanceRecordId, StudioId, UnitId};
use studioinv_inventory::record::fields;
use studioinv_inventory::{derive_tree, LabelStatus, UnitChange, UnitLocation, UnitStatus};

use crate::config::CollectionNames;
use crate::document_store::{CollectionSnapshot, DocumentStore, FieldWrite, StoreError, Write};

use super::error::InventoryError;
use super::feeds::StoreFeeds;
use super::view::{InventoryView, Slot, SnapshotSet, Source};

/// Reconciliation store over a [`DocumentStore`] backend.
///
/// ## Reads
///
/// [`current`](Self::current) returns the latest derived view;
/// [`subscribe`](Self::subscribe) returns a watch receiver that sees every
/// new one. Views are replaced wholesale, never patched.
///
/// ## Snapshot intake
///
/// [`apply_snapshot`](Self::apply_snapshot) accepts full collection snapshots
/// (normally pumped by [`crate::workers::SyncWorker`]). Per collection, a
/// snapshot whose revision is not newer than the last applied one is ignored,
/// so at-least-once delivery is safe.
///
/// ## Writes
///
/// Every mutation validates its inputs, resolves its target against the
/// current view and commits to the backend. Nothing is applied locally: a
/// successful write becomes visible once its snapshot is delivered, and a
/// failed one leaves the view untouched. No retries.
#[derive(Debug)]
pub struct InventoryStore<S> {
    backend: S,
    collections: CollectionNames,
    snapshots: RwLock<SnapshotSet>,
    view: watch::Sender<Arc<InventoryView>>,
}

impl<S> InventoryStore<S>
where
    S: DocumentStore,
{
    pub fn new(backend: S, collections: CollectionNames) -> Self {
        let (view, _) = watch::channel(Arc::new(InventoryView::default()));
        Self {
            backend,
            collections,
            snapshots: RwLock::new(SnapshotSet::default()),
            view,
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn collections(&self) -> &CollectionNames {
        &self.collections
    }

    /// Latest derived view.
    pub fn current(&self) -> Arc<InventoryView> {
        self.view.borrow().clone()
    }

    /// Observe every newly derived view.
    pub fn subscribe(&self) -> watch::Receiver<Arc<InventoryView>> {
        self.view.subscribe()
    }

    /// Subscribe to all four source collections of the backend.
    pub fn attach(&self) -> StoreFeeds {
        StoreFeeds::new(
            self.backend.subscribe(&self.collections.studios),
            self.backend.subscribe(&self.collections.equipment),
            self.backend.subscribe(&self.collections.units),
            self.backend.subscribe(&self.collections.maintenance_history),
        )
    }

    pub fn source_of(&self, collection: &str) -> Option<Source> {
        let names = &self.collections;
        if collection == names.studios {
            Some(Source::Studios)
        } else if collection == names.equipment {
            Some(Source::Equipment)
        } else if collection == names.units {
            Some(Source::Units)
        } else if collection == names.maintenance_history {
            Some(Source::MaintenanceHistory)
        } else {
            None
        }
    }

    /// Replace one source snapshot and publish a re-derived view.
    ///
    /// Returns `false` (and publishes nothing) for unknown collections and
    /// for revisions that are not newer than the last applied one.
    /// Documents that fail to decode are skipped with a warning.
    pub fn apply_snapshot(&self, snapshot: &CollectionSnapshot) -> bool {
        let Some(source) = self.source_of(snapshot.collection()) else {
            warn!(collection = snapshot.collection(), "snapshot for unknown collection ignored");
            return false;
        };

        let Ok(mut set) = self.snapshots.write() else {
            warn!(collection = snapshot.collection(), "snapshot set lock poisoned; snapshot dropped");
            return false;
        };

        if !snapshot.is_newer_than(set.revision(source)) {
            debug!(
                collection = snapshot.collection(),
                revision = snapshot.revision(),
                "stale snapshot ignored"
            );
            return false;
        }

        let revision = Some(snapshot.revision());
        match source {
            Source::Studios => set.studios = decode_slot(snapshot, revision),
            Source::Equipment => set.equipment = decode_slot(snapshot, revision),
            Source::Units => set.units = decode_slot(snapshot, revision),
            Source::MaintenanceHistory => set.history = decode_slot(snapshot, revision),
        }
        set.version += 1;

        let previous = self.current();
        let (studios, report) = if source.feeds_tree() {
            let derived = derive_tree(&set.studios.items, &set.equipment.items, &set.units.items);
            if !derived.report.is_clean() {
                debug!(
                    orphaned_equipment = derived.report.orphaned_equipment,
                    orphaned_units = derived.report.orphaned_units,
                    "orphaned records left out of the tree"
                );
            }
            (Arc::from(derived.studios), derived.report)
        } else {
            (Arc::clone(&previous.studios), previous.report)
        };

        let view = InventoryView {
            studios,
            maintenance_history: Arc::clone(&set.history.items),
            report,
            version: set.version,
            loaded: set.tree_loaded(),
        };
        debug!(
            collection = snapshot.collection(),
            revision = snapshot.revision(),
            version = view.version,
            studios = view.studios.len(),
            "view re-derived"
        );

        // Published under the lock so observers see versions in order.
        self.view.send_replace(Arc::new(view));
        true
    }

    // ----------------------------------------------------------------------
    // Unit mutations
    // ----------------------------------------------------------------------

    pub async fn set_unit_status(
        &self,
        studio_id: &StudioId,
        equipment_id: &EquipmentId,
        unit_id: &UnitId,
        status: UnitStatus,
        actor: &str,
    ) -> Result<(), InventoryError> {
        self.change_unit(studio_id, equipment_id, unit_id, UnitChange::Status(status), actor)
            .await
    }

    pub async fn set_unit_label_status(
        &self,
        studio_id: &StudioId,
        equipment_id: &EquipmentId,
        unit_id: &UnitId,
        label_status: LabelStatus,
        actor: &str,
    ) -> Result<(), InventoryError> {
        self.change_unit(
            studio_id,
            equipment_id,
            unit_id,
            UnitChange::LabelStatus(label_status),
            actor,
        )
        .await
    }

    pub async fn set_unit_label_remark(
        &self,
        studio_id: &StudioId,
        equipment_id: &EquipmentId,
        unit_id: &UnitId,
        remark: &str,
        actor: &str,
    ) -> Result<(), InventoryError> {
        self.change_unit(
            studio_id,
            equipment_id,
            unit_id,
            UnitChange::LabelRemark(remark.to_string()),
            actor,
        )
        .await
    }

    pub async fn set_unit_remark(
        &self,
        studio_id: &StudioId,
        equipment_id: &EquipmentId,
        unit_id: &UnitId,
        remark: &str,
        actor: &str,
    ) -> Result<(), InventoryError> {
        self.change_unit(
            studio_id,
            equipment_id,
            unit_id,
            UnitChange::Remark(remark.to_string()),
            actor,
        )
        .await
    }

    /// Flip `replacementPending`. The flip is resolved by the backend against
    /// the stored value, so concurrent toggles never lose an update.
    pub async fn toggle_unit_replacement_pending(
        &self,
        studio_id: &StudioId,
        equipment_id: &EquipmentId,
        unit_id: &UnitId,
        actor: &str,
    ) -> Result<(), InventoryError> {
        self.change_unit(
            studio_id,
            equipment_id,
            unit_id,
            UnitChange::ToggleReplacementPending,
            actor,
        )
        .await
    }

    /// Write one logical field plus `checkedBy`.
    pub async fn change_unit(
        &self,
        studio_id: &StudioId,
        equipment_id: &EquipmentId,
        unit_id: &UnitId,
        change: UnitChange,
        actor: &str,
    ) -> Result<(), InventoryError> {
        let actor = require_name("actor", actor)?;
        self.current().locate(studio_id, equipment_id, unit_id)?;

        let op = match &change {
            UnitChange::Status(status) => FieldWrite::set(status)?,
            UnitChange::LabelStatus(label_status) => FieldWrite::set(label_status)?,
            UnitChange::LabelRemark(text) | UnitChange::Remark(text) => FieldWrite::set(text)?,
            UnitChange::ToggleReplacementPending => FieldWrite::Toggle,
        };
        let write = Write::update(&self.collections.units, unit_id.as_str())
            .field(change.field(), op)
            .field(fields::CHECKED_BY, FieldWrite::set(&actor)?);

        self.backend.commit(vec![write]).await?;

        info!(
            studio = %studio_id,
            equipment = %equipment_id,
            unit = %unit_id,
            change = change.kind(),
            actor = %actor,
            "unit updated"
        );
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Assignees
    // ----------------------------------------------------------------------

    /// Sign a checker in. Adding a present name leaves the set unchanged.
    pub async fn add_assignee(&self, studio_id: &StudioId, name: &str) -> Result<(), InventoryError> {
        let name = require_name("assignee", name)?;
        self.require_studio(studio_id)?;

        let write = Write::update(&self.collections.studios, studio_id.as_str())
            .field(fields::ASSIGNEES, FieldWrite::ArrayUnion(vec![name.clone().into()]));
        self.backend.commit(vec![write]).await?;

        info!(studio = %studio_id, assignee = %name, "assignee added");
        Ok(())
    }

    /// Sign a checker out. Removing an absent name is a no-op.
    pub async fn remove_assignee(&self, studio_id: &StudioId, name: &str) -> Result<(), InventoryError> {
        let name = require_name("assignee", name)?;
        self.require_studio(studio_id)?;

        let write = Write::update(&self.collections.studios, studio_id.as_str())
            .field(fields::ASSIGNEES, FieldWrite::ArrayRemove(vec![name.clone().into()]));
        self.backend.commit(vec![write]).await?;

        info!(studio = %studio_id, assignee = %name, "assignee removed");
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Maintenance history
    // ----------------------------------------------------------------------

    /// Append one maintenance-return record.
    ///
    /// Sent and returned times are both the server time of this call, and
    /// both actors are `actor`. The unit status is not touched; callers using
    /// this directly follow up with `set_unit_status(.., Repaired, ..)`.
    pub async fn record_maintenance_return(
        &self,
        studio_id: &StudioId,
        equipment_id: &EquipmentId,
        unit_id: &UnitId,
        previous_status: UnitStatus,
        actor: &str,
        notes: Option<&str>,
    ) -> Result<MaintenanceRecordId, InventoryError> {
        let actor = require_name("actor", actor)?;
        let view = self.current();
        let location = view.locate(studio_id, equipment_id, unit_id)?;

        let id = MaintenanceRecordId::generate();
        let write = self.maintenance_record_write(&id, &location, previous_status, &actor, notes)?;
        self.backend.commit(vec![write]).await?;

        info!(
            record = %id,
            studio = %studio_id,
            unit = %unit_id,
            previous_status = %previous_status,
            actor = %actor,
            "maintenance return recorded"
        );
        Ok(id)
    }

    /// Record the return and mark the unit repaired in one atomic batch.
    ///
    /// The unit's current status becomes the record's `previous_status`.
    /// Fails with a conflict if the unit is already repaired.
    pub async fn complete_maintenance(
        &self,
        studio_id: &StudioId,
        equipment_id: &EquipmentId,
        unit_id: &UnitId,
        actor: &str,
        notes: Option<&str>,
    ) -> Result<MaintenanceRecordId, InventoryError> {
        let actor = require_name("actor", actor)?;
        let view = self.current();
        let location = view.locate(studio_id, equipment_id, unit_id)?;

        let previous_status = location.unit.status;
        if previous_status == UnitStatus::Repaired {
            return Err(DomainError::conflict(format!("unit {unit_id} is already repaired")).into());
        }

        let id = MaintenanceRecordId::generate();
        let record = self.maintenance_record_write(&id, &location, previous_status, &actor, notes)?;
        let status = Write::update(&self.collections.units, unit_id.as_str())
            .field(fields::STATUS, FieldWrite::set(&UnitStatus::Repaired)?)
            .field(fields::CHECKED_BY, FieldWrite::set(&actor)?);

        self.backend.commit(vec![record, status]).await?;

        info!(
            record = %id,
            studio = %studio_id,
            unit = %unit_id,
            previous_status = %previous_status,
            actor = %actor,
            "maintenance completed"
        );
        Ok(id)
    }

    /// Delete exactly one history record.
    pub async fn delete_maintenance_record(&self, id: &MaintenanceRecordId) -> Result<(), InventoryError> {
        if self.current().maintenance_record(id).is_none() {
            return Err(DomainError::not_found(format!("maintenance record {id}")).into());
        }

        self.backend
            .commit(vec![Write::delete(&self.collections.maintenance_history, id.as_str())])
            .await?;

        info!(record = %id, "maintenance record deleted");
        Ok(())
    }

    fn require_studio(&self, studio_id: &StudioId) -> Result<(), DomainError> {
        match self.current().studio(studio_id) {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found(format!("studio {studio_id}"))),
        }
    }

    fn maintenance_record_write(
        &self,
        id: &MaintenanceRecordId,
        location: &UnitLocation<'_>,
        previous_status: UnitStatus,
        actor: &str,
        notes: Option<&str>,
    ) -> Result<Write, StoreError> {
        let mut write = Write::create(&self.collections.maintenance_history, id.as_str())
            .field(fields::UNIT_ID, FieldWrite::set(&location.unit.id)?)
            .field(fields::EQUIPMENT_ID, FieldWrite::set(&location.equipment.id)?)
            .field(fields::EQUIPMENT_NAME, FieldWrite::set(&location.equipment.name)?)
            .field(fields::UNIT_LABEL, FieldWrite::set(&location.unit.display_label())?)
            .field(fields::STUDIO_ID, FieldWrite::set(&location.studio.id)?)
            .field(fields::STUDIO_NAME, FieldWrite::set(&location.studio.name)?)
            .field(fields::PREVIOUS_STATUS, FieldWrite::set(&previous_status)?)
            .field(fields::SENT_TO_MAINTENANCE_AT, FieldWrite::ServerTimestamp)
            .field(fields::SENT_BY, FieldWrite::set(actor)?)
            .field(fields::RETURNED_AT, FieldWrite::ServerTimestamp)
            .field(fields::RETURNED_BY, FieldWrite::set(actor)?)
            .field(fields::CREATED_AT, FieldWrite::ServerTimestamp);

        if let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) {
            write = write.field(fields::NOTES, FieldWrite::set(notes)?);
        }
        Ok(write)
    }
}

fn decode_slot<T: DeserializeOwned>(snapshot: &CollectionSnapshot, revision: Option<u64>) -> Slot<T> {
    let items: Vec<T> = snapshot
        .documents()
        .iter()
        .filter_map(|doc| match doc.decode::<T>() {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(
                    collection = snapshot.collection(),
                    document = %doc.id,
                    error = %err,
                    "skipping malformed document"
                );
                None
            }
        })
        .collect();

    Slot {
        revision,
        items: Arc::from(items),
    }
}
