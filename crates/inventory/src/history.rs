//! Maintenance history filtering.

use studioinv_core::StudioId;

use crate::record::MaintenanceRecord;

/// Search + studio filter for the maintenance history list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Case-insensitive substring over equipment name, unit label and studio name.
    pub search: Option<String>,
    pub studio: Option<StudioId>,
}

impl HistoryQuery {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn in_studio(mut self, studio: impl Into<StudioId>) -> Self {
        self.studio = Some(studio.into());
        self
    }

    pub fn matches(&self, record: &MaintenanceRecord) -> bool {
        if let Some(studio) = &self.studio {
            if &record.studio_id != studio {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => {
                let needle = text.to_lowercase();
                [&record.equipment_name, &record.unit_label, &record.studio_name]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }

    /// Matching records, newest `created_at` first; records without a
    /// timestamp (not yet acknowledged by the server) sort last.
    pub fn apply<'a>(&self, records: &'a [MaintenanceRecord]) -> Vec<&'a MaintenanceRecord> {
        let mut matched: Vec<_> = records.iter().filter(|r| self.matches(r)).collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::UnitStatus;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, studio: &str, equipment: &str, label: &str, created_hour: Option<u32>) -> MaintenanceRecord {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        MaintenanceRecord {
            id: id.into(),
            unit_id: format!("{id}-unit").into(),
            equipment_id: format!("{id}-eq").into(),
            equipment_name: equipment.into(),
            unit_label: label.into(),
            studio_id: studio.into(),
            studio_name: format!("{studio} room"),
            previous_status: UnitStatus::Damaged,
            sent_to_maintenance_at: at,
            sent_by: "Glen".into(),
            returned_at: at,
            returned_by: "Glen".into(),
            notes: None,
            created_at: created_hour.map(|h| Utc.with_ymd_and_hms(2026, 3, 1, h, 0, 0).unwrap()),
        }
    }

    fn ids(found: Vec<&MaintenanceRecord>) -> Vec<&str> {
        found.into_iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn newest_first_and_pending_last() {
        let records = vec![
            record("r1", "s1", "A7S3", "1A-A7S3-01", Some(8)),
            record("r2", "s1", "FX3", "0A-FX3-01", None),
            record("r3", "s2", "Teris", "0D-TERIS-12", Some(10)),
        ];
        assert_eq!(ids(HistoryQuery::default().apply(&records)), ["r3", "r1", "r2"]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let records = vec![
            record("r1", "s1", "A7S3", "1A-A7S3-01", Some(8)),
            record("r2", "s2", "Teris", "0D-TERIS-12", Some(9)),
        ];
        assert_eq!(ids(HistoryQuery::default().search("a7s3").apply(&records)), ["r1"]);
        assert_eq!(ids(HistoryQuery::default().search("S2 ROOM").apply(&records)), ["r2"]);
        assert_eq!(ids(HistoryQuery::default().search("  ").apply(&records)), ["r2", "r1"]);
    }

    #[test]
    fn studio_filter_combines_with_search() {
        let records = vec![
            record("r1", "s1", "A7S3", "1A-A7S3-01", Some(8)),
            record("r2", "s2", "A7S3", "2A-A7S3-03", Some(9)),
        ];
        let query = HistoryQuery::default().search("a7s3").in_studio("s2");
        assert_eq!(ids(query.apply(&records)), ["r2"]);
    }
}
