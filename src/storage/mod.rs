pub mod json_store;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::{RawRecord, RecordId};
use crate::errors::{Result, WorklogError};

pub use json_store::JsonRecordStore;

/// The two resources exposed by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    WorkDays,
    Expenses,
}

impl ResourceKind {
    /// Resource path segment used by the remote API.
    pub fn resource_name(self) -> &'static str {
        match self {
            ResourceKind::WorkDays => "dias-trabajados",
            ResourceKind::Expenses => "gastos",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_name())
    }
}

impl FromStr for ResourceKind {
    type Err = WorklogError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "dias-trabajados" | "work_days" | "work-days" => Ok(ResourceKind::WorkDays),
            "gastos" | "expenses" => Ok(ResourceKind::Expenses),
            other => Err(WorklogError::Usage(format!("unknown resource `{other}`"))),
        }
    }
}

/// Persistence for both record kinds.
pub trait RecordStore: Send + Sync {
    fn list(&self, kind: ResourceKind) -> Result<Vec<RawRecord>>;

    /// Stores `record`, assigning an id when it has none, and returns that id.
    fn create(&mut self, kind: ResourceKind, record: RawRecord) -> Result<RecordId>;

    fn delete(&mut self, kind: ResourceKind, id: &RecordId) -> Result<()>;

    /// Replaces the record behind `id` and returns the id it is stored under.
    ///
    /// The default deletes and recreates, so the returned id differs from `id`.
    /// Stores that can update in place override this and keep the id.
    fn update(
        &mut self,
        kind: ResourceKind,
        id: &RecordId,
        record: RawRecord,
    ) -> Result<RecordId> {
        self.delete(kind, id)?;
        self.create(
            kind,
            RawRecord {
                id: None,
                ..record
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CreateDeleteOnly {
        records: Vec<RawRecord>,
    }

    impl RecordStore for CreateDeleteOnly {
        fn list(&self, _kind: ResourceKind) -> Result<Vec<RawRecord>> {
            Ok(self.records.clone())
        }

        fn create(&mut self, _kind: ResourceKind, mut record: RawRecord) -> Result<RecordId> {
            let id = record.id.clone().unwrap_or_else(RecordId::generate);
            record.id = Some(id.clone());
            self.records.push(record);
            Ok(id)
        }

        fn delete(&mut self, kind: ResourceKind, id: &RecordId) -> Result<()> {
            let before = self.records.len();
            self.records.retain(|r| r.id.as_ref() != Some(id));
            if self.records.len() == before {
                return Err(WorklogError::NotFound {
                    kind: kind.to_string(),
                    id: id.to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn default_update_recreates_under_a_new_id() {
        let mut store = CreateDeleteOnly::default();
        let original = store
            .create(
                ResourceKind::WorkDays,
                RawRecord {
                    date: Some("2024-03-05".into()),
                    amount: 10.0.into(),
                    ..RawRecord::default()
                },
            )
            .unwrap();
        let replacement = RawRecord {
            id: Some(original.clone()),
            date: Some("2024-03-06".into()),
            amount: 12.0.into(),
            ..RawRecord::default()
        };
        let new_id = store
            .update(ResourceKind::WorkDays, &original, replacement)
            .unwrap();
        assert_ne!(new_id, original);
        let listed = store.list(ResourceKind::WorkDays).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id.as_ref(), Some(&new_id));
    }

    #[test]
    fn update_of_missing_record_fails_before_creating() {
        let mut store = CreateDeleteOnly::default();
        let err = store
            .update(ResourceKind::Expenses, &RecordId::new("ghost"), RawRecord::default())
            .unwrap_err();
        assert!(matches!(err, WorklogError::NotFound { .. }));
        assert!(store.records.is_empty());
    }

    #[test]
    fn resource_names_parse_back() {
        for kind in [ResourceKind::WorkDays, ResourceKind::Expenses] {
            assert_eq!(kind.resource_name().parse::<ResourceKind>().unwrap(), kind);
        }
        assert!("ingresos".parse::<ResourceKind>().is_err());
    }
}
