use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{RawRecord, RecordId};
use crate::errors::{Result, WorklogError};
use crate::utils::persistence::{load_json, save_json};

use super::{RecordStore, ResourceKind};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default, alias = "diasTrabajados", alias = "dias-trabajados")]
    work_days: Vec<RawRecord>,
    #[serde(default, alias = "gastos")]
    expenses: Vec<RawRecord>,
}

impl Snapshot {
    fn records(&self, kind: ResourceKind) -> &Vec<RawRecord> {
        match kind {
            ResourceKind::WorkDays => &self.work_days,
            ResourceKind::Expenses => &self.expenses,
        }
    }

    fn records_mut(&mut self, kind: ResourceKind) -> &mut Vec<RawRecord> {
        match kind {
            ResourceKind::WorkDays => &mut self.work_days,
            ResourceKind::Expenses => &mut self.expenses,
        }
    }
}

/// Record store backed by one JSON snapshot file, rewritten on every change.
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    path: PathBuf,
    snapshot: Snapshot,
}

impl JsonRecordStore {
    /// Opens `path`, starting empty when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snapshot = load_json(&path)?.unwrap_or_default();
        Ok(Self { path, snapshot })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn position(&self, kind: ResourceKind, id: &RecordId) -> Result<usize> {
        self.snapshot
            .records(kind)
            .iter()
            .position(|record| record.id.as_ref() == Some(id))
            .ok_or_else(|| WorklogError::NotFound {
                kind: kind.to_string(),
                id: id.to_string(),
            })
    }

    /// Applies `change` to a copy of the snapshot and keeps it only once it is on disk.
    fn commit<T>(
        &mut self,
        kind: ResourceKind,
        change: impl FnOnce(&mut Vec<RawRecord>) -> T,
    ) -> Result<T> {
        let mut staged = self.snapshot.clone();
        let outcome = change(staged.records_mut(kind));
        save_json(&staged, &self.path)?;
        self.snapshot = staged;
        Ok(outcome)
    }
}

impl RecordStore for JsonRecordStore {
    fn list(&self, kind: ResourceKind) -> Result<Vec<RawRecord>> {
        Ok(self.snapshot.records(kind).clone())
    }

    fn create(&mut self, kind: ResourceKind, mut record: RawRecord) -> Result<RecordId> {
        let id = record.id.clone().unwrap_or_else(RecordId::generate);
        if self.position(kind, &id).is_ok() {
            return Err(WorklogError::Storage(format!(
                "{kind} record `{id}` already exists"
            )));
        }
        record.id = Some(id.clone());
        self.commit(kind, |records| records.push(record))?;
        info!(%kind, %id, "record created");
        Ok(id)
    }

    fn delete(&mut self, kind: ResourceKind, id: &RecordId) -> Result<()> {
        let idx = self.position(kind, id)?;
        self.commit(kind, |records| records.remove(idx))?;
        info!(%kind, %id, "record deleted");
        Ok(())
    }

    fn update(
        &mut self,
        kind: ResourceKind,
        id: &RecordId,
        mut record: RawRecord,
    ) -> Result<RecordId> {
        let idx = self.position(kind, id)?;
        record.id = Some(id.clone());
        self.commit(kind, |records| records[idx] = record)?;
        info!(%kind, %id, "record updated in place");
        Ok(id.clone())
    }
}
