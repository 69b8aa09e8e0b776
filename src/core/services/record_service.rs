use chrono::TimeZone;

use crate::dates::DateNormalizer;
use crate::domain::{
    expenses_from_raw, work_days_from_raw, ExpenseRecord, RecordId, WorkDayRecord,
};
use crate::storage::{RecordStore, ResourceKind};

use super::{ServiceError, ServiceResult};

/// Validated CRUD over a [`RecordStore`].
pub struct RecordService;

impl RecordService {
    pub fn load_work_days<S, Tz>(
        store: &S,
        normalizer: &DateNormalizer<Tz>,
    ) -> ServiceResult<Vec<WorkDayRecord>>
    where
        S: RecordStore + ?Sized,
        Tz: TimeZone,
    {
        let raws = store.list(ResourceKind::WorkDays)?;
        Ok(work_days_from_raw(&raws, normalizer))
    }

    pub fn load_expenses<S, Tz>(
        store: &S,
        normalizer: &DateNormalizer<Tz>,
    ) -> ServiceResult<Vec<ExpenseRecord>>
    where
        S: RecordStore + ?Sized,
        Tz: TimeZone,
    {
        let raws = store.list(ResourceKind::Expenses)?;
        Ok(expenses_from_raw(&raws, normalizer))
    }

    pub fn add_work_day<S: RecordStore + ?Sized>(
        store: &mut S,
        record: &WorkDayRecord,
    ) -> ServiceResult<RecordId> {
        validate_amount(record.amount_earned)?;
        Ok(store.create(ResourceKind::WorkDays, record.to_raw())?)
    }

    pub fn add_expense<S: RecordStore + ?Sized>(
        store: &mut S,
        record: &ExpenseRecord,
    ) -> ServiceResult<RecordId> {
        validate_expense(record)?;
        Ok(store.create(ResourceKind::Expenses, record.to_raw())?)
    }

    /// Returns the id the edited record ends up under, which may differ from `id`.
    pub fn edit_work_day<S: RecordStore + ?Sized>(
        store: &mut S,
        id: &RecordId,
        record: &WorkDayRecord,
    ) -> ServiceResult<RecordId> {
        validate_amount(record.amount_earned)?;
        Ok(store.update(ResourceKind::WorkDays, id, record.to_raw())?)
    }

    pub fn edit_expense<S: RecordStore + ?Sized>(
        store: &mut S,
        id: &RecordId,
        record: &ExpenseRecord,
    ) -> ServiceResult<RecordId> {
        validate_expense(record)?;
        Ok(store.update(ResourceKind::Expenses, id, record.to_raw())?)
    }

    pub fn remove<S: RecordStore + ?Sized>(
        store: &mut S,
        kind: ResourceKind,
        id: &RecordId,
    ) -> ServiceResult<()> {
        Ok(store.delete(kind, id)?)
    }
}

fn validate_amount(amount: f64) -> ServiceResult<()> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(ServiceError::Invalid(format!(
            "amount must be a non-negative number, got {amount}"
        )))
    }
}

fn validate_expense(record: &ExpenseRecord) -> ServiceResult<()> {
    validate_amount(record.amount)?;
    if record.description.trim().is_empty() {
        return Err(ServiceError::Invalid("expense description is required".into()));
    }
    Ok(())
}
