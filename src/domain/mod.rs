pub mod common;
pub mod records;

pub use common::{DatedRecord, Identifiable};
pub use records::{
    coerce_amount, expenses_from_raw, try_coerce_amount, work_days_from_raw, ExpenseRecord,
    RawAmount, RawRecord, RecordId, WorkDayRecord,
};
