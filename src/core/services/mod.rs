pub mod calendar_service;
pub mod record_service;
pub mod report_service;
pub mod summary_service;

pub use calendar_service::{
    weekday_headers, CalendarGrid, CalendarGridBuilder, DayCell, DayEntry, DayIndex, DayStatus,
    DaySummary,
};
pub use record_service::RecordService;
pub use report_service::{MonthlyReport, ReportLine, ReportRow, ReportService};
pub use summary_service::{CategoryTotal, MonthAggregator, MonthSummary, MonthTotals, RecordTotals};

use crate::errors::WorklogError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Worklog(#[from] WorklogError),
    #[error("{0}")]
    Invalid(String),
}
