//! Calendar-day normalization and month arithmetic shared by every view.

pub mod month;
pub mod normalize;

pub use month::{month_name, MonthRef};
pub use normalize::{DateNormalizer, LocalDay, RawDate};
