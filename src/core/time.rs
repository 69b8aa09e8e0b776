use chrono::{Local, NaiveDate};

use crate::dates::MonthRef;

/// Clock abstracts access to the current local date so views stay deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the viewer's current calendar date.
    fn today(&self) -> NaiveDate;

    fn current_month(&self) -> MonthRef {
        MonthRef::from_date(self.today())
    }
}

/// Reads the wall clock in the process time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_month() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 6, 18).unwrap());
        assert_eq!(clock.current_month(), MonthRef::new(2024, 6).unwrap());
    }
}
