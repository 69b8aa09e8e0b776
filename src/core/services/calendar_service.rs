use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::core::time::Clock;
use crate::currency::primary_language;
use crate::dates::MonthRef;
use crate::domain::{DatedRecord, RecordId};

use super::summary_service::amount_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Worked,
    NotWorked,
    TodayWorked,
    TodayNotWorked,
}

impl DayStatus {
    /// Today wins over plain worked/not-worked styling.
    pub fn classify(is_today: bool, worked: bool) -> Self {
        match (is_today, worked) {
            (true, true) => DayStatus::TodayWorked,
            (true, false) => DayStatus::TodayNotWorked,
            (false, true) => DayStatus::Worked,
            (false, false) => DayStatus::NotWorked,
        }
    }

    pub fn is_worked(self) -> bool {
        matches!(self, DayStatus::Worked | DayStatus::TodayWorked)
    }

    pub fn is_today(self) -> bool {
        matches!(self, DayStatus::TodayWorked | DayStatus::TodayNotWorked)
    }
}

/// One stored record behind a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayEntry {
    pub id: RecordId,
    pub amount: f64,
    pub description: Option<String>,
}

/// Merged view of every record on one date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DaySummary {
    pub amount: f64,
    /// Distinct non-empty descriptions joined with `"; "`.
    pub description: Option<String>,
    pub entries: Vec<DayEntry>,
}

impl DaySummary {
    fn push<R: DatedRecord>(&mut self, record: &R) {
        let amount = amount_of(record);
        let description = record.description().map(str::to_string);
        self.amount += amount;
        if let Some(text) = &description {
            let already = self
                .entries
                .iter()
                .any(|entry| entry.description.as_deref() == Some(text.as_str()));
            if !already {
                self.description = Some(match self.description.take() {
                    Some(joined) => format!("{joined}; {text}"),
                    None => text.clone(),
                });
            }
        }
        self.entries.push(DayEntry {
            id: record.id().clone(),
            amount,
            description,
        });
    }
}

/// Calendar date → merged day summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayIndex {
    days: BTreeMap<NaiveDate, DaySummary>,
}

impl DayIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes the records that fall inside `month`.
    pub fn for_month<R: DatedRecord>(records: &[R], month: MonthRef) -> Self {
        let mut index = Self::new();
        for record in records.iter().filter(|r| month.contains(r.day().date())) {
            index.insert(record);
        }
        index
    }

    pub fn insert<R: DatedRecord>(&mut self, record: &R) {
        self.days
            .entry(record.day().date())
            .or_default()
            .push(record);
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DaySummary> {
        self.days.get(&date)
    }

    /// Lookup by `YYYY-MM-DD` key.
    pub fn get_by_key(&self, key: &str) -> Option<&DaySummary> {
        let date = NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()?;
        self.get(date)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DaySummary)> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub status: DayStatus,
    pub summary: Option<DaySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarGrid {
    pub month: MonthRef,
    pub leading_blanks: u32,
    pub cells: Vec<DayCell>,
}

impl CalendarGrid {
    /// Monday-first rows of seven slots; `None` marks a blank slot.
    pub fn weeks(&self) -> Vec<[Option<&DayCell>; 7]> {
        let slots: Vec<Option<&DayCell>> = (0..self.leading_blanks)
            .map(|_| None)
            .chain(self.cells.iter().map(Some))
            .collect();
        slots
            .chunks(7)
            .map(|chunk| {
                let mut row = [None; 7];
                row[..chunk.len()].copy_from_slice(chunk);
                row
            })
            .collect()
    }

    pub fn trailing_blanks(&self) -> u32 {
        let used = (self.leading_blanks as usize + self.cells.len()) % 7;
        if used == 0 {
            0
        } else {
            (7 - used) as u32
        }
    }

    pub fn cell(&self, day: u32) -> Option<&DayCell> {
        self.cells.get(day.checked_sub(1)? as usize)
    }
}

pub struct CalendarGridBuilder;

impl CalendarGridBuilder {
    /// Empty slots before the 1st so weeks start on Monday.
    pub fn leading_blanks(month: MonthRef) -> u32 {
        match month.first_day().weekday().num_days_from_sunday() {
            0 => 6,
            weekday => weekday - 1,
        }
    }

    pub fn build(month: MonthRef, index: &DayIndex, clock: &dyn Clock) -> CalendarGrid {
        let today = clock.today();
        let cells: Vec<DayCell> = month
            .days()
            .map(|date| {
                let summary = index
                    .get(date)
                    .filter(|summary| !summary.entries.is_empty())
                    .cloned();
                DayCell {
                    date,
                    is_current_month: month.contains(date),
                    status: DayStatus::classify(date == today, summary.is_some()),
                    summary,
                }
            })
            .collect();
        let grid = CalendarGrid {
            month,
            leading_blanks: Self::leading_blanks(month),
            cells,
        };
        debug!(
            %month,
            leading_blanks = grid.leading_blanks,
            worked = grid.cells.iter().filter(|c| c.status.is_worked()).count(),
            "calendar grid built"
        );
        grid
    }
}

/// Monday-first short weekday labels.
pub fn weekday_headers(locale: &str) -> [&'static str; 7] {
    if primary_language(locale) == "es" {
        ["L", "M", "X", "J", "V", "S", "D"]
    } else {
        ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"]
    }
}
