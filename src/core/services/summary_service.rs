use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::dates::MonthRef;
use crate::domain::{DatedRecord, ExpenseRecord, WorkDayRecord};

/// Dashboard figures for one reference month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub month: MonthRef,
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub worked_days: u32,
    pub total_days_in_month: u32,
    pub work_rate_percent: f64,
    pub total_earned: f64,
    pub total_spent: f64,
    pub balance: f64,
    /// Work records in the month, counting same-day records separately.
    pub work_records: usize,
    pub expense_records: usize,
    pub average_per_worked_day: f64,
    pub expenses_by_category: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// `None` groups expenses stored without a category.
    pub category: Option<String>,
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordTotals {
    pub total: f64,
    pub record_count: usize,
    pub distinct_days: u32,
}

/// Earned and spent amounts for one month of a yearly overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotals {
    pub month: MonthRef,
    pub earned: f64,
    pub spent: f64,
}

impl MonthTotals {
    pub fn balance(&self) -> f64 {
        self.earned - self.spent
    }
}

pub struct MonthAggregator;

impl MonthAggregator {
    /// Records whose day falls inside `month`, in input order.
    pub fn in_month<R: DatedRecord>(records: &[R], month: MonthRef) -> impl Iterator<Item = &R> {
        records
            .iter()
            .filter(move |record| month.contains(record.day().date()))
    }

    pub fn totals<R: DatedRecord>(records: &[R], month: MonthRef) -> RecordTotals {
        let mut days = BTreeSet::new();
        let mut totals = RecordTotals::default();
        for record in Self::in_month(records, month) {
            totals.total += amount_of(record);
            totals.record_count += 1;
            days.insert(record.day().date());
        }
        totals.distinct_days = days.len() as u32;
        totals
    }

    pub fn aggregate(
        work_days: &[WorkDayRecord],
        expenses: &[ExpenseRecord],
        month: MonthRef,
    ) -> MonthSummary {
        let earned = Self::totals(work_days, month);
        let spent = Self::totals(expenses, month);
        let total_days_in_month = month.days_in_month();

        let summary = MonthSummary {
            month,
            month_start: month.first_day(),
            month_end: month.last_day(),
            worked_days: earned.distinct_days,
            total_days_in_month,
            work_rate_percent: Self::work_rate(earned.distinct_days, total_days_in_month),
            total_earned: earned.total,
            total_spent: spent.total,
            balance: earned.total - spent.total,
            work_records: earned.record_count,
            expense_records: spent.record_count,
            average_per_worked_day: if earned.distinct_days == 0 {
                0.0
            } else {
                earned.total / f64::from(earned.distinct_days)
            },
            expenses_by_category: Self::expenses_by_category(expenses, month),
        };
        debug!(
            %month,
            worked_days = summary.worked_days,
            work_records = summary.work_records,
            expense_records = summary.expense_records,
            "month aggregated"
        );
        summary
    }

    /// Share of the month's days that were worked, as a percentage with one decimal.
    pub fn work_rate(distinct_worked_days: u32, days_in_month: u32) -> f64 {
        if days_in_month == 0 {
            return 0.0;
        }
        let percent = f64::from(distinct_worked_days) / f64::from(days_in_month) * 100.0;
        (percent * 10.0).round() / 10.0
    }

    /// Expense totals per category, largest first.
    pub fn expenses_by_category(expenses: &[ExpenseRecord], month: MonthRef) -> Vec<CategoryTotal> {
        let mut grouped: HashMap<Option<&str>, (f64, usize)> = HashMap::new();
        for expense in Self::in_month(expenses, month) {
            let entry = grouped.entry(expense.category.as_deref()).or_default();
            entry.0 += amount_of(expense);
            entry.1 += 1;
        }
        let mut totals: Vec<CategoryTotal> = grouped
            .into_iter()
            .map(|(category, (total, count))| CategoryTotal {
                category: category.map(str::to_string),
                total,
                count,
            })
            .collect();
        totals.sort_by(|a, b| {
            b.total
                .total_cmp(&a.total)
                .then_with(|| a.category.cmp(&b.category))
        });
        totals
    }

    /// Twelve entries, January first, for the given year.
    pub fn monthly_totals(
        work_days: &[WorkDayRecord],
        expenses: &[ExpenseRecord],
        year: i32,
    ) -> Vec<MonthTotals> {
        let mut earned = [0.0_f64; 12];
        let mut spent = [0.0_f64; 12];
        for record in work_days.iter().filter(|r| r.date.year() == year) {
            earned[record.date.month() as usize - 1] += amount_of(record);
        }
        for record in expenses.iter().filter(|r| r.date.year() == year) {
            spent[record.date.month() as usize - 1] += amount_of(record);
        }
        (1..=12)
            .filter_map(|month| MonthRef::new(year, month))
            .map(|month| {
                let idx = month.month() as usize - 1;
                MonthTotals {
                    month,
                    earned: earned[idx],
                    spent: spent[idx],
                }
            })
            .collect()
    }
}

pub(crate) fn amount_of<R: DatedRecord + ?Sized>(record: &R) -> f64 {
    let amount = record.amount();
    if amount.is_finite() {
        amount
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::LocalDay;

    fn day(y: i32, m: u32, d: u32) -> LocalDay {
        LocalDay::from_ymd(y, m, d).unwrap()
    }

    fn work(date: LocalDay, amount: f64) -> WorkDayRecord {
        WorkDayRecord::new(date, amount, None)
    }

    fn march() -> MonthRef {
        MonthRef::new(2024, 3).unwrap()
    }

    #[test]
    fn empty_month_is_all_zero() {
        for month in [march(), MonthRef::new(2023, 2).unwrap()] {
            let summary = MonthAggregator::aggregate(&[], &[], month);
            assert_eq!(summary.worked_days, 0);
            assert_eq!(summary.total_days_in_month, month.days_in_month());
            assert_eq!(summary.work_rate_percent, 0.0);
            assert_eq!(summary.total_earned, 0.0);
            assert_eq!(summary.total_spent, 0.0);
            assert_eq!(summary.balance, 0.0);
            assert_eq!(summary.average_per_worked_day, 0.0);
        }
    }

    #[test]
    fn same_day_records_sum_but_count_once() {
        let records = [work(day(2024, 3, 5), 100.0), work(day(2024, 3, 5), 50.0)];
        let summary = MonthAggregator::aggregate(&records, &[], march());
        assert_eq!(summary.total_earned, 150.0);
        assert_eq!(summary.worked_days, 1);
        assert_eq!(summary.work_records, 2);
        assert_eq!(summary.work_rate_percent, 3.2);
        assert_eq!(summary.average_per_worked_day, 150.0);
    }

    #[test]
    fn records_outside_the_month_are_ignored() {
        let records = [
            work(day(2024, 2, 29), 70.0),
            work(day(2024, 4, 1), 30.0),
            work(day(2023, 3, 5), 10.0),
        ];
        let summary = MonthAggregator::aggregate(&records, &[], march());
        assert_eq!(summary.total_earned, 0.0);
        assert_eq!(summary.worked_days, 0);
        assert_eq!(summary.month_start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(summary.month_end, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    }

    #[test]
    fn month_edges_are_inclusive() {
        let records = [work(day(2024, 3, 1), 10.0), work(day(2024, 3, 31), 20.0)];
        let totals = MonthAggregator::totals(&records, march());
        assert_eq!(totals.total, 30.0);
        assert_eq!(totals.distinct_days, 2);
    }

    #[test]
    fn non_finite_amounts_count_as_zero() {
        let records = [work(day(2024, 3, 2), f64::NAN), work(day(2024, 3, 3), 40.0)];
        let summary = MonthAggregator::aggregate(&records, &[], march());
        assert_eq!(summary.total_earned, 40.0);
        assert_eq!(summary.worked_days, 2);
    }

    #[test]
    fn balance_and_categories() {
        let expenses = [
            ExpenseRecord::new(day(2024, 3, 4), 30.0, Some("Food".into()), "Lunch"),
            ExpenseRecord::new(day(2024, 3, 9), 45.0, Some("Fuel".into()), "Diesel"),
            ExpenseRecord::new(day(2024, 3, 12), 20.0, Some("Food".into()), "Dinner"),
            ExpenseRecord::new(day(2024, 3, 20), 5.0, None, "Parking"),
        ];
        let summary =
            MonthAggregator::aggregate(&[work(day(2024, 3, 5), 200.0)], &expenses, march());
        assert_eq!(summary.total_spent, 100.0);
        assert_eq!(summary.balance, 100.0);
        assert_eq!(summary.expense_records, 4);
        let categories: Vec<_> = summary
            .expenses_by_category
            .iter()
            .map(|c| (c.category.as_deref(), c.total, c.count))
            .collect();
        assert_eq!(
            categories,
            vec![(Some("Food"), 50.0, 2), (Some("Fuel"), 45.0, 1), (None, 5.0, 1)]
        );
    }

    #[test]
    fn work_rate_rounds_to_one_decimal_and_never_divides_by_zero() {
        assert_eq!(MonthAggregator::work_rate(10, 30), 33.3);
        assert_eq!(MonthAggregator::work_rate(2, 3), 66.7);
        assert_eq!(MonthAggregator::work_rate(31, 31), 100.0);
        assert_eq!(MonthAggregator::work_rate(3, 0), 0.0);
    }

    #[test]
    fn monthly_totals_cover_the_year() {
        let records = [work(day(2024, 1, 10), 10.0), work(day(2024, 12, 1), 5.0)];
        let expenses = [ExpenseRecord::new(day(2024, 1, 2), 4.0, None, "Bus")];
        let totals = MonthAggregator::monthly_totals(&records, &expenses, 2024);
        assert_eq!(totals.len(), 12);
        assert_eq!(totals[0].earned, 10.0);
        assert_eq!(totals[0].balance(), 6.0);
        assert_eq!(totals[11].earned, 5.0);
        assert_eq!(totals[5].spent, 0.0);
    }
}
