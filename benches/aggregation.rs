use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::tempdir;
use worklog_core::{
    core::{
        services::{CalendarGridBuilder, DayIndex, MonthAggregator},
        FixedClock,
    },
    dates::{LocalDay, MonthRef},
    domain::{ExpenseRecord, WorkDayRecord},
    storage::{JsonRecordStore, RecordStore, ResourceKind},
};

const RECORDS: i64 = 10_000;

fn records() -> (Vec<WorkDayRecord>, Vec<ExpenseRecord>) {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let work = (0..RECORDS)
        .map(|i| {
            let day = LocalDay::from_date(start + Duration::days(i % 1_500));
            WorkDayRecord::new(day, 80.0 + (i % 7) as f64, Some(format!("job {}", i % 13)))
        })
        .collect();
    let expenses = (0..RECORDS)
        .map(|i| {
            let day = LocalDay::from_date(start + Duration::days((i * 3) % 1_500));
            let category = Some(format!("cat {}", i % 5));
            ExpenseRecord::new(day, 5.0 + (i % 11) as f64, category, "gasto")
        })
        .collect();
    (work, expenses)
}

fn aggregation_benchmark(c: &mut Criterion) {
    let (work, expenses) = records();
    let month = MonthRef::new(2022, 6).unwrap();
    let clock = FixedClock::new(NaiveDate::from_ymd_opt(2022, 6, 15).unwrap());

    c.bench_function("aggregate_month", |b| {
        b.iter(|| MonthAggregator::aggregate(black_box(&work), black_box(&expenses), month))
    });
    c.bench_function("monthly_totals_year", |b| {
        b.iter(|| MonthAggregator::monthly_totals(black_box(&work), black_box(&expenses), 2022))
    });
    c.bench_function("calendar_grid", |b| {
        b.iter(|| {
            let index = DayIndex::for_month(black_box(&work), month);
            CalendarGridBuilder::build(month, &index, &clock)
        })
    });
}

fn store_benchmark(c: &mut Criterion) {
    let (work, _) = records();
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.json");
    let mut store = JsonRecordStore::open(&path).unwrap();
    for record in work.iter().take(500) {
        store.create(ResourceKind::WorkDays, record.to_raw()).unwrap();
    }

    c.bench_function("json_store_reopen", |b| {
        b.iter(|| {
            let store = JsonRecordStore::open(black_box(&path)).unwrap();
            store.list(ResourceKind::WorkDays).unwrap().len()
        })
    });
}

criterion_group!(benches, aggregation_benchmark, store_benchmark);
criterion_main!(benches);
