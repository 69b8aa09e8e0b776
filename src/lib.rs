#![doc(test(attr(deny(warnings))))]

//! Worklog Core turns the work-day and expense records of a personal income
//! tracker into month summaries, calendar grids and printable reports.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod dates;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Worklog Core tracing initialized.");
    });
}
