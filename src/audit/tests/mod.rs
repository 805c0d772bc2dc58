//! Test utilities for the quality auditor

use chrono::NaiveDate;

use crate::models::{CanonicalSeries, DailyRecord};

mod checks_tests;
mod render_tests;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One record per day in `[start, end]` with constant readings
pub fn full_days(start: NaiveDate, end: NaiveDate, max: f64, min: f64) -> Vec<DailyRecord> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| DailyRecord::new(day, max, min))
        .collect()
}

pub fn series(records: Vec<DailyRecord>) -> CanonicalSeries {
    CanonicalSeries::try_new(records).unwrap()
}
