//! Test utilities for the reconciliation pipeline
//!
//! Builds loaded sources and sourced records without touching the filesystem.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::error::SeriesError;
use crate::extractor::RecordExtractor;
use crate::extractor::tests::compact_export;
use crate::models::{DailyRecord, RecordOrigin, SourceFile, SourcedRecord};
use crate::pipeline::LoadedSource;

mod deduplication_tests;
mod processor_tests;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A successfully read source built from `date,max,quality,min` rows
pub fn loaded_source(index: usize, name: &str, period: Option<&str>, rows: &[&str]) -> LoadedSource {
    let mut file = SourceFile::new(name);
    if let Some(period) = period {
        file = file.with_period(period);
    }
    LoadedSource {
        index,
        period: file.parsed_period().unwrap(),
        outcome: Ok(RecordExtractor::new().extract(name, &compact_export(rows))),
        file,
    }
}

/// A source that could not be found
pub fn missing_source(index: usize, name: &str) -> LoadedSource {
    LoadedSource {
        index,
        file: SourceFile::new(name),
        period: None,
        outcome: Err(SeriesError::SourceNotFound { path: name.into() }),
    }
}

/// A sourced record with a synthetic origin
pub fn sourced(source_index: usize, source: &str, day: NaiveDate, max: f64, min: f64) -> SourcedRecord {
    SourcedRecord {
        record: DailyRecord::new(day, max, min),
        origin: RecordOrigin {
            source_index,
            source: Arc::from(source),
            line: 7,
            period: None,
        },
    }
}

/// Rows for every day in `[start, end]` with a constant reading
pub fn daily_rows(start: NaiveDate, end: NaiveDate, max: f64, min: f64) -> Vec<String> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| format!("{},{:.1},8,{:.1}", day.format("%Y/%-m/%-d"), max, min))
        .collect()
}
