//! End-to-end tests of the synchronous reconciliation stages

use super::*;
use crate::models::YearRange;
use crate::pipeline::{MergeResult, SeriesReconciler, merge_sources};

fn as_strs(rows: &[String]) -> Vec<&str> {
    rows.iter().map(String::as_str).collect()
}

#[test]
fn test_overlapping_eras_reconcile_to_contiguous_series() {
    let older = daily_rows(date(2019, 12, 30), date(2020, 1, 2), 10.0, 1.0);
    let newer = daily_rows(date(2020, 1, 1), date(2020, 1, 5), 12.0, 3.0);

    let merged = merge_sources(vec![
        loaded_source(0, "a.csv", Some("2019-2020"), &as_strs(&older)),
        loaded_source(1, "b.csv", Some("2020-2021"), &as_strs(&newer)),
    ])
    .unwrap();

    let result = SeriesReconciler::new(YearRange::new(1890, 2024))
        .reconcile(merged)
        .unwrap();

    let series = &result.series;
    assert_eq!(series.len(), 7);
    assert_eq!(series.first().unwrap().date(), date(2019, 12, 30));
    assert_eq!(series.last().unwrap().date(), date(2020, 1, 5));

    // No gaps
    for pair in series.records().windows(2) {
        assert_eq!(pair[1].date() - pair[0].date(), chrono::Duration::days(1));
    }

    // Overlap takes the later source's values
    for record in series.iter().filter(|r| r.year() == 2020 && r.day() <= 2) {
        assert_eq!(record.max_temp(), Some(12.0));
        assert_eq!(record.min_temp(), Some(3.0));
    }
    assert_eq!(series.records()[0].max_temp(), Some(10.0));

    assert_eq!(result.stats.merged, 9);
    assert_eq!(result.stats.duplicated_dates, 2);
    assert_eq!(result.stats.duplicates_resolved, 2);
    assert_eq!(result.stats.authority_inversions, 0);
    assert_eq!(result.stats.outside_period, 0);
    assert!((result.stats.dedup_reduction - 200.0 / 9.0).abs() < 1e-9);
    assert_eq!(result.stats.final_output, 7);
}

#[test]
fn test_records_outside_declared_period_are_counted_not_dropped() {
    let merged = merge_sources(vec![loaded_source(
        0,
        "data-2.csv",
        Some("1995-2010"),
        &["2010/12/31,8.0,8,0.5", "2011/1/1,9.0,8,1.0", "2011/1/2,9.5,8,1.5"],
    )])
    .unwrap();

    let result = SeriesReconciler::new(YearRange::new(1890, 2024))
        .reconcile(merged)
        .unwrap();

    assert_eq!(result.stats.outside_period, 2);
    assert_eq!(result.series.len(), 3);
}

#[test]
fn test_older_era_listed_last_overrides_and_is_flagged() {
    let merged = merge_sources(vec![
        loaded_source(0, "new.csv", Some("2010-2025"), &["2010/1/1,9.0,8,1.0"]),
        loaded_source(1, "old.csv", Some("1995-2010"), &["2010/1/1,8.0,8,0.5"]),
    ])
    .unwrap();

    let result = SeriesReconciler::new(YearRange::new(1890, 2024))
        .reconcile(merged)
        .unwrap();

    assert_eq!(result.series.records()[0].max_temp(), Some(8.0));
    assert_eq!(result.stats.authority_inversions, 1);
    assert!(result.collisions[0].authority_inversion);
}

#[test]
fn test_year_filter_runs_after_deduplication() {
    let merged = merge_sources(vec![loaded_source(
        0,
        "a.csv",
        None,
        &["1889/12/31,5.0,8,1.0", "1890/1/1,5.0,8,1.0", "2024/12/31,5.0,8,1.0", "2025/1/1,5.0,8,1.0"],
    )])
    .unwrap();

    let result = SeriesReconciler::new(YearRange::new(1890, 2024))
        .reconcile(merged)
        .unwrap();

    let years: Vec<i32> = result.series.iter().map(|r| r.year()).collect();
    assert_eq!(years, vec![1890, 2024]);
    assert_eq!(result.stats.out_of_range, 2);
}

#[test]
fn test_empty_merge_reconciles_to_empty_series() {
    let result = SeriesReconciler::new(YearRange::new(1890, 2024))
        .reconcile(MergeResult::default())
        .unwrap();

    assert!(result.series.is_empty());
    assert_eq!(result.stats.retention_rate(), 0.0);
}

#[test]
fn test_missing_readings_survive_reconciliation() {
    let mut merged =
        merge_sources(vec![loaded_source(0, "a.csv", None, &["2020/1/1,10.0,8,1.0"])]).unwrap();
    merged.records[0].record = DailyRecord::with_readings(date(2020, 1, 1), Some(10.0), None);

    let result = SeriesReconciler::new(YearRange::new(2020, 2020))
        .reconcile(merged)
        .unwrap();

    assert_eq!(result.series.records()[0].min_temp(), None);
}

#[test]
fn test_failures_and_sources_are_passed_through() {
    let merged = merge_sources(vec![
        loaded_source(0, "a.csv", None, &["2020/1/1,10.0,8,1.0"]),
        missing_source(1, "b.csv"),
    ])
    .unwrap();

    let result = SeriesReconciler::new(YearRange::new(2020, 2020))
        .reconcile(merged)
        .unwrap();

    assert_eq!(result.sources.len(), 1);
    assert_eq!(result.failures.len(), 1);
}
