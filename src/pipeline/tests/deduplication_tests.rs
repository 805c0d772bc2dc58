//! Tests for last-write-wins deduplication

use super::*;
use crate::models::SourcePeriod;
use crate::pipeline::deduplication::{
    analyze_duplicate_patterns, deduplicate_last_write_wins, get_deduplication_metrics,
    is_authority_inversion,
};

#[test]
fn test_unique_dates_pass_through() {
    let records = vec![
        sourced(0, "a", date(2020, 1, 1), 10.0, 1.0),
        sourced(0, "a", date(2020, 1, 2), 11.0, 2.0),
    ];

    let result = deduplicate_last_write_wins(records.clone());

    assert_eq!(result.records, records);
    assert_eq!(result.collision_count(), 0);
}

#[test]
fn test_last_record_for_a_date_wins() {
    let records = vec![
        sourced(0, "a", date(2020, 1, 1), 10.0, 1.0),
        sourced(0, "a", date(2020, 1, 2), 11.0, 2.0),
        sourced(1, "b", date(2020, 1, 2), 12.0, 3.0),
        sourced(2, "c", date(2020, 1, 2), 13.0, 4.0),
    ];

    let result = deduplicate_last_write_wins(records);

    assert_eq!(result.records.len(), 2);
    let winner = &result.records[1];
    assert_eq!(winner.record.max_temp(), Some(13.0));
    assert_eq!(&*winner.origin.source, "c");
    assert_eq!(result.collision_count(), 2);
    assert_eq!(&*result.collisions[1].replaced.source, "b");
}

#[test]
fn test_winner_is_taken_whole_without_arbitration() {
    let mut later = sourced(1, "b", date(2020, 1, 1), 0.0, 0.0);
    later.record = DailyRecord::with_readings(date(2020, 1, 1), None, Some(0.0));
    let records = vec![sourced(0, "a", date(2020, 1, 1), 10.0, 1.0), later];

    let result = deduplicate_last_write_wins(records);

    assert_eq!(result.records[0].record.max_temp(), None);
}

#[test]
fn test_output_is_sorted_even_from_unsorted_input() {
    let records = vec![
        sourced(0, "a", date(2020, 1, 3), 1.0, 0.0),
        sourced(0, "a", date(2020, 1, 1), 1.0, 0.0),
        sourced(0, "a", date(2020, 1, 2), 1.0, 0.0),
    ];

    let result = deduplicate_last_write_wins(records);
    let dates: Vec<_> = result.records.iter().map(|r| r.record.date()).collect();

    assert_eq!(dates, vec![date(2020, 1, 1), date(2020, 1, 2), date(2020, 1, 3)]);
}

#[test]
fn test_every_output_date_is_unique_and_last_in_input() {
    let input: Vec<SourcedRecord> = (0..60)
        .map(|i| sourced(i / 10, "a", date(2021, 3, 1 + (i % 7) as u32), i as f64, 0.0))
        .collect();

    let result = deduplicate_last_write_wins(input.clone());

    assert_eq!(result.records.len(), 7);
    assert_eq!(result.collision_count(), 53);
    for sourced in &result.records {
        let last = input
            .iter()
            .rev()
            .find(|r| r.record.date() == sourced.record.date())
            .unwrap();
        assert_eq!(sourced, last);
    }
}

#[test]
fn test_authority_inversion_is_flagged_not_fixed() {
    let newer: SourcePeriod = "2010-2025".parse().unwrap();
    let older: SourcePeriod = "1995-2010".parse().unwrap();

    let mut from_newer = sourced(0, "data-utf8.csv", date(2010, 1, 1), 9.0, 1.0);
    from_newer.origin.period = Some(newer);
    let mut from_older = sourced(1, "data-2.csv", date(2010, 1, 1), 8.0, 0.5);
    from_older.origin.period = Some(older);

    // Older era listed after the newer one overrides it
    let result = deduplicate_last_write_wins(vec![from_newer, from_older]);

    assert_eq!(result.records[0].record.max_temp(), Some(8.0));
    assert_eq!(result.authority_inversions().count(), 1);
    assert!(result.collisions[0].authority_inversion);
}

#[test]
fn test_no_inversion_without_declared_periods() {
    let a = sourced(0, "a", date(2020, 1, 1), 1.0, 0.0);
    let b = sourced(1, "b", date(2020, 1, 1), 1.0, 0.0);
    assert!(!is_authority_inversion(&b.origin, &a.origin));
}

#[test]
fn test_analyze_duplicate_patterns() {
    let records = vec![
        DailyRecord::new(date(2020, 1, 1), 1.0, 0.0),
        DailyRecord::new(date(2020, 1, 1), 1.0, 0.0),
        DailyRecord::new(date(2020, 1, 1), 1.0, 0.0),
        DailyRecord::new(date(2020, 1, 2), 1.0, 0.0),
        DailyRecord::new(date(2020, 1, 3), 1.0, 0.0),
        DailyRecord::new(date(2020, 1, 3), 1.0, 0.0),
    ];

    assert_eq!(analyze_duplicate_patterns(&records), (3, 2, 3));
}

#[test]
fn test_deduplication_metrics() {
    assert_eq!(get_deduplication_metrics(200, 150), (25.0, 50));
    assert_eq!(get_deduplication_metrics(0, 0), (0.0, 0));
}
