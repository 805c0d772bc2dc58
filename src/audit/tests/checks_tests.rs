//! Tests for individual quality checks

use super::*;
use crate::audit::aggregate::{AnnualAggregate, annual_aggregates};
use crate::audit::checks::*;
use crate::models::YearRange;

#[test]
fn test_leap_year_expectation() {
    assert_eq!(expected_days_in_year(2020), 366);
    assert_eq!(expected_days_in_year(2019), 365);
    assert_eq!(expected_days_in_year(1900), 365);
    assert_eq!(expected_days_in_year(2000), 366);
}

#[test]
fn test_single_gap_between_two_and_five() {
    let records = vec![
        DailyRecord::new(date(2020, 1, 1), 10.0, 1.0),
        DailyRecord::new(date(2020, 1, 2), 10.0, 1.0),
        DailyRecord::new(date(2020, 1, 5), 10.0, 1.0),
    ];

    let gaps = find_date_gaps(&records);

    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].start, date(2020, 1, 3));
    assert_eq!(gaps[0].end, date(2020, 1, 4));
    assert_eq!(gaps[0].days, 2);
}

#[test]
fn test_gap_across_year_and_leap_day() {
    let records = vec![
        DailyRecord::new(date(2019, 12, 31), 10.0, 1.0),
        DailyRecord::new(date(2020, 3, 1), 10.0, 1.0),
    ];

    let gaps = find_date_gaps(&records);

    assert_eq!(gaps[0].start, date(2020, 1, 1));
    assert_eq!(gaps[0].end, date(2020, 2, 29));
    assert_eq!(gaps[0].days, 60);
}

#[test]
fn test_contiguous_series_has_no_gaps() {
    let records = full_days(date(2019, 12, 1), date(2020, 3, 31), 10.0, 1.0);
    assert!(find_date_gaps(&records).is_empty());
    assert!(find_date_gaps(&[]).is_empty());
}

#[test]
fn test_year_counts_flag_shortfall() {
    let mut records = full_days(date(1994, 1, 1), date(1994, 12, 31), 20.0, 10.0);
    records.retain(|r| r.date() != date(1994, 7, 18));
    records.extend(full_days(date(1996, 1, 1), date(1996, 12, 31), 20.0, 10.0));

    let counts = year_counts(&records);

    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0].days, 364);
    assert_eq!(counts[0].shortfall(), 1);
    assert!(counts[1].is_complete());
    assert_eq!(counts[1].expected, 366);
}

#[test]
fn test_incomplete_threshold() {
    let mut records = full_days(date(2020, 1, 1), date(2020, 12, 31), 20.0, 10.0);
    records.extend(full_days(date(2021, 1, 1), date(2021, 3, 31), 20.0, 10.0));

    let counts = year_counts(&records);
    let incomplete = incomplete_years(&counts, 300);

    assert_eq!(incomplete.len(), 1);
    assert_eq!(incomplete[0].year, 2021);
    assert_eq!(incomplete[0].days, 90);
}

#[test]
fn test_missing_years_in_span_and_target() {
    let records = vec![
        DailyRecord::new(date(1935, 6, 1), 20.0, 10.0),
        DailyRecord::new(date(1936, 6, 1), 20.0, 10.0),
        DailyRecord::new(date(1939, 6, 1), 20.0, 10.0),
    ];
    let counts = year_counts(&records);

    let missing = missing_years(&counts, Some(YearRange::new(1936, 1940)));

    assert_eq!(missing.observed_span, Some(YearRange::new(1935, 1939)));
    assert_eq!(missing.missing_in_span, vec![1937, 1938]);
    assert_eq!(missing.missing_in_target, vec![1937, 1938, 1940]);
    assert_eq!(missing.extra_years, vec![1935]);
    assert!((missing.target_completeness - 40.0).abs() < 1e-9);
}

#[test]
fn test_missing_years_without_target() {
    let missing = missing_years(&[], None);
    assert_eq!(missing.observed_span, None);
    assert!(missing.missing_in_span.is_empty());
    assert_eq!(missing.target_completeness, 0.0);
}

#[test]
fn test_null_counts() {
    let records = vec![
        DailyRecord::with_readings(date(2020, 1, 1), None, Some(1.0)),
        DailyRecord::with_readings(date(2020, 1, 2), None, None),
        DailyRecord::new(date(2020, 1, 3), 5.0, 1.0),
    ];

    let counts = null_counts(&records);

    assert_eq!(counts.max_temp, 2);
    assert_eq!(counts.min_temp, 1);
    assert!(!counts.is_clean());
}

#[test]
fn test_implausible_records() {
    let records = vec![
        DailyRecord::new(date(2020, 1, 1), 5.0, 10.0),
        DailyRecord::new(date(2020, 1, 2), 10.0, 5.0),
        DailyRecord::new(date(2020, 1, 3), 7.5, 7.5),
    ];

    let implausible = implausible_records(&records);

    assert_eq!(implausible.len(), 1);
    assert_eq!(implausible[0].date, date(2020, 1, 1));
    assert_eq!(implausible[0].max_temp, 5.0);
}

#[test]
fn test_temperature_extremes_prefer_earliest_tie() {
    let records = vec![
        DailyRecord::new(date(2020, 1, 1), 30.0, -2.0),
        DailyRecord::new(date(2020, 1, 2), 39.5, 28.0),
        DailyRecord::new(date(2020, 1, 3), 39.5, -2.0),
        DailyRecord::new(date(2020, 1, 4), -1.0, -5.0),
    ];

    let extremes = temperature_extremes(&records);

    let highest = extremes.highest_max.unwrap();
    assert_eq!(highest.value, 39.5);
    assert_eq!(highest.date, date(2020, 1, 2));
    assert_eq!(extremes.lowest_max.unwrap().value, -1.0);
    assert_eq!(extremes.highest_min.unwrap().value, 28.0);
    assert_eq!(extremes.lowest_min.unwrap().date, date(2020, 1, 4));
}

#[test]
fn test_month_distribution_has_twelve_entries() {
    let records = full_days(date(2020, 1, 1), date(2020, 2, 29), 10.0, 1.0);

    let distribution = month_distribution(&records);

    assert_eq!(distribution.len(), 12);
    assert_eq!(distribution[0].days, 31);
    assert_eq!(distribution[1].days, 29);
    assert_eq!(distribution[1].name, "Feb");
    assert_eq!(distribution[11].days, 0);
}

#[test]
fn test_extreme_averages_outside_bands() {
    let mut records = full_days(date(2020, 1, 1), date(2020, 1, 10), 40.0, 10.0);
    records.extend(full_days(date(2021, 1, 1), date(2021, 1, 10), 20.0, -3.0));
    records.extend(full_days(date(2022, 1, 1), date(2022, 1, 10), 20.0, 10.0));
    let annual = annual_aggregates(&records);

    let flagged = extreme_averages(&annual, (15.0, 35.0), (0.0, 25.0));

    assert_eq!(flagged.len(), 2);
    assert!(flagged[0].max_out_of_band && !flagged[0].min_out_of_band);
    assert!(!flagged[1].max_out_of_band && flagged[1].min_out_of_band);
}

#[test]
fn test_extreme_averages_ignore_interpolated_years() {
    let annual = vec![AnnualAggregate {
        year: 2000,
        avg_max_temp: 50.0,
        avg_min_temp: 10.0,
        temp_diff: 40.0,
        data_count: 0,
        interpolated: true,
    }];
    assert!(extreme_averages(&annual, (15.0, 35.0), (0.0, 25.0)).is_empty());
}
