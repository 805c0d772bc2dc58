//! Read-only quality checks over a daily series
//!
//! Each check is an independent pass. Inputs are assumed date-ordered; the
//! auditor guarantees that by only accepting a [`CanonicalSeries`].
//!
//! [`CanonicalSeries`]: crate::models::CanonicalSeries

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::aggregate::AnnualAggregate;
use super::report::{
    DateGap, Extreme, ExtremeAverage, ImplausibleRecord, MissingYears, MonthCount, NullCounts,
    TemperatureExtremes, YearCount,
};
use crate::constants::MONTH_NAMES;
use crate::models::{DailyRecord, YearRange};

/// Gregorian leap-year rule
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn expected_days_in_year(year: i32) -> usize {
    if is_leap_year(year) { 366 } else { 365 }
}

// =============================================================================
// Continuity
// =============================================================================

/// Observed day counts per year, ascending
pub fn year_counts(records: &[DailyRecord]) -> Vec<YearCount> {
    let mut days: BTreeMap<i32, usize> = BTreeMap::new();
    for record in records {
        *days.entry(record.year()).or_insert(0) += 1;
    }

    days.into_iter()
        .map(|(year, days)| YearCount {
            year,
            days,
            expected: expected_days_in_year(year),
        })
        .collect()
}

/// Years with fewer than `threshold` days
pub fn incomplete_years(counts: &[YearCount], threshold: usize) -> Vec<YearCount> {
    counts
        .iter()
        .filter(|count| count.days < threshold)
        .copied()
        .collect()
}

/// Years absent from the observed span, and from `target` when given
pub fn missing_years(counts: &[YearCount], target: Option<YearRange>) -> MissingYears {
    let observed: Vec<i32> = counts.iter().map(|count| count.year).collect();
    let observed_span = match (observed.first(), observed.last()) {
        (Some(&first), Some(&last)) => Some(YearRange::new(first, last)),
        _ => None,
    };

    let absent_from = |range: YearRange| -> Vec<i32> {
        range
            .years()
            .filter(|year| observed.binary_search(year).is_err())
            .collect()
    };

    let missing_in_span = observed_span.map(absent_from).unwrap_or_default();

    let (missing_in_target, extra_years, target_completeness) = match target {
        Some(target) => {
            let missing = absent_from(target);
            let extra: Vec<i32> = observed
                .iter()
                .copied()
                .filter(|year| !target.contains(*year))
                .collect();
            let completeness = if target.is_empty() {
                0.0
            } else {
                let present = target.len() - missing.len();
                (present as f64 / target.len() as f64) * 100.0
            };
            (missing, extra, completeness)
        }
        None => (Vec::new(), Vec::new(), 0.0),
    };

    MissingYears {
        observed_span,
        missing_in_span,
        target_span: target,
        missing_in_target,
        extra_years,
        target_completeness,
    }
}

/// Every adjacent pair not exactly one day apart, as a gap of missing days
pub fn find_date_gaps(records: &[DailyRecord]) -> Vec<DateGap> {
    records
        .windows(2)
        .filter_map(|pair| {
            let (previous, next) = (pair[0].date(), pair[1].date());
            let days = (next - previous).num_days() - 1;
            if days < 1 {
                return None;
            }
            Some(DateGap {
                start: previous.succ_opt()?,
                end: next.pred_opt()?,
                days,
            })
        })
        .collect()
}

// =============================================================================
// Values
// =============================================================================

pub fn null_counts(records: &[DailyRecord]) -> NullCounts {
    records.iter().fold(NullCounts::default(), |mut counts, record| {
        if record.max_temp().is_none() {
            counts.max_temp += 1;
        }
        if record.min_temp().is_none() {
            counts.min_temp += 1;
        }
        counts
    })
}

/// Records whose maximum is below their minimum
pub fn implausible_records(records: &[DailyRecord]) -> Vec<ImplausibleRecord> {
    records
        .iter()
        .filter(|record| !record.is_plausible())
        .filter_map(|record| {
            let (max_temp, min_temp) = record.temperatures()?;
            Some(ImplausibleRecord {
                date: record.date(),
                max_temp,
                min_temp,
            })
        })
        .collect()
}

/// Highest and lowest reading of each field; the earliest date wins ties
pub fn temperature_extremes(records: &[DailyRecord]) -> TemperatureExtremes {
    fn update(slot: &mut Option<Extreme>, date: NaiveDate, value: f64, replace: fn(f64, f64) -> bool) {
        match slot {
            Some(current) if !replace(value, current.value) => {}
            _ => *slot = Some(Extreme { date, value }),
        }
    }

    let mut extremes = TemperatureExtremes::default();
    for record in records {
        if let Some(max) = record.max_temp() {
            update(&mut extremes.highest_max, record.date(), max, |a, b| a > b);
            update(&mut extremes.lowest_max, record.date(), max, |a, b| a < b);
        }
        if let Some(min) = record.min_temp() {
            update(&mut extremes.highest_min, record.date(), min, |a, b| a > b);
            update(&mut extremes.lowest_min, record.date(), min, |a, b| a < b);
        }
    }
    extremes
}

/// Days per calendar month, January first
pub fn month_distribution(records: &[DailyRecord]) -> Vec<MonthCount> {
    let mut days = [0usize; 12];
    for record in records {
        if let Some(slot) = days.get_mut(record.month() as usize - 1) {
            *slot += 1;
        }
    }

    MONTH_NAMES
        .iter()
        .zip(days)
        .zip(1u32..)
        .map(|((name, days), month)| MonthCount {
            month,
            name: name.to_string(),
            days,
        })
        .collect()
}

/// Years whose mean maximum or minimum lies outside its band (bounds inclusive)
pub fn extreme_averages(
    annual: &[AnnualAggregate],
    max_band: (f64, f64),
    min_band: (f64, f64),
) -> Vec<ExtremeAverage> {
    let outside = |value: f64, (low, high): (f64, f64)| value < low || value > high;

    annual
        .iter()
        .filter(|a| !a.interpolated)
        .filter_map(|a| {
            let max_out_of_band = outside(a.avg_max_temp, max_band);
            let min_out_of_band = outside(a.avg_min_temp, min_band);
            (max_out_of_band || min_out_of_band).then_some(ExtremeAverage {
                year: a.year,
                avg_max_temp: a.avg_max_temp,
                avg_min_temp: a.avg_min_temp,
                max_out_of_band,
                min_out_of_band,
            })
        })
        .collect()
}
