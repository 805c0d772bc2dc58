//! Temperature aggregations over a daily series
//!
//! Annual, monthly, month-by-year and day-of-year means. Every mean is
//! rounded to one decimal (half away from zero); `temp_diff` is the rounded
//! difference of the unrounded means.
//!
//! Readings are averaged per field over the records that carry them. A group
//! is only emitted when both fields have at least one reading.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{DAYS_IN_MONTH, MONTH_NAMES};
use crate::models::{DailyRecord, YearRange};

use super::report::WarmingDelta;

/// Round to one decimal place, halves away from zero
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn month_name(month: u32) -> String {
    MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or_default()
        .to_string()
}

/// Running sums for one aggregation group
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    max_sum: f64,
    max_count: usize,
    min_sum: f64,
    min_count: usize,
    records: usize,
}

impl Accumulator {
    fn add(&mut self, record: &DailyRecord) {
        self.records += 1;
        if let Some(max) = record.max_temp() {
            self.max_sum += max;
            self.max_count += 1;
        }
        if let Some(min) = record.min_temp() {
            self.min_sum += min;
            self.min_count += 1;
        }
    }

    /// Unrounded (max, min) means, when both fields have readings
    fn means(&self) -> Option<(f64, f64)> {
        if self.max_count == 0 || self.min_count == 0 {
            return None;
        }
        Some((
            self.max_sum / self.max_count as f64,
            self.min_sum / self.min_count as f64,
        ))
    }
}

/// Rounded means shared by every aggregate shape
#[derive(Debug, Clone, Copy, PartialEq)]
struct Means {
    avg_max_temp: f64,
    avg_min_temp: f64,
    temp_diff: f64,
}

impl Means {
    fn from_unrounded(avg_max: f64, avg_min: f64) -> Self {
        Self {
            avg_max_temp: round1(avg_max),
            avg_min_temp: round1(avg_min),
            temp_diff: round1(avg_max - avg_min),
        }
    }
}

fn group_by<'a, K, I, F>(records: I, key: F) -> BTreeMap<K, Accumulator>
where
    K: Ord,
    I: IntoIterator<Item = &'a DailyRecord>,
    F: Fn(&DailyRecord) -> Option<K>,
{
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    for record in records {
        if let Some(k) = key(record) {
            groups.entry(k).or_default().add(record);
        }
    }
    groups
}

// =============================================================================
// Annual
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualAggregate {
    pub year: i32,
    pub avg_max_temp: f64,
    pub avg_min_temp: f64,
    pub temp_diff: f64,
    /// Records contributing; 0 for interpolated years
    pub data_count: usize,
    #[serde(default)]
    pub interpolated: bool,
}

/// Per-year means, ascending by year, observed years only
pub fn annual_aggregates<'a, I>(records: I) -> Vec<AnnualAggregate>
where
    I: IntoIterator<Item = &'a DailyRecord>,
{
    group_by(records, |r| Some(r.year()))
        .into_iter()
        .filter_map(|(year, acc)| {
            let (max, min) = acc.means()?;
            let means = Means::from_unrounded(max, min);
            Some(AnnualAggregate {
                year,
                avg_max_temp: means.avg_max_temp,
                avg_min_temp: means.avg_min_temp,
                temp_diff: means.temp_diff,
                data_count: acc.records,
                interpolated: false,
            })
        })
        .collect()
}

/// Insert linearly interpolated entries for years missing between observed ones
///
/// Each gap is interpolated between the observed years on either side of it.
/// Years outside the observed span are not added.
pub fn fill_missing_years(mut annual: Vec<AnnualAggregate>) -> Vec<AnnualAggregate> {
    annual.sort_by_key(|a| a.year);

    let mut filled: Vec<AnnualAggregate> = Vec::with_capacity(annual.len());
    for next in annual {
        if let Some(prev) = filled.last().copied() {
            for year in (prev.year + 1)..next.year {
                let ratio = f64::from(year - prev.year) / f64::from(next.year - prev.year);
                let max = prev.avg_max_temp + (next.avg_max_temp - prev.avg_max_temp) * ratio;
                let min = prev.avg_min_temp + (next.avg_min_temp - prev.avg_min_temp) * ratio;
                let means = Means::from_unrounded(max, min);
                filled.push(AnnualAggregate {
                    year,
                    avg_max_temp: means.avg_max_temp,
                    avg_min_temp: means.avg_min_temp,
                    temp_diff: means.temp_diff,
                    data_count: 0,
                    interpolated: true,
                });
            }
        }
        filled.push(next);
    }
    filled
}

// =============================================================================
// Monthly
// =============================================================================

/// Means for one calendar month across all years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub month: u32,
    pub month_name: String,
    pub avg_max_temp: f64,
    pub avg_min_temp: f64,
    pub temp_diff: f64,
    pub data_count: usize,
}

pub fn monthly_aggregates<'a, I>(records: I) -> Vec<MonthlyAggregate>
where
    I: IntoIterator<Item = &'a DailyRecord>,
{
    group_by(records, |r| Some(r.month()))
        .into_iter()
        .filter_map(|(month, acc)| {
            let (max, min) = acc.means()?;
            let means = Means::from_unrounded(max, min);
            Some(MonthlyAggregate {
                month,
                month_name: month_name(month),
                avg_max_temp: means.avg_max_temp,
                avg_min_temp: means.avg_min_temp,
                temp_diff: means.temp_diff,
                data_count: acc.records,
            })
        })
        .collect()
}

/// Means for one calendar month in one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyYearlyAggregate {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub avg_max_temp: f64,
    pub avg_min_temp: f64,
    pub temp_diff: f64,
    pub data_count: usize,
}

/// Year-by-year means of `target_month`, ascending by year
pub fn monthly_yearly_aggregates<'a, I>(records: I, target_month: u32) -> Vec<MonthlyYearlyAggregate>
where
    I: IntoIterator<Item = &'a DailyRecord>,
{
    group_by(records, |r| (r.month() == target_month).then_some(r.year()))
        .into_iter()
        .filter_map(|(year, acc)| {
            let (max, min) = acc.means()?;
            let means = Means::from_unrounded(max, min);
            Some(MonthlyYearlyAggregate {
                year,
                month: target_month,
                month_name: month_name(target_month),
                avg_max_temp: means.avg_max_temp,
                avg_min_temp: means.avg_min_temp,
                temp_diff: means.temp_diff,
                data_count: acc.records,
            })
        })
        .collect()
}

// =============================================================================
// Day of Year
// =============================================================================

/// Means for one day of a 365-day calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyClimatology {
    /// 1..=365, with February fixed at 28 days
    pub day_of_year: u32,
    pub month: u32,
    pub day: u32,
    /// `M/D` label, unpadded
    pub date_label: String,
    pub avg_max_temp: f64,
    pub avg_min_temp: f64,
    pub temp_diff: f64,
    pub data_count: usize,
}

/// Day-of-year means across all years; February 29 is excluded
pub fn daily_climatology<'a, I>(records: I) -> Vec<DailyClimatology>
where
    I: IntoIterator<Item = &'a DailyRecord>,
{
    let groups = group_by(records, |r| {
        (!(r.month() == 2 && r.day() == 29)).then_some((r.month(), r.day()))
    });

    let mut result = Vec::new();
    let mut day_of_year = 0;
    for (month, &days) in (1u32..).zip(DAYS_IN_MONTH.iter()) {
        for day in 1..=days {
            day_of_year += 1;
            let Some(acc) = groups.get(&(month, day)) else {
                continue;
            };
            let Some((max, min)) = acc.means() else {
                continue;
            };
            let means = Means::from_unrounded(max, min);
            result.push(DailyClimatology {
                day_of_year,
                month,
                day,
                date_label: format!("{}/{}", month, day),
                avg_max_temp: means.avg_max_temp,
                avg_min_temp: means.avg_min_temp,
                temp_diff: means.temp_diff,
                data_count: acc.records,
            });
        }
    }
    result
}

// =============================================================================
// Trends
// =============================================================================

/// Least-squares fit of annual mean maximum against year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    /// °C per year
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn value_at(&self, year: i32) -> f64 {
        self.slope * f64::from(year) + self.intercept
    }

    pub fn per_century(&self) -> f64 {
        self.slope * 100.0
    }
}

/// Returns `None` with fewer than two distinct years
pub fn trend_line(annual: &[AnnualAggregate]) -> Option<TrendLine> {
    let n = annual.len() as f64;
    let (sum_x, sum_y, sum_xy, sum_xx) = annual.iter().fold((0.0, 0.0, 0.0, 0.0), |acc, a| {
        let x = f64::from(a.year);
        let y = a.avg_max_temp;
        (acc.0 + x, acc.1 + y, acc.2 + x * y, acc.3 + x * x)
    });

    let denominator = n * sum_xx - sum_x * sum_x;
    if annual.len() < 2 || denominator == 0.0 {
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    Some(TrendLine { slope, intercept })
}

/// Mean annual maximum of the last `window` target years minus the first
///
/// Only observed years inside `target` count. Needs at least `window` of them.
pub fn warming_delta(annual: &[AnnualAggregate], target: YearRange, window: usize) -> Option<WarmingDelta> {
    let in_target: Vec<f64> = annual
        .iter()
        .filter(|a| !a.interpolated && target.contains(a.year))
        .map(|a| a.avg_max_temp)
        .collect();

    if window == 0 || in_target.len() < window {
        return None;
    }

    let mean = |values: &[f64]| values.iter().sum::<f64>() / values.len() as f64;
    let early_mean = mean(&in_target[..window]);
    let late_mean = mean(&in_target[in_target.len() - window..]);

    Some(WarmingDelta {
        window,
        early_mean,
        late_mean,
        delta: late_mean - early_mean,
    })
}
