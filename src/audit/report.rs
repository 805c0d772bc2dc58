//! Data models for quality audit findings
//!
//! Every finding is plain data. Nothing here represents a failure; the
//! report is meant to be rendered for people or serialized for tools.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::aggregate::{AnnualAggregate, TrendLine};
use crate::models::{YearRange, canonical_date};

// =============================================================================
// Report Structure
// =============================================================================

/// Everything the auditor learned about one canonical series
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityReport {
    /// Records in the audited series
    pub total_records: usize,

    #[serde(with = "canonical_date::option")]
    pub first_date: Option<NaiveDate>,

    #[serde(with = "canonical_date::option")]
    pub last_date: Option<NaiveDate>,

    /// Day counts for every observed year, ascending
    pub year_counts: Vec<YearCount>,

    /// Years with fewer days than the incomplete-year threshold
    pub incomplete_years: Vec<YearCount>,

    /// Day count below which a year is reported as incomplete
    pub incomplete_year_threshold: usize,

    pub missing_years: MissingYears,

    /// Every date gap, in order; display may truncate
    pub gaps: Vec<DateGap>,

    pub null_counts: NullCounts,

    /// Records whose maximum is below their minimum
    pub implausible: Vec<ImplausibleRecord>,

    pub extremes: TemperatureExtremes,

    /// Days observed per calendar month (always 12 entries)
    pub month_distribution: Vec<MonthCount>,

    /// Per-year means, without interpolation
    pub annual: Vec<AnnualAggregate>,

    /// Years whose annual means fall outside the plausibility bands
    pub extreme_averages: Vec<ExtremeAverage>,

    pub trend: Option<TrendLine>,

    pub warming: Option<WarmingDelta>,
}

impl QualityReport {
    /// Years with fewer days than the calendar allows
    pub fn short_years(&self) -> impl Iterator<Item = &YearCount> {
        self.year_counts.iter().filter(|count| !count.is_complete())
    }

    pub fn total_gap_days(&self) -> i64 {
        self.gaps.iter().map(|gap| gap.days).sum()
    }

    /// Day count of the first observed year
    pub fn first_year_days(&self) -> Option<&YearCount> {
        self.year_counts.first()
    }

    /// Day count of the last observed year
    pub fn last_year_days(&self) -> Option<&YearCount> {
        self.year_counts.last()
    }

    /// No gaps, no missing readings, no implausible records, no missing years
    pub fn is_clean(&self) -> bool {
        self.gaps.is_empty()
            && self.null_counts.is_clean()
            && self.implausible.is_empty()
            && self.missing_years.missing_in_span.is_empty()
    }
}

// =============================================================================
// Continuity Findings
// =============================================================================

/// Observed versus expected days for one year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub days: usize,
    /// 366 for leap years, otherwise 365
    pub expected: usize,
}

impl YearCount {
    pub fn shortfall(&self) -> usize {
        self.expected.saturating_sub(self.days)
    }

    pub fn is_complete(&self) -> bool {
        self.days >= self.expected
    }
}

/// A run of consecutive calendar days with no record
///
/// `start` and `end` are the first and last missing days, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateGap {
    #[serde(with = "canonical_date")]
    pub start: NaiveDate,
    #[serde(with = "canonical_date")]
    pub end: NaiveDate,
    pub days: i64,
}

/// Years absent from the observed span and from the target span
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingYears {
    /// First to last observed year, if any records exist
    pub observed_span: Option<YearRange>,

    /// Years inside the observed span with no record at all
    pub missing_in_span: Vec<i32>,

    pub target_span: Option<YearRange>,

    /// Target-span years with no record
    pub missing_in_target: Vec<i32>,

    /// Observed years outside the target span
    pub extra_years: Vec<i32>,

    /// Share of target-span years with at least one record, in percent
    pub target_completeness: f64,
}

// =============================================================================
// Value Findings
// =============================================================================

/// Count of records lacking each reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullCounts {
    pub max_temp: usize,
    pub min_temp: usize,
}

impl NullCounts {
    pub fn total(&self) -> usize {
        self.max_temp + self.min_temp
    }

    /// Extraction drops rows without readings, so anything else is a regression
    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

/// A record with its maximum below its minimum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImplausibleRecord {
    #[serde(with = "canonical_date")]
    pub date: NaiveDate,
    pub max_temp: f64,
    pub min_temp: f64,
}

/// A single reading at one end of a field's range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extreme {
    #[serde(with = "canonical_date")]
    pub date: NaiveDate,
    pub value: f64,
}

/// Highest and lowest reading of each field
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureExtremes {
    pub highest_max: Option<Extreme>,
    pub lowest_max: Option<Extreme>,
    pub highest_min: Option<Extreme>,
    pub lowest_min: Option<Extreme>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    pub month: u32,
    pub name: String,
    pub days: usize,
}

/// A year whose mean readings look physically unlikely for the station
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtremeAverage {
    pub year: i32,
    pub avg_max_temp: f64,
    pub avg_min_temp: f64,
    pub max_out_of_band: bool,
    pub min_out_of_band: bool,
}

/// Mean annual maximum of the last years of the target span versus the first
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarmingDelta {
    /// Years in each window
    pub window: usize,
    pub early_mean: f64,
    pub late_mean: f64,
    pub delta: f64,
}
