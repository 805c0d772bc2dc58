//! Continuity and quality auditing
//!
//! Independent read-only passes over a [`CanonicalSeries`]. Findings are
//! data in a [`QualityReport`]; none of them is an error. The only failure is
//! handing the auditor records that are not strictly date-ordered, which is
//! caught when building the series.
//!
//! # Architecture
//!
//! - [`checks`] - Per-year counts, missing years, date gaps, value checks
//! - [`aggregate`] - Annual, monthly and day-of-year means, trends
//! - [`report`] - Report data model
//! - [`render`] - Colored text rendering
//!
//! # Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use climate_series::audit::Auditor;
//! use climate_series::models::{CanonicalSeries, DailyRecord};
//!
//! let day = |d| NaiveDate::from_ymd_opt(2020, 1, d).unwrap();
//! let series = CanonicalSeries::try_new(vec![
//!     DailyRecord::new(day(1), 10.0, 2.0),
//!     DailyRecord::new(day(2), 11.0, 3.0),
//!     DailyRecord::new(day(5), 9.0, 1.0),
//! ])
//! .unwrap();
//!
//! let report = Auditor::default().audit(&series);
//! assert_eq!(report.gaps.len(), 1);
//! assert_eq!(report.gaps[0].days, 2);
//! ```

pub mod aggregate;
pub mod checks;
pub mod render;
pub mod report;

#[cfg(test)]
mod tests;

pub use aggregate::{
    AnnualAggregate, DailyClimatology, MonthlyAggregate, MonthlyYearlyAggregate, TrendLine,
    annual_aggregates, daily_climatology, fill_missing_years, monthly_aggregates,
    monthly_yearly_aggregates, round1, trend_line, warming_delta,
};
pub use checks::{expected_days_in_year, find_date_gaps, is_leap_year};
pub use render::{RenderOptions, render_report};
pub use report::{
    DateGap, ExtremeAverage, ImplausibleRecord, MissingYears, NullCounts, QualityReport,
    TemperatureExtremes, WarmingDelta, YearCount,
};

use tracing::{info, warn};

use crate::constants::{
    ANNUAL_AVG_MAX_BAND, ANNUAL_AVG_MIN_BAND, DEFAULT_INCOMPLETE_YEAR_THRESHOLD,
    DEFAULT_TARGET_END_YEAR, DEFAULT_TARGET_START_YEAR, WARMING_WINDOW_YEARS,
};
use crate::error::Result;
use crate::models::{CanonicalSeries, DailyRecord, YearRange};

/// Thresholds used by the auditor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuditConfig {
    /// Span the series is expected to cover completely
    pub target_span: Option<YearRange>,
    pub incomplete_year_threshold: usize,
    /// Plausible (low, high) annual mean maximum
    pub annual_max_band: (f64, f64),
    /// Plausible (low, high) annual mean minimum
    pub annual_min_band: (f64, f64),
    /// Years per window in the warming comparison
    pub warming_window: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            target_span: Some(YearRange::new(DEFAULT_TARGET_START_YEAR, DEFAULT_TARGET_END_YEAR)),
            incomplete_year_threshold: DEFAULT_INCOMPLETE_YEAR_THRESHOLD,
            annual_max_band: ANNUAL_AVG_MAX_BAND,
            annual_min_band: ANNUAL_AVG_MIN_BAND,
            warming_window: WARMING_WINDOW_YEARS,
        }
    }
}

impl AuditConfig {
    pub fn with_target_span(mut self, target_span: Option<YearRange>) -> Self {
        self.target_span = target_span;
        self
    }

    pub fn with_incomplete_year_threshold(mut self, threshold: usize) -> Self {
        self.incomplete_year_threshold = threshold;
        self
    }
}

/// Runs every check over a canonical series
#[derive(Debug, Clone, Default)]
pub struct Auditor {
    config: AuditConfig,
}

impl Auditor {
    pub fn new(config: AuditConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Validate ordering, then audit
    pub fn audit_records(&self, records: Vec<DailyRecord>) -> Result<QualityReport> {
        let series = CanonicalSeries::try_new(records)?;
        Ok(self.audit(&series))
    }

    pub fn audit(&self, series: &CanonicalSeries) -> QualityReport {
        let records = series.records();

        let year_counts = checks::year_counts(records);
        let incomplete_years =
            checks::incomplete_years(&year_counts, self.config.incomplete_year_threshold);
        let missing_years = checks::missing_years(&year_counts, self.config.target_span);
        let gaps = checks::find_date_gaps(records);
        let null_counts = checks::null_counts(records);
        let implausible = checks::implausible_records(records);

        let annual = annual_aggregates(records);
        let extreme_averages = checks::extreme_averages(
            &annual,
            self.config.annual_max_band,
            self.config.annual_min_band,
        );
        let warming = self
            .config
            .target_span
            .and_then(|target| warming_delta(&annual, target, self.config.warming_window));

        let report = QualityReport {
            total_records: series.len(),
            first_date: series.first().map(DailyRecord::date),
            last_date: series.last().map(DailyRecord::date),
            incomplete_years,
            incomplete_year_threshold: self.config.incomplete_year_threshold,
            missing_years,
            gaps,
            null_counts,
            implausible,
            extremes: checks::temperature_extremes(records),
            month_distribution: checks::month_distribution(records),
            extreme_averages,
            trend: trend_line(&annual),
            warming,
            annual,
            year_counts,
        };

        self.log_findings(&report);
        report
    }

    fn log_findings(&self, report: &QualityReport) {
        info!(
            "Audited {} records: {} gaps ({} days), {} short years, {} implausible",
            report.total_records,
            report.gaps.len(),
            report.total_gap_days(),
            report.short_years().count(),
            report.implausible.len()
        );
        if !report.null_counts.is_clean() {
            warn!(
                "Canonical series has missing readings (max {}, min {})",
                report.null_counts.max_temp, report.null_counts.min_temp
            );
        }
        if !report.missing_years.missing_in_span.is_empty() {
            warn!("Missing years: {:?}", report.missing_years.missing_in_span);
        }
    }
}
