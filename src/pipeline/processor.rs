//! Reconciliation pipeline orchestration
//!
//! Runs the synchronous stages over a merged record set: deduplication, year
//! filtering and the final chronological check that produces the
//! [`CanonicalSeries`].

use tracing::{debug, info, warn};

use super::deduplication::{
    analyze_duplicate_patterns, deduplicate_last_write_wins, get_deduplication_metrics,
};
use super::merger::MergeResult;
use super::range_filter::filter_year_range;
use super::stats::{ReconcileResult, ReconcileStats};
use crate::error::Result;
use crate::models::{CanonicalSeries, DailyRecord, YearRange};

/// Turns merged records into the canonical series
#[derive(Debug, Clone)]
pub struct SeriesReconciler {
    year_range: YearRange,
}

impl SeriesReconciler {
    pub fn new(year_range: YearRange) -> Self {
        Self { year_range }
    }

    pub fn year_range(&self) -> YearRange {
        self.year_range
    }

    /// Deduplicate, filter and validate a merged record set
    ///
    /// Each stage consumes its predecessor's output and returns a new
    /// sequence. The final check cannot fail for deduplicated input; an error
    /// here means a stage broke its ordering contract.
    pub fn reconcile(&self, merged: MergeResult) -> Result<ReconcileResult> {
        let MergeResult {
            records,
            sources,
            failures,
            diagnostics,
        } = merged;

        let (distinct_dates, duplicated_dates, surplus) = analyze_duplicate_patterns(&records);
        debug!(
            "{} merged records over {} dates; {} dates carry {} surplus records",
            records.len(),
            distinct_dates,
            duplicated_dates,
            surplus
        );

        let outside_period = records
            .iter()
            .filter(|sourced| {
                sourced
                    .origin
                    .period
                    .is_some_and(|period| !period.covers(sourced.record.date()))
            })
            .count();
        if outside_period > 0 {
            warn!(
                "{} records fall outside their source's declared period",
                outside_period
            );
        }

        let mut stats = ReconcileStats {
            merged: records.len(),
            duplicated_dates,
            outside_period,
            ..Default::default()
        };

        let dedup = deduplicate_last_write_wins(records);
        stats.duplicates_resolved = dedup.collision_count();
        stats.authority_inversions = dedup.authority_inversions().count();
        stats.deduplicated = dedup.records.len();
        let (reduction, _) = get_deduplication_metrics(stats.merged, stats.deduplicated);
        stats.dedup_reduction = reduction;

        let in_range = filter_year_range(dedup.records, self.year_range);
        stats.out_of_range = stats.deduplicated - in_range.len();

        let records: Vec<DailyRecord> = in_range.into_iter().map(|sourced| sourced.record).collect();
        let series = CanonicalSeries::try_new(records)?;
        stats.final_output = series.len();

        info!("{}", stats.summary());

        Ok(ReconcileResult {
            series,
            stats,
            collisions: dedup.collisions,
            sources,
            failures,
            diagnostics,
        })
    }
}
