//! Reconciliation statistics and result structures
//!
//! Tracks how many records each stage consumed and produced, and carries the
//! canonical series together with the diagnostics gathered on the way.

use super::deduplication::DuplicateCollision;
use super::merger::{SourceFailure, SourceSummary};
use crate::extractor::LineDiagnostic;
use crate::models::CanonicalSeries;

/// Record counts through the reconciliation stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileStats {
    /// Records entering deduplication
    pub merged: usize,
    /// Dates that appeared in more than one merged record
    pub duplicated_dates: usize,
    /// Records dated outside their source's declared period
    pub outside_period: usize,
    /// Collisions resolved by last-write-wins
    pub duplicates_resolved: usize,
    /// Collisions whose winner came from an older declared period
    pub authority_inversions: usize,
    /// Records remaining after deduplication
    pub deduplicated: usize,
    /// Percentage of merged records removed as duplicates
    pub dedup_reduction: f64,
    /// Records dropped by the year filter
    pub out_of_range: usize,
    /// Records in the canonical series
    pub final_output: usize,
}

impl ReconcileStats {
    /// Share of merged records that survived every stage
    pub fn retention_rate(&self) -> f64 {
        if self.merged == 0 {
            0.0
        } else {
            (self.final_output as f64 / self.merged as f64) * 100.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Reconcile Summary: {} -> {} records ({:.1}% retained) | \
             Duplicates resolved: {} over {} dates, {:.1}% reduction ({} inversions) | \
             Out of range: {}",
            self.merged,
            self.final_output,
            self.retention_rate(),
            self.duplicates_resolved,
            self.duplicated_dates,
            self.dedup_reduction,
            self.authority_inversions,
            self.out_of_range
        )
    }
}

/// Canonical series plus everything learned while building it
#[derive(Debug, Clone, Default)]
pub struct ReconcileResult {
    pub series: CanonicalSeries,
    pub stats: ReconcileStats,
    pub collisions: Vec<DuplicateCollision>,
    pub sources: Vec<SourceSummary>,
    pub failures: Vec<SourceFailure>,
    pub diagnostics: Vec<LineDiagnostic>,
}

impl ReconcileResult {
    pub fn record_count(&self) -> usize {
        self.series.len()
    }

    pub fn summary(&self) -> String {
        self.stats.summary()
    }
}
