//! Date deduplication for merged records
//!
//! Overlapping eras produce several records for the same calendar day. The
//! rule is last-write-wins keyed by date: walking the merged sequence, a later
//! record replaces an earlier one outright. There is no content arbitration
//! (no averaging, no preferring non-missing readings).
//!
//! Authority therefore follows position in the merged sequence, which in turn
//! follows the configured source order. If an older era is listed after a
//! newer one, its values silently override the newer file's for overlapping
//! dates. That behaviour is kept; such collisions are flagged as authority
//! inversions so they can be seen.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::models::{DailyRecord, RecordOrigin, SourcedRecord};

/// One replacement made by the deduplicator
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateCollision {
    pub date: NaiveDate,

    /// Origin of the record that won
    pub kept: RecordOrigin,

    /// Origin of the record that was discarded
    pub replaced: RecordOrigin,

    /// The winner's source declares an older period than the loser's
    pub authority_inversion: bool,
}

/// Deduplicated records and every collision resolved on the way
#[derive(Debug, Clone, Default)]
pub struct DedupResult {
    /// One record per date, ascending
    pub records: Vec<SourcedRecord>,
    pub collisions: Vec<DuplicateCollision>,
}

impl DedupResult {
    pub fn collision_count(&self) -> usize {
        self.collisions.len()
    }

    pub fn authority_inversions(&self) -> impl Iterator<Item = &DuplicateCollision> {
        self.collisions.iter().filter(|c| c.authority_inversion)
    }
}

/// Collapse records sharing a date, keeping the last one encountered
pub fn deduplicate_last_write_wins(records: Vec<SourcedRecord>) -> DedupResult {
    let input_count = records.len();
    let mut by_date: BTreeMap<NaiveDate, SourcedRecord> = BTreeMap::new();
    let mut collisions = Vec::new();

    for sourced in records {
        let date = sourced.record.date();
        let kept = sourced.origin.clone();

        if let Some(replaced) = by_date.insert(date, sourced) {
            let authority_inversion = is_authority_inversion(&kept, &replaced.origin);
            if authority_inversion {
                warn!(
                    "{}: {} replaced {} although its source period is older",
                    date, kept, replaced.origin
                );
            } else {
                debug!("{}: {} replaced {}", date, kept, replaced.origin);
            }
            collisions.push(DuplicateCollision {
                date,
                kept,
                replaced: replaced.origin,
                authority_inversion,
            });
        }
    }

    let records: Vec<SourcedRecord> = by_date.into_values().collect();

    info!(
        "Deduplication complete: {} -> {} records ({} collisions)",
        input_count,
        records.len(),
        collisions.len()
    );

    DedupResult {
        records,
        collisions,
    }
}

/// Whether the winning origin's period starts before the replaced one's
///
/// Sources without a declared period never count as inversions.
pub fn is_authority_inversion(kept: &RecordOrigin, replaced: &RecordOrigin) -> bool {
    match (kept.period, replaced.period) {
        (Some(kept_period), Some(replaced_period)) => kept_period.start < replaced_period.start,
        _ => false,
    }
}

/// Count dates and duplicates without deduplicating
///
/// Returns (distinct dates, dates with duplicates, surplus records)
pub fn analyze_duplicate_patterns<T: AsRef<DailyRecord>>(records: &[T]) -> (usize, usize, usize) {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.as_ref().date()).or_insert(0) += 1;
    }

    let distinct = counts.len();
    let duplicated = counts.values().filter(|&&count| count > 1).count();
    let surplus = counts.values().map(|&count| count.saturating_sub(1)).sum();

    (distinct, duplicated, surplus)
}

/// Returns (reduction percentage, records removed)
pub fn get_deduplication_metrics(input_count: usize, output_count: usize) -> (f64, usize) {
    let removed = input_count.saturating_sub(output_count);
    let reduction = if input_count > 0 {
        (removed as f64 / input_count as f64) * 100.0
    } else {
        0.0
    };
    (reduction, removed)
}
