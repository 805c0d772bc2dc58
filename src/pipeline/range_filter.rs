//! Inclusive year-range filtering

use tracing::debug;

use crate::models::{DailyRecord, YearRange};

/// Keep records whose year lies within `range`, preserving order
///
/// An inverted range keeps nothing. Applying the same range twice is a no-op.
pub fn filter_year_range<T: AsRef<DailyRecord>>(records: Vec<T>, range: YearRange) -> Vec<T> {
    let input_count = records.len();
    let kept: Vec<T> = records
        .into_iter()
        .filter(|record| range.contains(record.as_ref().year()))
        .collect();

    debug!(
        "Year filter {}: {} -> {} records",
        range,
        input_count,
        kept.len()
    );

    kept
}
