//! Record reconciliation pipeline
//!
//! Takes extractor output from an ordered list of sources and reduces it to
//! one canonical, date-ordered series.
//!
//! # Architecture
//!
//! - [`merger`] - Concurrent source loading, ordered concatenation, stable sort
//! - [`deduplication`] - Last-write-wins collapse of records sharing a date
//! - [`range_filter`] - Inclusive year-range restriction
//! - [`processor`] - `SeriesReconciler` running the synchronous stages
//! - [`stats`] - Stage statistics and the reconcile result
//!
//! # Processing Pipeline
//!
//! 1. **Merge**: concatenate sources oldest-era first, then stable-sort by date
//! 2. **Deduplicate**: the record met last for a date wins
//! 3. **Filter**: keep the configured year range
//!
//! Every stage takes its input by value and returns a new sequence; nothing is
//! accumulated in shared state.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use climate_series::extractor::RecordExtractor;
//! use climate_series::models::{SourceFile, YearRange};
//! use climate_series::pipeline::{SeriesReconciler, SourceMerger};
//!
//! # async fn example() -> climate_series::Result<()> {
//! let sources = vec![
//!     SourceFile::new("data-3.csv").with_period("1980-1995"),
//!     SourceFile::new("data-2.csv").with_period("1995-2010"),
//! ];
//!
//! let merger = SourceMerger::new(RecordExtractor::new(), 4);
//! let merged = merger.load_and_merge(&sources, None).await?;
//!
//! let result = SeriesReconciler::new(YearRange::new(1980, 2009)).reconcile(merged)?;
//! println!("{}", result.summary());
//! # Ok(())
//! # }
//! ```

pub mod deduplication;
pub mod merger;
pub mod processor;
pub mod range_filter;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use deduplication::{DedupResult, DuplicateCollision, deduplicate_last_write_wins};
pub use merger::{LoadedSource, MergeResult, SourceFailure, SourceMerger, SourceSummary, merge_sources};
pub use processor::SeriesReconciler;
pub use range_filter::filter_year_range;
pub use stats::{ReconcileResult, ReconcileStats};

// Duplicate counting used by the reconciler
pub use deduplication::{analyze_duplicate_patterns, get_deduplication_metrics};
