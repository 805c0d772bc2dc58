//! Record extraction for historical daily temperature exports
//!
//! Each era of the station archive was exported with a slightly different
//! layout: a variable-length preamble, a header row whose position moves, and
//! an optional homogeneity column that shifts the minimum temperature. This
//! module turns any of those files into plain [`DailyRecord`]s.
//!
//! ## Architecture
//!
//! - [`parser`] - File decoding and the per-line extraction loop
//! - [`column_layout`] - Row-width to field-position table
//! - [`record_parser`] - Single-line parsing and defect classification
//! - [`stats`] - Extraction statistics, diagnostics and results
//!
//! ## Usage
//!
//! ```rust
//! use climate_series::extractor::RecordExtractor;
//!
//! let content = "年月日,最高気温(℃),,最低気温(℃)\n,,,\n,,,\n2020/1/1,10.5,8,5.2\n";
//! let result = RecordExtractor::new().extract("data-utf8.csv", content);
//!
//! assert_eq!(result.stats.records_parsed, 1);
//! ```
//!
//! [`DailyRecord`]: crate::models::DailyRecord

pub mod column_layout;
pub mod parser;
pub mod record_parser;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use column_layout::{ColumnLayout, Field, LAYOUTS, column_index_for_field};
pub use parser::RecordExtractor;
pub use stats::{ExtractResult, ExtractStats, ExtractedRecord, LineDefect, LineDiagnostic};
