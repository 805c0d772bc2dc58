//! Extraction statistics, line diagnostics and result structures
//!
//! Every skipped line is counted; lines that looked like observations but
//! could not be used also produce a [`LineDiagnostic`] naming the source and
//! line number.

use super::column_layout::Field;
use crate::models::{DailyRecord, YearRange};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Why a data line could not become a record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineDefect {
    /// A selected temperature field was empty
    MissingValue { field: &'static str, date: String },

    /// Date field did not match `YYYY/MM/DD`
    MalformedDate { value: String },

    /// Temperature field was not a finite number
    MalformedTemperature { field: &'static str, value: String },
}

impl LineDefect {
    pub fn missing(field: Field, date: &str) -> Self {
        Self::MissingValue {
            field: field.name(),
            date: date.to_string(),
        }
    }

    pub fn is_missing_value(&self) -> bool {
        matches!(self, Self::MissingValue { .. })
    }
}

impl fmt::Display for LineDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingValue { field, date } => write!(f, "missing {} on {}", field, date),
            Self::MalformedDate { value } => write!(f, "malformed date '{}'", value),
            Self::MalformedTemperature { field, value } => {
                write!(f, "non-numeric {} '{}'", field, value)
            }
        }
    }
}

/// A skipped line with enough context to find it again
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineDiagnostic {
    pub source: Arc<str>,
    pub line: usize,
    pub defect: LineDefect,
    pub content: String,
}

impl fmt::Display for LineDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} ({})",
            self.source, self.line, self.defect, self.content
        )
    }
}

/// Per-file extraction statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractStats {
    /// Lines in the file, preamble included
    pub total_lines: usize,

    /// Leading lines skipped as preamble
    pub skip_rows: usize,

    /// Whether the sentinel header row was found
    pub header_found: bool,

    /// Records emitted
    pub records_parsed: usize,

    pub blank_lines: usize,

    /// Rows with fewer than four fields
    pub short_rows: usize,

    /// Rows with an empty date field
    pub missing_dates: usize,

    /// Rows with an empty temperature field
    pub missing_values: usize,

    /// Rows with an unparseable date or temperature
    pub malformed_rows: usize,

    /// Years named by the data region's date fields
    pub year_span: Option<YearRange>,

    /// Width → number of rows seen, for layout drift reporting
    pub row_widths: std::collections::BTreeMap<usize, usize>,

    pub diagnostics: Vec<LineDiagnostic>,
}

impl ExtractStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Data-region lines examined (everything after the preamble)
    pub fn data_lines(&self) -> usize {
        self.total_lines.saturating_sub(self.skip_rows)
    }

    /// Lines in the data region that produced no record
    pub fn lines_skipped(&self) -> usize {
        self.blank_lines
            + self.short_rows
            + self.missing_dates
            + self.missing_values
            + self.malformed_rows
    }

    /// Share of non-blank data lines that produced a record
    pub fn success_rate(&self) -> f64 {
        let candidates = self.data_lines().saturating_sub(self.blank_lines);
        if candidates == 0 {
            0.0
        } else {
            (self.records_parsed as f64 / candidates as f64) * 100.0
        }
    }

    pub fn record_diagnostic(&mut self, diagnostic: LineDiagnostic) {
        if diagnostic.defect.is_missing_value() {
            self.missing_values += 1;
        } else {
            self.malformed_rows += 1;
        }
        self.diagnostics.push(diagnostic);
    }
}

/// A record and the line it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRecord {
    pub record: DailyRecord,
    pub line: usize,
}

/// Records extracted from one source, in file order
#[derive(Debug, Clone)]
pub struct ExtractResult {
    pub source: Arc<str>,

    /// Station named in the preamble, if any
    pub station: Option<String>,

    pub records: Vec<ExtractedRecord>,

    pub stats: ExtractStats,
}

impl ExtractResult {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Records without their line numbers
    pub fn daily_records(&self) -> impl Iterator<Item = &DailyRecord> {
        self.records.iter().map(|extracted| &extracted.record)
    }
}
