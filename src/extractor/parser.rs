//! Core extraction orchestration
//!
//! Handles decoding, preamble detection and the per-line loop that feeds
//! [`parse_line`]. Line defects are recorded and skipped; a file is never
//! abandoned because of its contents.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::record_parser::{LineOutcome, SkipReason, parse_line};
use super::stats::{ExtractResult, ExtractStats, ExtractedRecord, LineDiagnostic};
use crate::constants::{HEADER_SENTINEL, UTF8_BOM};
use crate::error::{Result, SeriesError};
use crate::header::{locate_data_region, scan_year_span, station_name};

/// Extractor for historical daily temperature exports
///
/// Stateless between files, so one instance can serve any number of sources
/// concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordExtractor;

impl RecordExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Read and extract one file
    pub async fn extract_file(&self, source: &str, path: &Path) -> Result<ExtractResult> {
        info!("Extracting records from {} ({})", source, path.display());

        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SeriesError::SourceNotFound {
                path: path.to_path_buf(),
            },
            _ => SeriesError::SourceUnreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;

        Ok(self.extract_bytes(source, &bytes))
    }

    /// Decode raw bytes and extract records
    pub fn extract_bytes(&self, source: &str, bytes: &[u8]) -> ExtractResult {
        let content = decode_export(source, bytes);
        self.extract(source, &content)
    }

    /// Extract records from a file's text content
    pub fn extract(&self, source: &str, content: &str) -> ExtractResult {
        let source: Arc<str> = Arc::from(source);
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
        let lines: Vec<&str> = content.lines().collect();

        let boundaries = locate_data_region(&source, &lines);
        let station = station_name(&lines, &boundaries);

        let mut stats = ExtractStats {
            total_lines: boundaries.total_lines,
            skip_rows: boundaries.skip_rows,
            header_found: !boundaries.is_degraded(),
            year_span: scan_year_span(&lines, &boundaries),
            ..ExtractStats::new()
        };
        let mut records = Vec::new();

        for (index, line) in lines.iter().enumerate().skip(boundaries.skip_rows) {
            let line_number = index + 1;
            let width = line.trim().split(crate::constants::FIELD_DELIMITER).count();
            if !line.trim().is_empty() {
                *stats.row_widths.entry(width).or_default() += 1;
            }

            match parse_line(line) {
                LineOutcome::Record(record) => {
                    stats.records_parsed += 1;
                    records.push(ExtractedRecord {
                        record,
                        line: line_number,
                    });
                }
                LineOutcome::Skipped(reason) => match reason {
                    SkipReason::Blank => stats.blank_lines += 1,
                    SkipReason::TooFewFields(_) => stats.short_rows += 1,
                    SkipReason::EmptyDate => stats.missing_dates += 1,
                },
                LineOutcome::Defect(defect) => {
                    let diagnostic = LineDiagnostic {
                        source: Arc::clone(&source),
                        line: line_number,
                        defect,
                        content: line.trim().to_string(),
                    };
                    warn!("Skipped {}", diagnostic);
                    stats.record_diagnostic(diagnostic);
                }
            }
        }

        let span = stats
            .year_span
            .map(|range| range.to_string())
            .unwrap_or_else(|| "no dates".to_string());
        info!(
            "{}: {} records from {} data lines covering {} ({} skipped, {} diagnostics)",
            source,
            stats.records_parsed,
            stats.data_lines(),
            span,
            stats.lines_skipped(),
            stats.diagnostics.len()
        );
        if stats.row_widths.len() > 1 {
            debug!("{}: mixed row widths {:?}", source, stats.row_widths);
        }

        ExtractResult {
            source,
            station,
            records,
            stats,
        }
    }
}

/// Decode an export as UTF-8, then Shift_JIS, then lossy UTF-8
///
/// Older exports were saved in Shift_JIS. That reading is accepted only when
/// it is clean and contains the header sentinel, since UTF-8 text with a
/// stray bad byte can also decode as Shift_JIS. Lossy decoding replaces
/// invalid bytes so one corrupt byte costs at most the line it sits on.
fn decode_export<'a>(source: &str, bytes: &'a [u8]) -> Cow<'a, str> {
    let utf8_error = match std::str::from_utf8(bytes) {
        Ok(text) => return Cow::Borrowed(text),
        Err(e) => e,
    };

    let (text, had_errors) = encoding_rs::SHIFT_JIS.decode_without_bom_handling(bytes);
    if !had_errors && text.contains(HEADER_SENTINEL) {
        info!("{} decoded as Shift_JIS", source);
        return text;
    }

    warn!(
        "{} is neither UTF-8 nor Shift_JIS (first bad UTF-8 byte at {}); decoding lossily",
        source,
        utf8_error.valid_up_to()
    );
    String::from_utf8_lossy(bytes)
}
