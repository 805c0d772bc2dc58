//! Header preamble detection for historical station exports.
//!
//! Each export carries a variable-length preamble (download timestamp, station
//! name, column captions) before its observations. The column-header row is
//! recognised by its leading date-column label; observations start a fixed
//! number of lines below it.

use crate::constants::{DATA_OFFSET_FROM_SENTINEL, HEADER_SENTINEL};
use crate::models::YearRange;
use tracing::{debug, warn};

/// Where the data region of a source file begins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBoundaries {
    /// Number of leading lines that are not observations
    pub skip_rows: usize,

    /// Zero-based index of the sentinel row, if one was found
    pub sentinel_line: Option<usize>,

    /// Total number of lines in the file
    pub total_lines: usize,
}

impl DataBoundaries {
    /// Whether the file fell back to treating every line as data
    pub fn is_degraded(&self) -> bool {
        self.sentinel_line.is_none()
    }
}

/// Locate the data region in a file's lines
///
/// Without a sentinel row the whole file is treated as data. That fallback is
/// lossy but never fatal: preamble lines then fail per-line parsing instead.
pub fn locate_data_region<S: AsRef<str>>(source: &str, lines: &[S]) -> DataBoundaries {
    let sentinel_line = lines
        .iter()
        .position(|line| line.as_ref().trim().starts_with(HEADER_SENTINEL));

    let skip_rows = match sentinel_line {
        Some(index) => (index + DATA_OFFSET_FROM_SENTINEL).min(lines.len()),
        None => {
            warn!(
                "No '{}' header row in {}; treating the whole file as data",
                HEADER_SENTINEL, source
            );
            0
        }
    };

    debug!(
        "Header for {}: sentinel={:?}, skip_rows={}, total_lines={}",
        source,
        sentinel_line,
        skip_rows,
        lines.len()
    );

    DataBoundaries {
        skip_rows,
        sentinel_line,
        total_lines: lines.len(),
    }
}

/// Station name from the preamble, when the export names one
///
/// The agency writes the station on the line directly above the sentinel row,
/// once per selected element (e.g. `,東京,東京,東京`). The first non-empty
/// field is returned.
pub fn station_name<S: AsRef<str>>(lines: &[S], boundaries: &DataBoundaries) -> Option<String> {
    let sentinel = boundaries.sentinel_line?;
    let above = lines.get(sentinel.checked_sub(1)?)?.as_ref();
    above
        .split(crate::constants::FIELD_DELIMITER)
        .map(str::trim)
        .find(|field| !field.is_empty())
        .map(str::to_string)
}

/// Years referenced by the data region's leading date fields
///
/// Cheap scan used for logging coverage before full extraction.
pub fn scan_year_span<S: AsRef<str>>(lines: &[S], boundaries: &DataBoundaries) -> Option<YearRange> {
    let years = lines[boundaries.skip_rows..].iter().filter_map(|line| {
        let line = line.as_ref().trim();
        let (year, rest) = line.split_once('/')?;
        if rest.is_empty() || year.len() != 4 {
            return None;
        }
        year.parse::<i32>().ok()
    });

    years.fold(None, |span: Option<YearRange>, year| match span {
        None => Some(YearRange::new(year, year)),
        Some(range) => Some(YearRange::new(range.min_year.min(year), range.max_year.max(year))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREAMBLE: &str = "ダウンロードした時刻：2025/06/01 10:00:00\n\
\n\
,東京,東京,東京\n\
年月日,最高気温(℃),最高気温(℃),最低気温(℃)\n\
,,品質情報,\n\
,,,\n\
2020/1/1,10.5,8,5.2\n\
2020/1/2,11.0,8,4.1";

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn test_sentinel_offsets_data_by_three_lines() {
        let lines = lines(PREAMBLE);
        let boundaries = locate_data_region("test.csv", &lines);

        assert_eq!(boundaries.sentinel_line, Some(3));
        assert_eq!(boundaries.skip_rows, 6);
        assert_eq!(boundaries.total_lines, 8);
        assert!(!boundaries.is_degraded());
        assert!(lines[boundaries.skip_rows].starts_with("2020/1/1"));
    }

    #[test]
    fn test_missing_sentinel_falls_back_to_offset_zero() {
        let lines = lines("2020/1/1,10.5,8,5.2\n2020/1/2,11.0,8,4.1");
        let boundaries = locate_data_region("bare.csv", &lines);

        assert_eq!(boundaries.skip_rows, 0);
        assert!(boundaries.is_degraded());
    }

    #[test]
    fn test_sentinel_near_end_of_file_is_clamped() {
        let lines = lines("preamble\n年月日,最高気温");
        let boundaries = locate_data_region("short.csv", &lines);
        assert_eq!(boundaries.skip_rows, 2);
    }

    #[test]
    fn test_station_name_from_preamble() {
        let lines = lines(PREAMBLE);
        let boundaries = locate_data_region("test.csv", &lines);
        assert_eq!(station_name(&lines, &boundaries).as_deref(), Some("東京"));
    }

    #[test]
    fn test_scan_year_span() {
        let text = format!("{PREAMBLE}\n2021/12/31,9.0,8,1.0");
        let lines = lines(&text);
        let boundaries = locate_data_region("test.csv", &lines);
        assert_eq!(
            scan_year_span(&lines, &boundaries),
            Some(YearRange::new(2020, 2021))
        );
    }
}
