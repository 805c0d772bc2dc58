//! Application constants for the climate series pipeline
//!
//! This module contains the source-format markers, default year windows,
//! report limits and column names used throughout the pipeline.

// =============================================================================
// Source File Format
// =============================================================================

/// Leading label of the column-header row (the date column heading)
pub const HEADER_SENTINEL: &str = "年月日";

/// Lines between the sentinel row and the first data row
///
/// The sentinel row is followed by a units row and a quality-column caption
/// row before observations start.
pub const DATA_OFFSET_FROM_SENTINEL: usize = 3;

/// Field delimiter in every historical export
pub const FIELD_DELIMITER: char = ',';

/// Rows with fewer fields than this carry no usable observation
pub const MIN_FIELDS_PER_ROW: usize = 4;

/// Date format of the first field of a data row
pub const SOURCE_DATE_FORMAT: &str = "%Y/%m/%d";

/// UTF-8 byte order mark written by some spreadsheet exports
pub const UTF8_BOM: char = '\u{feff}';

// =============================================================================
// Canonical Output
// =============================================================================

/// Date format used in the canonical interchange file
pub const CANONICAL_DATE_FORMAT: &str = "%Y/%m/%d";

/// Default canonical output filename
pub const CANONICAL_OUTPUT_FILENAME: &str = "temperature_data.json";

/// Default annual aggregate output filename
pub const ANNUAL_OUTPUT_FILENAME: &str = "annual_temperature.json";

/// Column names in the canonical record set
pub mod columns {
    pub const DATE: &str = "date";
    pub const YEAR: &str = "year";
    pub const MONTH: &str = "month";
    pub const DAY: &str = "day";
    pub const MAX_TEMP: &str = "max_temp";
    pub const MIN_TEMP: &str = "min_temp";
}

// =============================================================================
// Pipeline Defaults
// =============================================================================

/// First year kept by the default range filter
pub const DEFAULT_MIN_YEAR: i32 = 1890;

/// Last year kept by the default range filter
pub const DEFAULT_MAX_YEAR: i32 = 2024;

/// Default analysis window checked for missing years
pub const DEFAULT_TARGET_START_YEAR: i32 = 1936;
pub const DEFAULT_TARGET_END_YEAR: i32 = 2024;

/// Number of date gaps printed before the truncation note
pub const DEFAULT_GAP_DISPLAY_LIMIT: usize = 10;

/// Number of skipped-line diagnostics printed in the run summary
pub const DIAGNOSTIC_DISPLAY_LIMIT: usize = 20;

/// Years with fewer recorded days than this are reported as incomplete
pub const DEFAULT_INCOMPLETE_YEAR_THRESHOLD: usize = 300;

/// Number of invalid records printed as examples
pub const INVALID_RECORD_DISPLAY_LIMIT: usize = 5;

/// Number of leading/trailing years compared for the warming delta
pub const WARMING_WINDOW_YEARS: usize = 10;

/// Plausible band for an annual average of daily maxima (°C)
pub const ANNUAL_AVG_MAX_BAND: (f64, f64) = (15.0, 35.0);

/// Plausible band for an annual average of daily minima (°C)
pub const ANNUAL_AVG_MIN_BAND: (f64, f64) = (0.0, 25.0);

/// Default upper bound on concurrently read source files
pub const DEFAULT_MAX_CONCURRENT_FILES: usize = 4;

// =============================================================================
// Configuration
// =============================================================================

/// Application directory under the platform config dir
pub const CONFIG_DIR_NAME: &str = "climate-series";

/// Configuration filename
pub const CONFIG_FILENAME: &str = "config.toml";

/// Default historical source list, oldest era first: (path, period label)
pub const DEFAULT_SOURCES: &[(&str, &str)] = &[
    ("data-9-utf8.csv", "1890-1905"),
    ("data-7-utf8.csv", "1920-1935/06"),
    ("data-6-utf8.csv", "1935/10-1950"),
    ("data-5-utf8.csv", "1950-1965"),
    ("data-4.csv", "1965-1980"),
    ("data-3.csv", "1980-1995"),
    ("data-2.csv", "1995-2010"),
    ("data-utf8.csv", "2010-2025"),
];

/// Month labels used in aggregate output
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Days per month in a non-leap year, used for day-of-year climatology
pub const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
