//! Core data structures and types for series reconciliation.
//!
//! Defines the daily record value type, source descriptors, the canonical
//! series newtype and the provenance carried through merging.

use crate::constants::CANONICAL_DATE_FORMAT;
use crate::error::{Result, SeriesError};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

/// One calendar day's observation
///
/// `year`, `month` and `day` are always derived from `date`. Values are
/// immutable once built; deserialization rejects inconsistent components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDailyRecord", into = "RawDailyRecord")]
pub struct DailyRecord {
    date: NaiveDate,
    year: i32,
    month: u32,
    day: u32,
    max_temp: Option<f64>,
    min_temp: Option<f64>,
}

impl DailyRecord {
    /// Create a record with both readings present
    pub fn new(date: NaiveDate, max_temp: f64, min_temp: f64) -> Self {
        Self::with_readings(date, Some(max_temp), Some(min_temp))
    }

    /// Create a record whose readings may be absent
    pub fn with_readings(date: NaiveDate, max_temp: Option<f64>, min_temp: Option<f64>) -> Self {
        Self {
            date,
            year: date.year(),
            month: date.month(),
            day: date.day(),
            max_temp,
            min_temp,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn max_temp(&self) -> Option<f64> {
        self.max_temp
    }

    pub fn min_temp(&self) -> Option<f64> {
        self.min_temp
    }

    /// Both readings, when present
    pub fn temperatures(&self) -> Option<(f64, f64)> {
        match (self.max_temp, self.min_temp) {
            (Some(max), Some(min)) => Some((max, min)),
            _ => None,
        }
    }

    /// A record is physically impossible when its maximum is below its minimum
    ///
    /// Records missing either reading cannot be judged and count as plausible.
    pub fn is_plausible(&self) -> bool {
        self.temperatures().is_none_or(|(max, min)| max >= min)
    }

    /// Date rendered in the canonical `YYYY/MM/DD` form
    pub fn date_label(&self) -> String {
        self.date.format(CANONICAL_DATE_FORMAT).to_string()
    }
}

/// Wire form of [`DailyRecord`] in the canonical interchange file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawDailyRecord {
    #[serde(with = "canonical_date")]
    date: NaiveDate,
    year: i32,
    month: u32,
    day: u32,
    max_temp: Option<f64>,
    min_temp: Option<f64>,
}

impl TryFrom<RawDailyRecord> for DailyRecord {
    type Error = SeriesError;

    fn try_from(raw: RawDailyRecord) -> Result<Self> {
        let record = DailyRecord::with_readings(raw.date, raw.max_temp, raw.min_temp);
        if (record.year, record.month, record.day) != (raw.year, raw.month, raw.day) {
            return Err(SeriesError::InvalidRecord {
                date: record.date_label(),
                reason: format!(
                    "year/month/day {}/{}/{} disagree with date",
                    raw.year, raw.month, raw.day
                ),
            });
        }
        Ok(record)
    }
}

impl From<DailyRecord> for RawDailyRecord {
    fn from(record: DailyRecord) -> Self {
        Self {
            date: record.date,
            year: record.year,
            month: record.month,
            day: record.day,
            max_temp: record.max_temp,
            min_temp: record.min_temp,
        }
    }
}

/// Serde adapter for `YYYY/MM/DD` dates
pub mod canonical_date {
    use crate::constants::CANONICAL_DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(CANONICAL_DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&text, CANONICAL_DATE_FORMAT).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::CANONICAL_DATE_FORMAT;
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => serializer.serialize_some(&date.format(CANONICAL_DATE_FORMAT).to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|text| NaiveDate::parse_from_str(&text, CANONICAL_DATE_FORMAT))
                .transpose()
                .map_err(serde::de::Error::custom)
        }
    }
}

/// Inclusive range of calendar years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min_year: i32,
    pub max_year: i32,
}

impl YearRange {
    pub fn new(min_year: i32, max_year: i32) -> Self {
        Self { min_year, max_year }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min_year <= year && year <= self.max_year
    }

    /// An inverted range admits no year
    pub fn is_empty(&self) -> bool {
        self.min_year > self.max_year
    }

    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.min_year..=self.max_year
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.max_year - self.min_year + 1) as usize
        }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min_year, self.max_year)
    }
}

static PERIOD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{4})(?:/(\d{1,2}))?\s*-\s*(\d{4})(?:/(\d{1,2}))?\s*$")
        .expect("period pattern is valid")
});

/// Historical period a source export is expected to cover
///
/// Parsed from labels such as `1950-1965`, `1920-1935/06` or `1935/10-1950`.
/// Used only for documentation and for flagging authority inversions during
/// deduplication; records are never rejected for falling outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SourcePeriod {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl FromStr for SourcePeriod {
    type Err = SeriesError;

    fn from_str(label: &str) -> Result<Self> {
        let captures = PERIOD_PATTERN
            .captures(label)
            .ok_or_else(|| SeriesError::invalid_period(label, "expected YYYY[/MM]-YYYY[/MM]"))?;

        let number = |index: usize| -> Option<u32> {
            captures.get(index).and_then(|m| m.as_str().parse().ok())
        };

        let start_year = number(1).unwrap_or_default() as i32;
        let end_year = number(3).unwrap_or_default() as i32;
        let start_month = number(2).unwrap_or(1);
        let end_month = number(4).unwrap_or(12);

        let start = NaiveDate::from_ymd_opt(start_year, start_month, 1)
            .ok_or_else(|| SeriesError::invalid_period(label, "invalid start month"))?;
        let end = last_day_of_month(end_year, end_month)
            .ok_or_else(|| SeriesError::invalid_period(label, "invalid end month"))?;

        if end < start {
            return Err(SeriesError::invalid_period(label, "period ends before it starts"));
        }

        Ok(Self { start, end })
    }
}

impl fmt::Display for SourcePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{:02}-{}/{:02}",
            self.start.year(),
            self.start.month(),
            self.end.year(),
            self.end.month()
        )
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// An ordered, named origin of records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,

    /// Display name used in diagnostics; defaults to the file name
    #[serde(default)]
    pub label: Option<String>,

    /// Period the export is expected to cover, e.g. `1935/10-1950`
    #[serde(default)]
    pub period: Option<String>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            label: None,
            period: None,
        }
    }

    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Name shown in diagnostics
    pub fn display_name(&self) -> String {
        self.label.clone().unwrap_or_else(|| {
            self.path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.path.display().to_string())
        })
    }

    /// Parsed period, if one is declared
    pub fn parsed_period(&self) -> Result<Option<SourcePeriod>> {
        self.period.as_deref().map(str::parse).transpose()
    }

    /// Resolve a relative path against a base directory
    pub fn resolved_against(&self, base: &Path) -> Self {
        let path = if self.path.is_absolute() {
            self.path.clone()
        } else {
            base.join(&self.path)
        };
        Self {
            path,
            ..self.clone()
        }
    }
}

/// Where a merged record came from
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOrigin {
    /// Position of the source in the configured list
    pub source_index: usize,

    /// Source display name
    pub source: Arc<str>,

    /// 1-based line number within the source
    pub line: usize,

    /// Declared period of the source
    pub period: Option<SourcePeriod>,
}

impl fmt::Display for RecordOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.line)
    }
}

/// A record together with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedRecord {
    pub record: DailyRecord,
    pub origin: RecordOrigin,
}

impl AsRef<DailyRecord> for DailyRecord {
    fn as_ref(&self) -> &DailyRecord {
        self
    }
}

impl AsRef<DailyRecord> for SourcedRecord {
    fn as_ref(&self) -> &DailyRecord {
        &self.record
    }
}

/// Date-ordered, de-duplicated record set
///
/// Construction fails if any adjacent pair is not strictly increasing by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CanonicalSeries {
    records: Vec<DailyRecord>,
}

impl CanonicalSeries {
    /// Wrap records after checking strict chronological order
    pub fn try_new(records: Vec<DailyRecord>) -> Result<Self> {
        if let Some(index) = records.windows(2).position(|pair| pair[0].date >= pair[1].date) {
            return Err(SeriesError::StructuralInconsistency {
                index: index + 1,
                previous: records[index].date,
                next: records[index + 1].date,
            });
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DailyRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&DailyRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&DailyRecord> {
        self.records.last()
    }

    pub fn into_records(self) -> Vec<DailyRecord> {
        self.records
    }
}

impl<'de> Deserialize<'de> for CanonicalSeries {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let records = Vec::<DailyRecord>::deserialize(deserializer)?;
        CanonicalSeries::try_new(records).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a CanonicalSeries {
    type Item = &'a DailyRecord;
    type IntoIter = std::slice::Iter<'a, DailyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Whole-run statistics
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub sources_configured: usize,
    pub sources_loaded: usize,
    pub sources_missing: usize,
    pub lines_skipped: usize,
    pub records_extracted: usize,
    pub duplicates_resolved: usize,
    pub authority_inversions: usize,
    pub records_out_of_range: usize,
    pub canonical_records: usize,
    pub processing_time_ms: u128,
}
