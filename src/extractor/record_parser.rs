//! Individual data row parsing
//!
//! Turns one line of a source export into a [`DailyRecord`] or explains why
//! it cannot become one. Field positions come from [`column_layout`].
//!
//! [`column_layout`]: super::column_layout

use chrono::NaiveDate;

use super::column_layout::{Field, layout_for_width};
use super::stats::LineDefect;
use crate::constants::{FIELD_DELIMITER, MIN_FIELDS_PER_ROW, SOURCE_DATE_FORMAT};
use crate::models::DailyRecord;

/// Lines that are dropped without a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    TooFewFields(usize),
    EmptyDate,
}

/// Result of parsing one data line
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Record(DailyRecord),
    Skipped(SkipReason),
    Defect(LineDefect),
}

/// Parse a single data line
///
/// Checks run in a fixed order: blank, width, empty date, empty temperature,
/// numeric temperatures, then the date itself.
pub fn parse_line(line: &str) -> LineOutcome {
    let line = line.trim();
    if line.is_empty() {
        return LineOutcome::Skipped(SkipReason::Blank);
    }

    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if fields.len() < MIN_FIELDS_PER_ROW {
        return LineOutcome::Skipped(SkipReason::TooFewFields(fields.len()));
    }

    let Some(layout) = layout_for_width(fields.len()) else {
        return LineOutcome::Skipped(SkipReason::TooFewFields(fields.len()));
    };

    let date_text = fields[layout.index_of(Field::Date)].trim();
    if date_text.is_empty() {
        return LineOutcome::Skipped(SkipReason::EmptyDate);
    }

    let max_text = fields[layout.index_of(Field::MaxTemp)].trim();
    let min_text = fields[layout.index_of(Field::MinTemp)].trim();

    if max_text.is_empty() {
        return LineOutcome::Defect(LineDefect::missing(Field::MaxTemp, date_text));
    }
    if min_text.is_empty() {
        return LineOutcome::Defect(LineDefect::missing(Field::MinTemp, date_text));
    }

    let max_temp = match parse_temperature(Field::MaxTemp, max_text) {
        Ok(value) => value,
        Err(defect) => return LineOutcome::Defect(defect),
    };
    let min_temp = match parse_temperature(Field::MinTemp, min_text) {
        Ok(value) => value,
        Err(defect) => return LineOutcome::Defect(defect),
    };

    match parse_source_date(date_text) {
        Some(date) => LineOutcome::Record(DailyRecord::new(date, max_temp, min_temp)),
        None => LineOutcome::Defect(LineDefect::MalformedDate {
            value: date_text.to_string(),
        }),
    }
}

/// Parse a `YYYY/MM/DD` date; unpadded months and days are accepted
pub fn parse_source_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.split('/');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || year.len() != 4 || month.len() > 2 || day.len() > 2 {
        return None;
    }
    NaiveDate::parse_from_str(text, SOURCE_DATE_FORMAT).ok()
}

fn parse_temperature(field: Field, text: &str) -> Result<f64, LineDefect> {
    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| LineDefect::MalformedTemperature {
            field: field.name(),
            value: text.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(outcome: LineOutcome) -> DailyRecord {
        match outcome {
            LineOutcome::Record(record) => record,
            other => panic!("expected a record, got {other:?}"),
        }
    }

    #[test]
    fn test_four_field_row() {
        let parsed = record(parse_line("2020/01/01,10.5,,5.2"));
        assert_eq!(parsed.max_temp(), Some(10.5));
        assert_eq!(parsed.min_temp(), Some(5.2));
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }

    #[test]
    fn test_six_field_row_shifts_minimum() {
        let parsed = record(parse_line("2020/01/01,10.5,1,5.2,4.9,0"));
        assert_eq!(parsed.max_temp(), Some(10.5));
        assert_eq!(parsed.min_temp(), Some(4.9));
    }

    #[test]
    fn test_unpadded_dates_are_accepted() {
        let parsed = record(parse_line("1935/10/1,21.3,8,14.0,8"));
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(1935, 10, 1).unwrap());
    }

    #[test]
    fn test_empty_maximum_is_a_missing_value_defect() {
        assert_eq!(
            parse_line("2020/01/01,,,"),
            LineOutcome::Defect(LineDefect::MissingValue {
                field: "max_temp",
                date: "2020/01/01".to_string()
            })
        );
    }

    #[test]
    fn test_empty_minimum_is_a_missing_value_defect() {
        assert!(matches!(
            parse_line("2020/01/01,10.0,8,,8"),
            LineOutcome::Defect(LineDefect::MissingValue { field: "min_temp", .. })
        ));
    }

    #[test]
    fn test_blank_and_short_rows_are_skipped_silently() {
        assert_eq!(parse_line("   "), LineOutcome::Skipped(SkipReason::Blank));
        assert_eq!(
            parse_line("2020/01/01,10.5,8"),
            LineOutcome::Skipped(SkipReason::TooFewFields(3))
        );
        assert_eq!(
            parse_line(",10.5,8,3.0"),
            LineOutcome::Skipped(SkipReason::EmptyDate)
        );
    }

    #[test]
    fn test_malformed_values() {
        assert!(matches!(
            parse_line("2020-01-01,10.5,8,3.0"),
            LineOutcome::Defect(LineDefect::MalformedDate { .. })
        ));
        assert!(matches!(
            parse_line("2020/02/30,10.5,8,3.0"),
            LineOutcome::Defect(LineDefect::MalformedDate { .. })
        ));
        assert!(matches!(
            parse_line("2020/01/01,10.5],8,3.0"),
            LineOutcome::Defect(LineDefect::MalformedTemperature { field: "max_temp", .. })
        ));
        assert!(matches!(
            parse_line("2020/01/01,NaN,8,3.0"),
            LineOutcome::Defect(LineDefect::MalformedTemperature { .. })
        ));
    }

    #[test]
    fn test_surrounding_whitespace_is_tolerated() {
        let parsed = record(parse_line("  2020/01/01, 10.5 ,8, -2.5 \r"));
        assert_eq!(parsed.max_temp(), Some(10.5));
        assert_eq!(parsed.min_temp(), Some(-2.5));
    }

    #[test]
    fn test_parse_source_date_shape() {
        assert!(parse_source_date("2020/1/1").is_some());
        assert!(parse_source_date("20/01/01").is_none());
        assert!(parse_source_date("2020/01/01/01").is_none());
        assert!(parse_source_date("2020/001/01").is_none());
    }
}
