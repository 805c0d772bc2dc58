//! Output writing for the canonical series and its aggregates
//!
//! JSON output goes through a temporary file in the destination directory
//! and is persisted with a rename, so readers never see a partial file.
//! Parquet export uses polars with the configured compression.

use polars::prelude::{
    Column, DataFrame, IntoColumn, NamedFrom, ParquetWriter as PolarsParquetWriter, Series,
    StatisticsOptions,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::constants::columns;
use crate::error::{Result, SeriesError};
use crate::models::{CanonicalSeries, DailyRecord};

fn output_failed(path: &Path, reason: impl ToString) -> SeriesError {
    SeriesError::OutputFailed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<&Path> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| output_failed(path, e))?;
    Ok(parent)
}

/// Pretty-print `value` as JSON to `path`, atomically
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let parent = ensure_parent_dir(path)?;
    let temp = NamedTempFile::new_in(parent).map_err(|e| output_failed(path, e))?;

    {
        let mut writer = BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    temp.persist(path).map_err(|e| output_failed(path, e.error))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Write the canonical interchange file
pub fn write_canonical(path: &Path, series: &CanonicalSeries) -> Result<()> {
    write_json_atomic(path, series)?;
    info!("Wrote {} records to {}", series.len(), path.display());
    Ok(())
}

/// Read a canonical interchange file, checking chronological order
pub fn load_canonical(path: &Path) -> Result<CanonicalSeries> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SeriesError::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => SeriesError::Io(e),
    })?;
    let series: CanonicalSeries = serde_json::from_reader(BufReader::new(file))?;
    info!("Loaded {} records from {}", series.len(), path.display());
    Ok(series)
}

/// Build a polars frame with the canonical columns
///
/// Dates are stored as `YYYY/MM/DD` strings to match the JSON interchange.
pub fn series_to_dataframe(records: &[DailyRecord]) -> Result<DataFrame> {
    let dates: Vec<String> = records.iter().map(DailyRecord::date_label).collect();
    let years: Vec<i32> = records.iter().map(DailyRecord::year).collect();
    let months: Vec<u32> = records.iter().map(DailyRecord::month).collect();
    let days: Vec<u32> = records.iter().map(DailyRecord::day).collect();
    let max_temps: Vec<Option<f64>> = records.iter().map(DailyRecord::max_temp).collect();
    let min_temps: Vec<Option<f64>> = records.iter().map(DailyRecord::min_temp).collect();

    let columns: Vec<Column> = vec![
        Series::new(columns::DATE.into(), dates).into_column(),
        Series::new(columns::YEAR.into(), years).into_column(),
        Series::new(columns::MONTH.into(), months).into_column(),
        Series::new(columns::DAY.into(), days).into_column(),
        Series::new(columns::MAX_TEMP.into(), max_temps).into_column(),
        Series::new(columns::MIN_TEMP.into(), min_temps).into_column(),
    ];

    Ok(DataFrame::new(columns)?)
}

/// Export the canonical series to Parquet
pub fn write_parquet(path: &Path, series: &CanonicalSeries, output: &OutputConfig) -> Result<usize> {
    ensure_parent_dir(path)?;
    let mut df = series_to_dataframe(series.records())?;

    let file = File::create(path).map_err(|e| output_failed(path, e))?;
    PolarsParquetWriter::new(file)
        .with_compression(output.compression.to_polars_compression())
        .with_statistics(if output.enable_statistics {
            StatisticsOptions::full()
        } else {
            StatisticsOptions::empty()
        })
        .finish(&mut df)
        .map_err(|e| output_failed(path, format!("Failed to write parquet: {}", e)))?;

    info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(df.height())
}
