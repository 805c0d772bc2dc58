//! Error handling for series reconciliation.
//!
//! Line-level and file-level defects are recovered where they happen and never
//! reach these types; what remains are failures of a caller's contract
//! (structural inconsistencies), configuration problems and output failures.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Source file unreadable: {path} - {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("No usable source files among {configured} configured")]
    NoUsableSources { configured: usize },

    #[error(
        "Series is not strictly chronological at index {index}: {previous} followed by {next}"
    )]
    StructuralInconsistency {
        index: usize,
        previous: NaiveDate,
        next: NaiveDate,
    },

    #[error("Invalid record for {date}: {reason}")]
    InvalidRecord { date: String, reason: String },

    #[error("Invalid source period '{label}': {reason}")]
    InvalidPeriod { label: String, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Failed to write output {path}: {reason}")]
    OutputFailed { path: PathBuf, reason: String },

    #[error("Processing interrupted: {reason}")]
    Interrupted { reason: String },
}

impl SeriesError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid period error
    pub fn invalid_period(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPeriod {
            label: label.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error describes a single missing or unreadable source
    ///
    /// Such errors are recovered by the merger; everything else propagates.
    pub fn is_source_level(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound { .. } | Self::SourceUnreadable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SeriesError>;
