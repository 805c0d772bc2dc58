//! Climate Series Library
//!
//! Reconciles daily temperature exports from one weather station, split
//! across several historical files, into a single canonical series.
//!
//! This library provides tools for:
//! - Extracting dated max/min readings from CSV exports with a variable preamble
//! - Merging sources in authority order, skipping missing or unreadable files
//! - Resolving duplicate dates (the latest source wins)
//! - Filtering to an inclusive year range
//! - Auditing continuity and plausibility, and computing aggregates
//! - Writing the canonical JSON interchange file and optional Parquet

pub mod audit;
pub mod config;
pub mod constants;
pub mod error;
pub mod extractor;
pub mod forecast;
pub mod header;
pub mod models;
pub mod pipeline;
pub mod processor;
pub mod writer;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::PipelineConfig;
pub use error::{Result, SeriesError};
pub use models::{CanonicalSeries, DailyRecord, SourceFile, YearRange};
pub use processor::{ProcessingOutcome, SeriesProcessor};
