//! Command-line argument definitions
//!
//! Four subcommands share the logging and output-format options:
//! `reconcile` runs the whole pipeline, `audit` reports on an existing
//! canonical file, `filter` narrows one to a year range and `aggregate`
//! derives summary series from it.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Result, SeriesError};
use crate::models::{SourceFile, YearRange};

#[derive(Parser, Debug, Clone)]
#[command(name = "climate_series")]
#[command(about = "Reconcile multi-era weather-station CSV exports into one audited daily temperature series")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short = 'c', long = "config", global = true, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Format for reports printed to stdout
    #[arg(long = "format", value_enum, default_value = "human", global = true)]
    pub output_format: OutputFormat,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Merge, deduplicate and filter the source exports, then audit the result
    Reconcile(ReconcileArgs),

    /// Print the quality report for an existing canonical file
    Audit(AuditArgs),

    /// Restrict a canonical file to a year range
    Filter(FilterArgs),

    /// Derive annual, monthly or day-of-year aggregates from a canonical file
    Aggregate(AggregateArgs),

    /// Print the effective configuration (file plus defaults) as TOML
    Config,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ReconcileArgs {
    /// Source exports, oldest era first; `PATH` or `PATH=PERIOD` (e.g. data-5.csv=1950-1965)
    #[arg(value_name = "SOURCE")]
    pub sources: Vec<SourceArg>,

    /// Directory relative source paths are resolved against
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Canonical JSON output path
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write annual aggregates (missing years interpolated) to this file
    #[arg(long, value_name = "FILE")]
    pub annual: Option<PathBuf>,

    /// Also export the canonical series as Parquet
    #[arg(long, value_name = "FILE")]
    pub parquet: Option<PathBuf>,

    /// First year kept
    #[arg(long)]
    pub min_year: Option<i32>,

    /// Last year kept
    #[arg(long)]
    pub max_year: Option<i32>,

    /// Maximum source files read at once
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct AuditArgs {
    /// Canonical JSON file to audit
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Date gaps listed before truncating
    #[arg(long)]
    pub gap_limit: Option<usize>,

    /// First year of the span expected to be complete
    #[arg(long, requires = "target_end")]
    pub target_start: Option<i32>,

    /// Last year of the span expected to be complete
    #[arg(long, requires = "target_start")]
    pub target_end: Option<i32>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct FilterArgs {
    /// Canonical JSON file to read
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Filtered canonical JSON file to write
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// First year kept (inclusive)
    #[arg(long)]
    pub min_year: i32,

    /// Last year kept (inclusive)
    #[arg(long)]
    pub max_year: i32,
}

#[derive(clap::Args, Debug, Clone)]
pub struct AggregateArgs {
    /// Canonical JSON file to read
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Aggregate to compute
    #[arg(short, long, value_enum, default_value = "annual")]
    pub kind: AggregateKind,

    /// Target month for `monthly-yearly` (1-12)
    #[arg(long, required_if_eq("kind", "monthly-yearly"))]
    pub month: Option<u32>,

    /// Interpolate years with no data (annual only)
    #[arg(long)]
    pub fill_missing: bool,

    /// Years ahead to project for `forecast`
    #[arg(long, default_value = "10")]
    pub horizon: u32,

    /// Write JSON here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    /// One row per year
    Annual,
    /// One row per calendar month across all years
    Monthly,
    /// One row per year for a single month
    MonthlyYearly,
    /// One row per day of year, Feb 29 excluded
    Daily,
    /// Linear-trend projection of annual means
    Forecast,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Colored text
    Human,
    /// JSON
    Json,
}

/// A source given on the command line as `PATH` or `PATH=PERIOD`
#[derive(Debug, Clone, PartialEq)]
pub struct SourceArg(pub SourceFile);

impl FromStr for SourceArg {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self> {
        let (path, period) = match s.split_once('=') {
            Some((path, period)) => (path.trim(), Some(period.trim())),
            None => (s.trim(), None),
        };

        if path.is_empty() {
            return Err(SeriesError::configuration(format!(
                "source '{}' has an empty path",
                s
            )));
        }

        let mut source = SourceFile::new(path);
        if let Some(period) = period {
            source = source.with_period(period);
            source.parsed_period()?;
        }
        Ok(Self(source))
    }
}

impl Args {
    /// Log level implied by the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Progress bars and banners are hidden in quiet mode and for JSON output
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }
}

impl ReconcileArgs {
    /// Year range override, if either bound was given
    ///
    /// A missing bound is taken from `fallback`.
    pub fn year_range(&self, fallback: YearRange) -> Option<YearRange> {
        if self.min_year.is_none() && self.max_year.is_none() {
            return None;
        }
        Some(YearRange::new(
            self.min_year.unwrap_or(fallback.min_year),
            self.max_year.unwrap_or(fallback.max_year),
        ))
    }

    pub fn source_files(&self) -> Vec<SourceFile> {
        self.sources.iter().map(|s| s.0.clone()).collect()
    }
}

impl AuditArgs {
    pub fn target_span(&self) -> Option<YearRange> {
        match (self.target_start, self.target_end) {
            (Some(start), Some(end)) => Some(YearRange::new(start, end)),
            _ => None,
        }
    }
}

impl FilterArgs {
    pub fn validate(&self) -> Result<()> {
        if self.min_year > self.max_year {
            return Err(SeriesError::configuration(format!(
                "--min-year {} is after --max-year {}",
                self.min_year, self.max_year
            )));
        }
        if self.input == self.output {
            return Err(SeriesError::configuration(
                "filter output must differ from its input",
            ));
        }
        Ok(())
    }

    pub fn year_range(&self) -> YearRange {
        YearRange::new(self.min_year, self.max_year)
    }
}

impl AggregateArgs {
    pub fn validate(&self) -> Result<()> {
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(SeriesError::configuration(format!(
                    "--month must be between 1 and 12, got {}",
                    month
                )));
            }
        }
        if self.fill_missing && self.kind != AggregateKind::Annual {
            return Err(SeriesError::configuration(
                "--fill-missing only applies to annual aggregates",
            ));
        }
        if self.kind == AggregateKind::Forecast && self.horizon == 0 {
            return Err(SeriesError::configuration("--horizon must be at least 1"));
        }
        Ok(())
    }
}
