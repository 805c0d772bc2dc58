//! Configuration management and validation.
//!
//! A [`PipelineConfig`] describes the ordered source list, the year range to
//! keep, the audit thresholds and where output goes. It is loaded from TOML
//! (an explicit path, or the user config directory), adjusted with the
//! `with_*` builders, then validated.

use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::audit::{AuditConfig, RenderOptions};
use crate::constants::{
    ANNUAL_AVG_MAX_BAND, ANNUAL_AVG_MIN_BAND, CANONICAL_OUTPUT_FILENAME, CONFIG_DIR_NAME,
    CONFIG_FILENAME, DEFAULT_GAP_DISPLAY_LIMIT, DEFAULT_INCOMPLETE_YEAR_THRESHOLD,
    DEFAULT_MAX_CONCURRENT_FILES, DEFAULT_MAX_YEAR, DEFAULT_MIN_YEAR, DEFAULT_SOURCES,
    DEFAULT_TARGET_END_YEAR, DEFAULT_TARGET_START_YEAR, INVALID_RECORD_DISPLAY_LIMIT,
    WARMING_WINDOW_YEARS,
};
use crate::error::{Result, SeriesError};
use crate::models::{SourceFile, YearRange};

/// Supported compression algorithms for parquet files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    #[default]
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

/// Where and how results are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Canonical JSON interchange file
    pub canonical_path: PathBuf,

    /// Annual aggregates JSON, written when set
    pub annual_path: Option<PathBuf>,

    /// Parquet export of the canonical series, written when set
    pub parquet_path: Option<PathBuf>,

    pub compression: CompressionAlgorithm,

    /// Enable column statistics in parquet output
    pub enable_statistics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            canonical_path: PathBuf::from(CANONICAL_OUTPUT_FILENAME),
            annual_path: None,
            parquet_path: None,
            compression: CompressionAlgorithm::Snappy,
            enable_statistics: true,
        }
    }
}

/// Global configuration for series reconciliation
///
/// Plain values come before tables so the struct serializes to valid TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Base directory for relative source paths
    pub source_dir: Option<PathBuf>,

    /// Date gaps listed in the report before truncation
    pub gap_display_limit: usize,

    /// Years with fewer days are reported as incomplete
    pub incomplete_year_threshold: usize,

    /// Plausible (low, high) annual mean maximum
    pub annual_max_band: (f64, f64),

    /// Plausible (low, high) annual mean minimum
    pub annual_min_band: (f64, f64),

    /// Maximum concurrent file reads
    pub max_concurrent_files: usize,

    /// Years kept in the canonical series (inclusive)
    pub year_range: YearRange,

    /// Span the audit expects to be fully covered
    pub target_span: Option<YearRange>,

    pub output: OutputConfig,

    /// Sources in authority order, oldest era first
    pub sources: Vec<SourceFile>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let sources = DEFAULT_SOURCES
            .iter()
            .map(|&(path, period)| SourceFile::new(path).with_period(period))
            .collect();

        Self {
            sources,
            source_dir: None,
            year_range: YearRange::new(DEFAULT_MIN_YEAR, DEFAULT_MAX_YEAR),
            target_span: Some(YearRange::new(DEFAULT_TARGET_START_YEAR, DEFAULT_TARGET_END_YEAR)),
            gap_display_limit: DEFAULT_GAP_DISPLAY_LIMIT,
            incomplete_year_threshold: DEFAULT_INCOMPLETE_YEAR_THRESHOLD,
            annual_max_band: ANNUAL_AVG_MAX_BAND,
            annual_min_band: ANNUAL_AVG_MIN_BAND,
            max_concurrent_files: num_cpus::get().clamp(1, DEFAULT_MAX_CONCURRENT_FILES),
            output: OutputConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// `<config_dir>/climate-series/config.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME))
    }

    /// Parse configuration from TOML text; missing keys take defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SeriesError::configuration(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_toml_str(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from an explicit path, else the default location, else defaults
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load_from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SeriesError::configuration(format!("Failed to serialize config: {}", e)))
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(SeriesError::configuration("at least one source file is required"));
        }
        if self.year_range.is_empty() {
            return Err(SeriesError::configuration(format!(
                "year range {} ends before it starts",
                self.year_range
            )));
        }
        if let Some(target) = self.target_span.filter(YearRange::is_empty) {
            return Err(SeriesError::configuration(format!(
                "target span {} ends before it starts",
                target
            )));
        }
        if self.max_concurrent_files == 0 {
            return Err(SeriesError::configuration("max_concurrent_files must be at least 1"));
        }
        for (name, (low, high)) in [
            ("annual_max_band", self.annual_max_band),
            ("annual_min_band", self.annual_min_band),
        ] {
            if !(low.is_finite() && high.is_finite() && low <= high) {
                return Err(SeriesError::configuration(format!(
                    "{} must be a finite (low, high) pair, got ({}, {})",
                    name, low, high
                )));
            }
        }
        for source in &self.sources {
            source.parsed_period()?;
        }
        Ok(())
    }

    /// Sources with relative paths resolved against `source_dir`
    pub fn resolved_sources(&self) -> Vec<SourceFile> {
        match &self.source_dir {
            Some(base) => self.sources.iter().map(|s| s.resolved_against(base)).collect(),
            None => self.sources.clone(),
        }
    }

    pub fn audit_config(&self) -> AuditConfig {
        AuditConfig {
            target_span: self.target_span,
            incomplete_year_threshold: self.incomplete_year_threshold,
            annual_max_band: self.annual_max_band,
            annual_min_band: self.annual_min_band,
            warming_window: WARMING_WINDOW_YEARS,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            gap_display_limit: self.gap_display_limit,
            invalid_display_limit: INVALID_RECORD_DISPLAY_LIMIT,
        }
    }

    /// Replace the source list
    pub fn with_sources(mut self, sources: Vec<SourceFile>) -> Self {
        self.sources = sources;
        self
    }

    /// Set the base directory for relative source paths
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(dir.into());
        self
    }

    pub fn with_year_range(mut self, year_range: YearRange) -> Self {
        self.year_range = year_range;
        self
    }

    pub fn with_target_span(mut self, target_span: Option<YearRange>) -> Self {
        self.target_span = target_span;
        self
    }

    pub fn with_gap_display_limit(mut self, limit: usize) -> Self {
        self.gap_display_limit = limit;
        self
    }

    pub fn with_incomplete_year_threshold(mut self, threshold: usize) -> Self {
        self.incomplete_year_threshold = threshold;
        self
    }

    /// Set maximum concurrent files
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output.canonical_path = path.into();
        self
    }

    pub fn with_annual_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output.annual_path = Some(path.into());
        self
    }

    pub fn with_parquet_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output.parquet_path = Some(path.into());
        self
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.output.compression = compression;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_reproduce_eight_eras() {
        let config = PipelineConfig::default();

        assert_eq!(config.sources.len(), 8);
        assert_eq!(config.sources[0].display_name(), "data-9-utf8.csv");
        assert_eq!(config.sources[7].display_name(), "data-utf8.csv");
        assert_eq!(config.year_range, YearRange::new(1890, 2024));
        assert_eq!(config.target_span, Some(YearRange::new(1936, 2024)));
        assert_eq!(config.gap_display_limit, 10);
        assert_eq!(config.incomplete_year_threshold, 300);
        assert!(config.max_concurrent_files >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_periods_are_oldest_first() {
        let config = PipelineConfig::default();
        let starts: Vec<_> = config
            .sources
            .iter()
            .map(|s| s.parsed_period().unwrap().unwrap().start)
            .collect();
        assert!(starts.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_partial_toml_takes_defaults() {
        let toml = r#"
            source_dir = "/data/tokyo"
            gap_display_limit = 3

            [year_range]
            min_year = 1936
            max_year = 2024

            [[sources]]
            path = "data-2.csv"
            period = "1995-2010"

            [[sources]]
            path = "data-utf8.csv"
            label = "modern"
            period = "2010-2025"
        "#;

        let config = PipelineConfig::from_toml_str(toml).unwrap();

        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[1].display_name(), "modern");
        assert_eq!(config.year_range.min_year, 1936);
        assert_eq!(config.gap_display_limit, 3);
        assert_eq!(config.incomplete_year_threshold, 300);
        assert_eq!(config.output.compression, CompressionAlgorithm::Snappy);

        let resolved = config.resolved_sources();
        assert_eq!(resolved[0].path, PathBuf::from("/data/tokyo/data-2.csv"));
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let result = PipelineConfig::from_toml_str("gap_display_limit = \"ten\"");
        assert!(matches!(result, Err(SeriesError::ConfigParse(_))));
    }

    #[test]
    fn test_load_from_file_and_missing_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_concurrent_files = 2").unwrap();

        let config = PipelineConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.max_concurrent_files, 2);

        let missing = PipelineConfig::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(missing, Err(SeriesError::Configuration { .. })));
    }

    #[test]
    fn test_toml_round_trip_preserves_sources() {
        let config = PipelineConfig::default().with_parquet_path("out.parquet");
        let text = config.to_toml_string().unwrap();
        let parsed = PipelineConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validation_failures() {
        let base = PipelineConfig::default();

        assert!(base.clone().with_sources(Vec::new()).validate().is_err());
        assert!(base.clone().with_year_range(YearRange::new(2000, 1990)).validate().is_err());
        assert!(base.clone().with_target_span(Some(YearRange::new(2000, 1990))).validate().is_err());
        assert!(base.clone().with_max_concurrent_files(0).validate().is_err());

        let mut bad_band = base.clone();
        bad_band.annual_max_band = (35.0, 15.0);
        assert!(bad_band.validate().is_err());

        let bad_period = base.with_sources(vec![SourceFile::new("a.csv").with_period("soon")]);
        assert!(matches!(bad_period.validate(), Err(SeriesError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_audit_config_follows_pipeline_config() {
        let config = PipelineConfig::default()
            .with_incomplete_year_threshold(200)
            .with_target_span(None);
        let audit = config.audit_config();
        assert_eq!(audit.incomplete_year_threshold, 200);
        assert_eq!(audit.target_span, None);
        assert_eq!(config.with_gap_display_limit(4).render_options().gap_display_limit, 4);
    }
}
