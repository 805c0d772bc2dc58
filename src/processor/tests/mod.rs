//! Integration tests for the processor module
//!
//! Runs complete pipelines over export files written to temporary
//! directories.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::PipelineConfig;
use crate::extractor::tests::homogeneous_export;
use crate::models::SourceFile;


/// Write an export with one `date,max,8,1,min,8` row per day in the list
pub fn write_export(dir: &Path, name: &str, rows: &[(&str, f64, f64)]) -> PathBuf {
    let lines: Vec<String> = rows
        .iter()
        .map(|(date, max, min)| format!("{},{:.1},8,1,{:.1},8", date, max, min))
        .collect();
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();

    let path = dir.join(name);
    std::fs::write(&path, homogeneous_export(&lines)).unwrap();
    path
}

/// Configuration reading `sources` from `dir` and writing into `dir/out`
pub fn test_config(dir: &TempDir, sources: Vec<SourceFile>) -> PipelineConfig {
    PipelineConfig::default()
        .with_sources(sources)
        .with_source_dir(dir.path())
        .with_output_path(dir.path().join("out").join("temperature_data.json"))
        .with_max_concurrent_files(2)
}
