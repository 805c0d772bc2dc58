//! Main processing engine.
//!
//! Orchestrates a full run: load and merge the configured sources, reconcile
//! them into the canonical series, audit it and write the outputs.

#[cfg(test)]
pub mod tests;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;

use crate::audit::{Auditor, QualityReport, fill_missing_years};
use crate::config::PipelineConfig;
use crate::constants::DIAGNOSTIC_DISPLAY_LIMIT;
use crate::error::Result;
use crate::extractor::{LineDiagnostic, RecordExtractor};
use crate::models::ProcessingStats;
use crate::pipeline::{MergeResult, ReconcileResult, SeriesReconciler, SourceMerger};
use crate::writer;

/// Everything produced by one run
#[derive(Debug, Clone)]
pub struct ProcessingOutcome {
    pub reconcile: ReconcileResult,
    pub report: QualityReport,
    pub stats: ProcessingStats,
    /// Files written, canonical JSON first
    pub outputs: Vec<PathBuf>,
}

impl ProcessingOutcome {
    /// No configured source could be read
    pub fn had_no_usable_sources(&self) -> bool {
        self.stats.sources_loaded == 0
    }
}

/// Runs the reconciliation pipeline described by a [`PipelineConfig`]
#[derive(Debug, Clone)]
pub struct SeriesProcessor {
    config: PipelineConfig,
    quiet: bool,
}

impl SeriesProcessor {
    /// Create a processor; the configuration is validated here
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            quiet: false,
        })
    }

    /// Suppress progress bars and console summaries
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Main processing entry point
    ///
    /// Unreadable sources are skipped. When none can be read the run still
    /// succeeds: an empty canonical file is written and the outcome says so.
    pub async fn process(&self) -> Result<ProcessingOutcome> {
        let start_time = Instant::now();
        let sources = self.config.resolved_sources();
        let output_path = &self.config.output.canonical_path;

        if !self.quiet {
            println!("{}", "Starting series reconciliation".bright_green().bold());
            println!(
                "  {} {} (oldest era first)",
                "Sources:".bright_cyan(),
                sources.len().to_string().bright_white().bold()
            );
            println!("  {} {}", "Year range:".bright_cyan(), self.config.year_range);
            println!("  {} {}", "Output:".bright_cyan(), output_path.display());
            println!("\n{}", "Loading sources...".bright_yellow());
        }

        // Step 1: Load and merge
        let progress = self.progress_bar(sources.len() as u64);
        let merger = SourceMerger::new(RecordExtractor::new(), self.config.max_concurrent_files);
        let merged = merger.load_and_merge(&sources, Some(&progress)).await?;
        progress.finish_and_clear();

        let usable = match merged.ensure_usable() {
            Ok(()) => true,
            Err(e) => {
                warn!("{}; writing empty output", e);
                if !self.quiet {
                    println!("  {} {}", "Warning:".bright_red().bold(), e);
                }
                false
            }
        };

        let mut stats = merge_stats(&merged);
        stats.sources_configured = sources.len();

        // Step 2: Reconcile
        let reconcile = if usable {
            SeriesReconciler::new(self.config.year_range).reconcile(merged)?
        } else {
            ReconcileResult {
                failures: merged.failures,
                ..Default::default()
            }
        };
        stats.duplicates_resolved = reconcile.stats.duplicates_resolved;
        stats.authority_inversions = reconcile.stats.authority_inversions;
        stats.records_out_of_range = reconcile.stats.out_of_range;
        stats.canonical_records = reconcile.series.len();

        // Step 3: Audit
        let report = Auditor::new(self.config.audit_config()).audit(&reconcile.series);

        // Step 4: Write
        let outputs = self.write_outputs(&reconcile, &report)?;

        stats.processing_time_ms = start_time.elapsed().as_millis();
        if !self.quiet {
            print_summary(&stats, &reconcile);
        }

        Ok(ProcessingOutcome {
            reconcile,
            report,
            stats,
            outputs,
        })
    }

    fn write_outputs(&self, reconcile: &ReconcileResult, report: &QualityReport) -> Result<Vec<PathBuf>> {
        let output = &self.config.output;
        let mut written = Vec::new();

        writer::write_canonical(&output.canonical_path, &reconcile.series)?;
        written.push(output.canonical_path.clone());

        if let Some(path) = &output.annual_path {
            let annual = fill_missing_years(report.annual.clone());
            writer::write_json_atomic(path, &annual)?;
            written.push(path.clone());
        }

        if let Some(path) = &output.parquet_path {
            writer::write_parquet(path, &reconcile.series, output)?;
            written.push(path.clone());
        }

        Ok(written)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style);
        progress
    }
}

fn merge_stats(merged: &MergeResult) -> ProcessingStats {
    ProcessingStats {
        sources_loaded: merged.sources.len(),
        sources_missing: merged.failures.len(),
        lines_skipped: merged.sources.iter().map(|s| s.lines_skipped).sum(),
        records_extracted: merged.records.len(),
        ..Default::default()
    }
}

fn print_summary(stats: &ProcessingStats, reconcile: &ReconcileResult) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}/{}",
        "Sources loaded:".bright_cyan(),
        stats.sources_loaded.to_string().bright_white(),
        stats.sources_configured
    );
    for failure in &reconcile.failures {
        println!(
            "    {} {} ({})",
            "Skipped".bright_red(),
            failure.source,
            failure.reason
        );
    }
    for source in &reconcile.sources {
        let period = source
            .period
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "    {} {} records, {} lines skipped [{}]",
            source.source, source.records, source.lines_skipped, period
        );
    }
    if !reconcile.diagnostics.is_empty() {
        println!(
            "  {} {}",
            "Skipped lines:".bright_yellow(),
            reconcile.diagnostics.len().to_string().bright_white()
        );
        for line in diagnostic_lines(&reconcile.diagnostics, DIAGNOSTIC_DISPLAY_LIMIT) {
            println!("{}", line);
        }
    }
    println!(
        "  {} {}",
        "Records extracted:".bright_cyan(),
        stats.records_extracted.to_string().bright_white()
    );
    println!(
        "  {} {} over {} dates ({:.1}% reduction)",
        "Duplicates resolved:".bright_cyan(),
        stats.duplicates_resolved.to_string().bright_white(),
        reconcile.stats.duplicated_dates,
        reconcile.stats.dedup_reduction
    );
    if reconcile.stats.outside_period > 0 {
        println!(
            "  {} {}",
            "Outside declared period:".bright_yellow(),
            reconcile.stats.outside_period.to_string().bright_white()
        );
    }
    if stats.authority_inversions > 0 {
        println!(
            "  {} {}",
            "Authority inversions:".bright_red(),
            stats.authority_inversions.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {}",
        "Out of range:".bright_cyan(),
        stats.records_out_of_range.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Canonical records:".bright_cyan(),
        stats.canonical_records.to_string().bright_white().bold()
    );
}

/// Summary lines for skipped-line diagnostics, first `limit` then a count
pub fn diagnostic_lines(diagnostics: &[LineDiagnostic], limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = diagnostics
        .iter()
        .take(limit)
        .map(|diagnostic| format!("    {}", diagnostic))
        .collect();
    if diagnostics.len() > limit {
        lines.push(format!(
            "    ... and {} more skipped lines",
            diagnostics.len() - limit
        ));
    }
    lines
}
