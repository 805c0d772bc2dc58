//! Source loading and merging
//!
//! Sources are read concurrently but reassembled in configured order (oldest
//! era first), concatenated, then stably sorted by date. Stability matters:
//! among records sharing a date, the one from the later source stays later,
//! which is what the deduplicator's last-write-wins rule relies on.

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{Result, SeriesError};
use crate::extractor::{ExtractResult, LineDiagnostic, RecordExtractor};
use crate::models::{RecordOrigin, SourceFile, SourcePeriod, SourcedRecord};

/// Outcome of reading one configured source
#[derive(Debug)]
pub struct LoadedSource {
    /// Position in the configured source list
    pub index: usize,
    pub file: SourceFile,
    pub period: Option<SourcePeriod>,
    pub outcome: Result<ExtractResult>,
}

/// A source that contributed nothing because it could not be read
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFailure {
    pub index: usize,
    pub source: String,
    pub path: PathBuf,
    pub reason: String,
}

/// Per-source contribution to the merged set
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSummary {
    pub index: usize,
    pub source: Arc<str>,
    pub station: Option<String>,
    pub period: Option<SourcePeriod>,
    pub records: usize,
    pub lines_skipped: usize,
    pub header_found: bool,
}

/// Concatenated, date-sorted records from every readable source
#[derive(Debug, Clone, Default)]
pub struct MergeResult {
    pub records: Vec<SourcedRecord>,
    pub sources: Vec<SourceSummary>,
    pub failures: Vec<SourceFailure>,
    pub diagnostics: Vec<LineDiagnostic>,
}

impl MergeResult {
    pub fn sources_configured(&self) -> usize {
        self.sources.len() + self.failures.len()
    }

    /// Fails only when no configured source could be read at all
    pub fn ensure_usable(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(SeriesError::NoUsableSources {
                configured: self.sources_configured(),
            });
        }
        Ok(())
    }
}

/// Reads and merges an ordered list of sources
#[derive(Debug, Clone)]
pub struct SourceMerger {
    extractor: RecordExtractor,
    max_concurrent_files: usize,
}

impl SourceMerger {
    pub fn new(extractor: RecordExtractor, max_concurrent_files: usize) -> Self {
        Self {
            extractor,
            max_concurrent_files: max_concurrent_files.max(1),
        }
    }

    /// Read every source, preserving configured order in the output
    pub async fn load(
        &self,
        sources: &[SourceFile],
        progress: Option<&ProgressBar>,
    ) -> Vec<LoadedSource> {
        stream::iter(sources.iter().cloned().enumerate())
            .map(|(index, file)| {
                let extractor = self.extractor;
                async move {
                    let period = match file.parsed_period() {
                        Ok(period) => period,
                        Err(e) => {
                            warn!("Ignoring period of {}: {}", file.display_name(), e);
                            None
                        }
                    };
                    let outcome = extractor
                        .extract_file(&file.display_name(), &file.path)
                        .await;
                    LoadedSource {
                        index,
                        file,
                        period,
                        outcome,
                    }
                }
            })
            .buffered(self.max_concurrent_files)
            .inspect(|loaded| {
                if let Some(pb) = progress {
                    pb.inc(1);
                    pb.set_message(loaded.file.display_name());
                }
            })
            .collect()
            .await
    }

    /// Load and merge in one step
    pub async fn load_and_merge(
        &self,
        sources: &[SourceFile],
        progress: Option<&ProgressBar>,
    ) -> Result<MergeResult> {
        let loaded = self.load(sources, progress).await;
        merge_sources(loaded)
    }
}

/// Concatenate loaded sources in order, then stably sort by date
///
/// Missing or unreadable sources are skipped with a warning. Any other error
/// from a source propagates.
pub fn merge_sources(mut loaded: Vec<LoadedSource>) -> Result<MergeResult> {
    loaded.sort_by_key(|source| source.index);

    let mut merged = MergeResult::default();

    for source in loaded {
        let extraction = match source.outcome {
            Ok(extraction) => extraction,
            Err(e) if e.is_source_level() => {
                warn!("Skipping source {}: {}", source.file.display_name(), e);
                merged.failures.push(SourceFailure {
                    index: source.index,
                    source: source.file.display_name(),
                    path: source.file.path.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
            Err(e) => return Err(e),
        };

        info!(
            "Merging {} records from {}",
            extraction.record_count(),
            extraction.source
        );

        merged.sources.push(SourceSummary {
            index: source.index,
            source: Arc::clone(&extraction.source),
            station: extraction.station.clone(),
            period: source.period,
            records: extraction.record_count(),
            lines_skipped: extraction.stats.lines_skipped(),
            header_found: extraction.stats.header_found,
        });

        let ExtractResult {
            source: name,
            records,
            stats,
            ..
        } = extraction;

        merged.diagnostics.extend(stats.diagnostics);
        merged
            .records
            .extend(records.into_iter().map(|extracted| SourcedRecord {
                record: extracted.record,
                origin: RecordOrigin {
                    source_index: source.index,
                    source: Arc::clone(&name),
                    line: extracted.line,
                    period: source.period,
                },
            }));
    }

    // Vec::sort_by_key is stable; equal dates keep source order
    merged.records.sort_by_key(|sourced| sourced.record.date());

    info!(
        "Merged {} records from {} sources ({} skipped)",
        merged.records.len(),
        merged.sources.len(),
        merged.failures.len()
    );

    Ok(merged)
}
