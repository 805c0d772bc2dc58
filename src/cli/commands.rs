//! Command implementations for the climate_series CLI
//!
//! Each subcommand loads the layered configuration, applies its own flag
//! overrides and hands off to the library. Reports go to stdout; logs go to
//! stderr.

use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::audit::{
    Auditor, QualityReport, annual_aggregates, daily_climatology, fill_missing_years,
    monthly_aggregates, monthly_yearly_aggregates, render_report,
};
use crate::cli::args::{
    AggregateArgs, AggregateKind, Args, AuditArgs, Commands, FilterArgs, OutputFormat,
    ReconcileArgs,
};
use crate::config::PipelineConfig;
use crate::error::{Result, SeriesError};
use crate::extractor::LineDiagnostic;
use crate::forecast::{
    Forecaster, HistorySeries, LinearTrendForecaster, Reading, forecast_grouped, monthly_histories,
};
use crate::models::CanonicalSeries;
use crate::pipeline::filter_year_range;
use crate::processor::{ProcessingOutcome, SeriesProcessor};
use crate::writer::{load_canonical, write_canonical, write_json_atomic};

/// Run the parsed command line
pub async fn run(args: Args) -> Result<()> {
    setup_logging(&args);
    debug!("Command line arguments: {:?}", args);

    let config = PipelineConfig::load(args.config_file.as_deref())?;

    match &args.command {
        Commands::Reconcile(reconcile) => {
            run_reconcile(&args, config, reconcile).await?;
        }
        Commands::Audit(audit) => {
            run_audit(&args, &config, audit)?;
        }
        Commands::Filter(filter) => {
            run_filter(&args, filter)?;
        }
        Commands::Aggregate(aggregate) => run_aggregate(aggregate)?,
        Commands::Config => run_config(&args, &config)?,
    }
    Ok(())
}

/// Set up tracing on stderr
///
/// `RUST_LOG` takes precedence over the verbosity flags.
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("climate_series={}", log_level)));

    let result = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    // A subscriber installed earlier in the process keeps its settings
    match result {
        Ok(()) => debug!("Logging initialized at level: {}", log_level),
        Err(e) => debug!("Logging already initialized: {}", e),
    }
}

/// Fold reconcile flags into the loaded configuration
pub fn apply_reconcile_overrides(
    mut config: PipelineConfig,
    reconcile: &ReconcileArgs,
) -> PipelineConfig {
    if !reconcile.sources.is_empty() {
        config = config.with_sources(reconcile.source_files());
    }
    if let Some(dir) = &reconcile.source_dir {
        config = config.with_source_dir(dir);
    }
    if let Some(range) = reconcile.year_range(config.year_range) {
        config = config.with_year_range(range);
    }
    if let Some(jobs) = reconcile.jobs {
        config = config.with_max_concurrent_files(jobs);
    }
    if let Some(path) = &reconcile.output {
        config = config.with_output_path(path);
    }
    if let Some(path) = &reconcile.annual {
        config = config.with_annual_path(path);
    }
    if let Some(path) = &reconcile.parquet {
        config = config.with_parquet_path(path);
    }
    config
}

async fn run_reconcile(
    args: &Args,
    config: PipelineConfig,
    reconcile: &ReconcileArgs,
) -> Result<ProcessingOutcome> {
    let config = apply_reconcile_overrides(config, reconcile);
    let render_options = config.render_options();

    let outcome = SeriesProcessor::new(config)?
        .with_quiet(!args.show_progress())
        .process()
        .await?;

    if !args.quiet {
        let output = ReconcileOutput {
            report: &outcome.report,
            diagnostics: &outcome.reconcile.diagnostics,
        };
        print_report(args.output_format, &output, || {
            render_report(&outcome.report, &render_options)
        })?;
    }
    Ok(outcome)
}

/// JSON shape of a `reconcile` run
#[derive(Debug, Serialize)]
pub struct ReconcileOutput<'a> {
    pub report: &'a QualityReport,
    pub diagnostics: &'a [LineDiagnostic],
}

fn run_audit(args: &Args, config: &PipelineConfig, audit: &AuditArgs) -> Result<QualityReport> {
    let series = load_canonical(&audit.input)?;

    let mut audit_config = config.audit_config();
    if let Some(span) = audit.target_span() {
        audit_config = audit_config.with_target_span(Some(span));
    }
    let mut render_options = config.render_options();
    if let Some(limit) = audit.gap_limit {
        render_options.gap_display_limit = limit;
    }

    let report = Auditor::new(audit_config).audit(&series);
    print_report(args.output_format, &report, || {
        render_report(&report, &render_options)
    })?;
    Ok(report)
}

/// Summary of a `filter` run
#[derive(Debug, Clone, Serialize)]
pub struct FilterSummary {
    pub before: usize,
    pub after: usize,
    pub removed: usize,
}

fn run_filter(args: &Args, filter: &FilterArgs) -> Result<FilterSummary> {
    filter.validate()?;
    let range = filter.year_range();

    let series = load_canonical(&filter.input)?;
    let before = series.len();
    let kept = CanonicalSeries::try_new(filter_year_range(series.into_records(), range))?;
    write_canonical(&filter.output, &kept)?;

    let summary = FilterSummary {
        before,
        after: kept.len(),
        removed: before - kept.len(),
    };
    info!(
        "Filtered {} to {}: {} -> {} records",
        filter.input.display(),
        range,
        summary.before,
        summary.after
    );

    if !args.quiet {
        print_report(args.output_format, &summary, || {
            format!(
                "{}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n",
                format!("Year filter {}", range).as_str().bright_green().bold(),
                "Before:".bright_cyan(),
                summary.before.to_string().bright_white(),
                "After:".bright_cyan(),
                summary.after.to_string().bright_white().bold(),
                "Removed:".bright_cyan(),
                summary.removed.to_string().bright_white(),
                "Written to:".bright_cyan(),
                filter.output.display()
            )
        })?;
    }
    Ok(summary)
}

/// Annual and monthly projections from a canonical series
#[derive(Debug, Clone, Serialize)]
pub struct ForecastOutput {
    pub annual_max: BTreeMap<String, f64>,
    pub annual_min: BTreeMap<String, f64>,
    /// Keyed by month number; months with too little history are empty
    pub monthly_max: BTreeMap<u32, BTreeMap<String, f64>>,
}

/// Projections for the `horizon` years after the last observed year
pub fn forecast_series(series: &CanonicalSeries, horizon: u32) -> ForecastOutput {
    let forecaster = LinearTrendForecaster::default();
    let annual = annual_aggregates(series);

    let max_history = HistorySeries::from_annual(&annual, Reading::Max);

    let years: Vec<i32> = match max_history.last_year() {
        Some(last) => (1..=horizon as i32).map(|ahead| last + ahead).collect(),
        None => Vec::new(),
    };

    ForecastOutput {
        annual_max: forecaster.forecast(&max_history, &years),
        annual_min: forecaster.forecast(&HistorySeries::from_annual(&annual, Reading::Min), &years),
        monthly_max: forecast_grouped(
            &forecaster,
            &monthly_histories(series.records(), Reading::Max),
            &years,
        ),
    }
}

fn run_aggregate(aggregate: &AggregateArgs) -> Result<()> {
    aggregate.validate()?;
    let series = load_canonical(&aggregate.input)?;

    let value = match aggregate.kind {
        AggregateKind::Annual => {
            let annual = annual_aggregates(&series);
            if aggregate.fill_missing {
                serde_json::to_value(fill_missing_years(annual))?
            } else {
                serde_json::to_value(annual)?
            }
        }
        AggregateKind::Monthly => serde_json::to_value(monthly_aggregates(&series))?,
        AggregateKind::MonthlyYearly => {
            let month = aggregate.month.ok_or_else(|| {
                SeriesError::configuration("--month is required for monthly-yearly aggregates")
            })?;
            serde_json::to_value(monthly_yearly_aggregates(&series, month))?
        }
        AggregateKind::Daily => serde_json::to_value(daily_climatology(&series))?,
        AggregateKind::Forecast => serde_json::to_value(forecast_series(&series, aggregate.horizon))?,
    };

    emit_json(aggregate.output.as_deref(), &value)
}

fn run_config(args: &Args, config: &PipelineConfig) -> Result<()> {
    let text = config.to_toml_string()?;
    print_report(args.output_format, config, || text)
}

fn emit_json<T: Serialize + ?Sized>(output: Option<&Path>, value: &T) -> Result<()> {
    match output {
        Some(path) => {
            write_json_atomic(path, value)?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

fn print_report<T, F>(format: OutputFormat, value: &T, human: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> String,
{
    match format {
        OutputFormat::Human => print!("{}", human()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
