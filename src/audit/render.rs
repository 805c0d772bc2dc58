//! Human-readable rendering of quality reports

use colored::*;
use std::fmt::Write;

use super::report::QualityReport;
use crate::constants::INVALID_RECORD_DISPLAY_LIMIT;

/// Options controlling how much of a report is shown
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Gaps listed before the rest are summarized
    pub gap_display_limit: usize,
    /// Implausible records listed before the rest are summarized
    pub invalid_display_limit: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            gap_display_limit: crate::constants::DEFAULT_GAP_DISPLAY_LIMIT,
            invalid_display_limit: INVALID_RECORD_DISPLAY_LIMIT,
        }
    }
}

fn years_list(years: &[i32]) -> String {
    years
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn ok_or_warn(ok: bool) -> ColoredString {
    if ok { "OK".bright_green() } else { "WARN".bright_yellow() }
}

/// Render the full report as colored text
pub fn render_report(report: &QualityReport, options: &RenderOptions) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_report(&mut out, report, options);
    out
}

fn write_report(out: &mut String, report: &QualityReport, options: &RenderOptions) -> std::fmt::Result {
    writeln!(out, "{}", "Data Quality Report".bright_green().bold())?;
    writeln!(
        out,
        "  {} {}",
        "Total records:".bright_cyan(),
        report.total_records.to_string().bright_white().bold()
    )?;

    let (Some(first), Some(last)) = (report.first_date, report.last_date) else {
        writeln!(out, "  {}", "No records to audit".bright_yellow())?;
        return Ok(());
    };
    writeln!(
        out,
        "  {} {} to {}",
        "Date range:".bright_cyan(),
        first.format("%Y/%m/%d"),
        last.format("%Y/%m/%d")
    )?;
    if let (Some(first_year), Some(last_year)) = (report.first_year_days(), report.last_year_days()) {
        writeln!(
            out,
            "  {} {} ({} days), {} ({} days)",
            "First/last year:".bright_cyan(),
            first_year.year,
            first_year.days,
            last_year.year,
            last_year.days
        )?;
    }

    // Years
    writeln!(out, "\n{}", "Year Coverage".bright_yellow())?;
    let short: Vec<_> = report.short_years().collect();
    if short.is_empty() {
        writeln!(out, "  {} every observed year is complete", ok_or_warn(true))?;
    } else {
        writeln!(out, "  {} {} years below the calendar:", ok_or_warn(false), short.len())?;
        for count in short {
            writeln!(
                out,
                "    {}: {}/{} days ({} missing)",
                count.year,
                count.days,
                count.expected,
                count.shortfall()
            )?;
        }
    }
    if !report.incomplete_years.is_empty() {
        writeln!(
            out,
            "  {} {} years under {} days: {}",
            ok_or_warn(false),
            report.incomplete_years.len(),
            report.incomplete_year_threshold,
            years_list(&report.incomplete_years.iter().map(|c| c.year).collect::<Vec<_>>())
        )?;
    }

    let missing = &report.missing_years;
    if missing.missing_in_span.is_empty() {
        writeln!(out, "  {} no missing years", ok_or_warn(true))?;
    } else {
        writeln!(
            out,
            "  {} missing years: {}",
            ok_or_warn(false),
            years_list(&missing.missing_in_span)
        )?;
    }
    if let Some(target) = missing.target_span {
        writeln!(
            out,
            "  {} {} ({:.1}% complete)",
            "Target span:".bright_cyan(),
            target,
            missing.target_completeness
        )?;
        if !missing.missing_in_target.is_empty() {
            writeln!(out, "    missing: {}", years_list(&missing.missing_in_target))?;
        }
        if !missing.extra_years.is_empty() {
            writeln!(out, "    outside target: {}", years_list(&missing.extra_years))?;
        }
    }

    // Gaps
    writeln!(out, "\n{}", "Date Continuity".bright_yellow())?;
    if report.gaps.is_empty() {
        writeln!(out, "  {} no date gaps", ok_or_warn(true))?;
    } else {
        writeln!(
            out,
            "  {} {} gaps, {} days missing",
            ok_or_warn(false),
            report.gaps.len().to_string().bright_red().bold(),
            report.total_gap_days()
        )?;
        for gap in report.gaps.iter().take(options.gap_display_limit) {
            writeln!(
                out,
                "    {} - {} ({} days)",
                gap.start.format("%Y/%m/%d"),
                gap.end.format("%Y/%m/%d"),
                gap.days
            )?;
        }
        if report.gaps.len() > options.gap_display_limit {
            writeln!(
                out,
                "    ... and {} more gaps",
                report.gaps.len() - options.gap_display_limit
            )?;
        }
    }

    // Values
    writeln!(out, "\n{}", "Values".bright_yellow())?;
    let nulls = report.null_counts;
    if nulls.is_clean() {
        writeln!(out, "  {} no missing readings", ok_or_warn(true))?;
    } else {
        writeln!(
            out,
            "  {} missing readings: max {} / min {} (extraction should have dropped these)",
            "ERROR".bright_red().bold(),
            nulls.max_temp,
            nulls.min_temp
        )?;
    }
    if report.implausible.is_empty() {
        writeln!(out, "  {} no records with max below min", ok_or_warn(true))?;
    } else {
        writeln!(
            out,
            "  {} {} records with max below min",
            ok_or_warn(false),
            report.implausible.len()
        )?;
        for record in report.implausible.iter().take(options.invalid_display_limit) {
            writeln!(
                out,
                "    {}: max {:.1} < min {:.1}",
                record.date.format("%Y/%m/%d"),
                record.max_temp,
                record.min_temp
            )?;
        }
        if report.implausible.len() > options.invalid_display_limit {
            writeln!(
                out,
                "    ... and {} more",
                report.implausible.len() - options.invalid_display_limit
            )?;
        }
    }

    let extremes = &report.extremes;
    for (label, extreme) in [
        ("Highest max:", extremes.highest_max),
        ("Lowest max:", extremes.lowest_max),
        ("Highest min:", extremes.highest_min),
        ("Lowest min:", extremes.lowest_min),
    ] {
        if let Some(extreme) = extreme {
            writeln!(
                out,
                "  {} {:.1} on {}",
                label.bright_cyan(),
                extreme.value,
                extreme.date.format("%Y/%m/%d")
            )?;
        }
    }

    let months = report
        .month_distribution
        .iter()
        .map(|m| format!("{} {}", m.name, m.days))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "  {} {}", "Days per month:".bright_cyan(), months)?;

    // Annual means
    if !report.extreme_averages.is_empty() {
        writeln!(out, "\n{}", "Unusual Annual Means".bright_yellow())?;
        for year in &report.extreme_averages {
            writeln!(
                out,
                "  {}: max {:.1}, min {:.1}",
                year.year, year.avg_max_temp, year.avg_min_temp
            )?;
        }
    }

    if report.trend.is_some() || report.warming.is_some() {
        writeln!(out, "\n{}", "Trend".bright_yellow())?;
    }
    if let Some(trend) = report.trend {
        writeln!(
            out,
            "  {} {:+.2} per century",
            "Annual max trend:".bright_cyan(),
            trend.per_century()
        )?;
    }
    if let Some(warming) = report.warming {
        writeln!(
            out,
            "  {} {:+.1} (last {} years vs first {})",
            "Warming:".bright_cyan(),
            warming.delta,
            warming.window,
            warming.window
        )?;
    }

    writeln!(
        out,
        "\n{} {}",
        "Overall:".bright_cyan(),
        if report.is_clean() {
            "clean".bright_green().bold()
        } else {
            "issues found".bright_yellow().bold()
        }
    )?;

    Ok(())
}
