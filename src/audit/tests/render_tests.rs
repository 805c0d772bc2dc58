//! Tests for report rendering

use super::*;
use crate::audit::{Auditor, RenderOptions, render_report};

fn gappy_series(gap_count: u32) -> CanonicalSeries {
    // Every other day in January, giving one single-day gap between each pair
    let records = (0..=gap_count)
        .map(|i| DailyRecord::new(date(2020, 1, 1 + 2 * i), 10.0, 1.0))
        .collect();
    series(records)
}

#[test]
fn test_gap_list_is_truncated_with_note() {
    let report = Auditor::default().audit(&gappy_series(12));

    let text = render_report(&report, &RenderOptions::default());

    assert_eq!(report.gaps.len(), 12);
    assert!(text.contains("2020/01/02 - 2020/01/02 (1 days)"));
    assert!(text.contains("... and 2 more gaps"));
    assert!(!text.contains("2020/01/24 - 2020/01/24"));
}

#[test]
fn test_gap_limit_is_configurable() {
    let report = Auditor::default().audit(&gappy_series(3));
    let options = RenderOptions {
        gap_display_limit: 1,
        ..RenderOptions::default()
    };

    let text = render_report(&report, &options);

    assert!(text.contains("... and 2 more gaps"));
}

#[test]
fn test_clean_report_text() {
    let records = full_days(date(2020, 1, 1), date(2020, 1, 10), 10.0, 1.0);
    let report = Auditor::default().audit(&series(records));

    let text = render_report(&report, &RenderOptions::default());

    assert!(text.contains("no date gaps"));
    assert!(text.contains("no missing readings"));
    assert!(text.contains("2020/01/01 to 2020/01/10"));
}

#[test]
fn test_empty_report_text() {
    let report = Auditor::default().audit(&series(Vec::new()));
    let text = render_report(&report, &RenderOptions::default());
    assert!(text.contains("No records to audit"));
}
