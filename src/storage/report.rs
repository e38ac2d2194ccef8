//! ROI report rendering
//!
//! Fixed-width text report for batch evaluations: a timestamp line, a
//! header, then one right-justified row per item that cleared the ROI
//! threshold. Failed items are listed in a trailing comment block so they
//! are never mistaken for zero-cost rows.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use crate::craft::BatchReport;
use crate::domain::format_coins;

/// Renders the fixed-width report body.
pub fn render_report(report: &BatchReport, timestamp: &str) -> String {
    let mut out = String::new();

    // Column widths match the long-standing watchlist report layout.
    let _ = writeln!(out, "{}", timestamp);
    let _ = writeln!(
        out,
        "{:>35} {:>20} {:>15} {:>15}",
        "name", "craft_cost", "sell", "ROI"
    );

    for row in &report.rows {
        let _ = writeln!(
            out,
            "{:>35} {:>20} {:>15} {:>15}",
            row.name,
            format_coins(row.craft_cost),
            format_coins(row.sell_price),
            row.roi
        );
    }

    if !report.failures.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "# failed items");
        for failure in &report.failures {
            let _ = writeln!(out, "# {}: {}", failure.name, failure.reason);
        }
    }

    out
}

/// Writes the report to `path`, stamped with the current local time.
pub fn write_report(path: &Path, report: &BatchReport) -> Result<()> {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    fs::write(path, render_report(report, &timestamp))
        .with_context(|| format!("Failed to write report: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::craft::{BatchFailure, BatchRow};

    fn sample_report() -> BatchReport {
        BatchReport {
            rows: vec![BatchRow {
                name: "Oiled Forged Scrap".to_string(),
                craft_cost: 123_793,
                sell_price: 250_000,
                roi: 71,
            }],
            failures: vec![BatchFailure {
                name: "Bad Item".to_string(),
                reason: "item not found: Bad Item".to_string(),
            }],
            evaluated: 3,
        }
    }

    #[test]
    fn starts_with_timestamp_and_header() {
        let rendered = render_report(&sample_report(), "2026-08-27 10:00:00");
        let mut lines = rendered.lines();

        assert_eq!(lines.next(), Some("2026-08-27 10:00:00"));
        let header = lines.next().unwrap();
        assert_eq!(header.len(), 35 + 1 + 20 + 1 + 15 + 1 + 15);
        assert!(header.ends_with(&format!("{:>15}", "ROI")));
        assert!(header.starts_with(&format!("{:>35}", "name")));
    }

    #[test]
    fn rows_are_right_justified_at_fixed_widths() {
        let rendered = render_report(&sample_report(), "ts");
        let row = rendered.lines().nth(2).unwrap();

        assert_eq!(row.len(), 35 + 1 + 20 + 1 + 15 + 1 + 15);
        assert!(row.ends_with(&format!("{:>15}", 71)));
        assert!(row.contains("12g 37s 93c"));
        assert!(row.contains("25g 0s 0c"));
    }

    #[test]
    fn failures_land_in_a_comment_block() {
        let rendered = render_report(&sample_report(), "ts");

        assert!(rendered.contains("# failed items"));
        assert!(rendered.contains("# Bad Item: item not found: Bad Item"));
    }

    #[test]
    fn report_without_failures_has_no_comment_block() {
        let report = BatchReport {
            failures: vec![],
            ..sample_report()
        };

        let rendered = render_report(&report, "ts");
        assert!(!rendered.contains("# failed items"));
    }
}
