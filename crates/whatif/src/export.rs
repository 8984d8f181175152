//! Report export
//!
//! Turns a detached `ScenarioReport` into CSV (`name,category,value` rows) or
//! a print-ready text block. Nothing here can reach back into the store.
//!
//! CSV row layout:
//! - live parameters: `<key>,<Category>,<value>`
//! - derived metrics: `<metric>,Metric,<value>`
//! - snapshot values: `snapshot/<name>/<key>,<Category>,<value>`, with `%`
//!   and `/` in the snapshot name written as `%25` and `%2F`
//! - history metadata: `<field>,History,<value>`

use std::borrow::Cow;
use std::fmt::Write;
use std::path::Path;

use whatif_core::ScenarioReport;

use crate::command::ExportFormat;
use crate::render;
use crate::util::atomic_write;

const CSV_HEADER: &str = "name,category,value";

/// Quote a field when it contains a delimiter, quote or line break
fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Escape a snapshot name so it stays a single `/`-separated segment
fn name_segment(name: &str) -> Cow<'_, str> {
    if name.contains(['%', '/']) {
        Cow::Owned(name.replace('%', "%25").replace('/', "%2F"))
    } else {
        Cow::Borrowed(name)
    }
}

fn push_row(out: &mut String, name: &str, category: &str, value: impl std::fmt::Display) {
    let value = value.to_string();
    let _ = writeln!(
        out,
        "{},{},{}",
        csv_field(name),
        csv_field(category),
        csv_field(&value)
    );
}

pub fn to_csv(report: &ScenarioReport) -> String {
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push('\n');

    for row in &report.parameters {
        push_row(&mut out, &row.key, row.category.name(), row.value);
    }

    let metrics = &report.metrics;
    for total in metrics.categories.iter().filter(|c| c.count > 0) {
        let key = render::category_key(total.category);
        push_row(&mut out, &format!("total/{key}"), "Metric", total.total);
        if let Some(average) = total.average {
            push_row(&mut out, &format!("average/{key}"), "Metric", average);
        }
    }
    push_row(&mut out, "positive_total", "Metric", metrics.positive_total);
    push_row(&mut out, "negative_total", "Metric", metrics.negative_total);
    push_row(&mut out, "balance", "Metric", metrics.balance);
    if let Some(ratio) = metrics.coverage_ratio {
        push_row(&mut out, "coverage_ratio", "Metric", ratio);
    }
    push_row(&mut out, "risk", "Metric", metrics.risk);

    for snapshot in &report.snapshots {
        for value in &snapshot.values {
            let name = format!("snapshot/{}/{}", name_segment(&snapshot.name), value.key);
            push_row(&mut out, &name, value.category.name(), value.value);
        }
    }

    push_row(&mut out, "depth", "History", report.history.depth);
    push_row(&mut out, "redo_depth", "History", report.history.redo_depth);
    push_row(&mut out, "capacity", "History", report.history.capacity);
    if let Some(last) = report.history.timestamps.last() {
        push_row(&mut out, "last_change", "History", last);
    }

    out
}

pub fn to_text(report: &ScenarioReport, title: &str) -> String {
    let rule = "=".repeat(title.chars().count().max(40));
    let mut out = format!("{title}\n{rule}\n");
    let _ = writeln!(out, "Generated {}", render::timestamp(report.generated_at));
    let _ = writeln!(
        out,
        "Risk bands: healthy at or above {}, critical at or below {}",
        render::number(report.thresholds.healthy_floor),
        render::number(report.thresholds.low_threshold)
    );

    out.push_str("\nParameters\n");
    out.push_str(&render::parameters(&report.parameters));

    out.push_str("\nMetrics\n");
    out.push_str(&render::metrics(&report.metrics));

    out.push_str("\nSnapshots\n");
    if report.snapshots.is_empty() {
        out.push_str("  (no snapshots)\n");
    }
    for snapshot in &report.snapshots {
        let _ = writeln!(
            out,
            "  {}  saved {}  balance {}  {}",
            snapshot.name,
            render::timestamp(snapshot.saved_at),
            render::number(snapshot.balance),
            snapshot.risk
        );
    }

    out.push_str("\nHistory\n");
    out.push_str(&render::history(&report.history));
    out
}

pub fn render_report(report: &ScenarioReport, format: ExportFormat, title: &str) -> String {
    match format {
        ExportFormat::Csv => to_csv(report),
        ExportFormat::Text => to_text(report, title),
    }
}

/// Render `report` and write it to `path`
pub fn write_report(
    report: &ScenarioReport,
    format: ExportFormat,
    title: &str,
    path: &Path,
) -> std::io::Result<()> {
    let content = render_report(report, format, title);
    atomic_write(path, &content)?;
    tracing::info!(path = %path.display(), ?format, bytes = content.len(), "Report exported");
    Ok(())
}
