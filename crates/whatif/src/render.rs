//! Plain-text rendering of engine outputs for the terminal

use std::fmt::Write;

use jiff::Timestamp;
use whatif_core::{
    Category, ComparisonResult, DerivedMetrics, HistoryInfo, ParameterRow, Sensitivity,
    SnapshotInfo, StressSummary, SweepPoint,
};

/// Whole numbers without decimals, everything else to two places
pub fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", number(value))
    } else {
        number(value)
    }
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

pub fn timestamp(ts: Timestamp) -> String {
    ts.strftime("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn parameters(rows: &[ParameterRow]) -> String {
    let width = rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "  {:<width$}  {:>12}  [{} .. {}]  {} ({})",
            row.label,
            number(row.value),
            number(row.min),
            number(row.max),
            row.category,
            row.polarity,
        );
    }
    out
}

pub fn metrics(metrics: &DerivedMetrics) -> String {
    let mut out = String::new();
    for total in metrics.categories.iter().filter(|c| c.count > 0) {
        let _ = write!(out, "  {:<8} {:>12}", total.category.name(), number(total.total));
        if let Some(average) = total.average {
            let _ = write!(out, "  (avg {} over {})", number(average), total.count);
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "  balance  {:>12}  {}",
        signed(metrics.balance),
        metrics.risk
    );
    if let Some(ratio) = metrics.coverage_ratio {
        let _ = writeln!(out, "  coverage {:>12.2}x", ratio);
    }
    out
}

/// One-line status shown after every live change
pub fn status(metrics: &DerivedMetrics) -> String {
    format!("balance {} ({})", signed(metrics.balance), metrics.risk)
}

pub fn snapshots(list: &[SnapshotInfo]) -> String {
    if list.is_empty() {
        return "  (no snapshots)\n".to_string();
    }
    let mut out = String::new();
    for (i, info) in list.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}  saved {}", i + 1, info.name, timestamp(info.saved_at));
    }
    out
}

pub fn history(info: &HistoryInfo) -> String {
    let mut out = format!(
        "  depth {} of {}, redo {}\n",
        info.depth, info.capacity, info.redo_depth
    );
    if let (Some(first), Some(last)) = (info.timestamps.first(), info.timestamps.last()) {
        let _ = writeln!(out, "  oldest {}  latest {}", timestamp(*first), timestamp(*last));
    }
    out
}

pub fn comparison(before: &str, after: &str, result: &ComparisonResult) -> String {
    let mut out = format!("  {before} -> {after}\n");
    if result.is_identical() {
        out.push_str("  (no differences)\n");
    }
    for delta in result.changed() {
        let _ = writeln!(
            out,
            "  {:<16} {:>12} -> {:>12}  ({})",
            delta.key,
            number(delta.before),
            number(delta.after),
            signed(delta.delta)
        );
    }
    let _ = writeln!(
        out,
        "  balance {} -> {} ({}), risk {} -> {}",
        number(result.balance_before),
        number(result.balance_after),
        signed(result.balance_delta),
        result.risk_before,
        result.risk_after
    );
    out
}

pub fn sweep(key: &str, points: &[SweepPoint]) -> String {
    let mut out = format!("  {key}\n");
    for point in points {
        let _ = writeln!(
            out,
            "  {:>12}  balance {:>12}  {}",
            number(point.value),
            signed(point.balance),
            point.risk
        );
    }
    out
}

pub fn sensitivity(ranking: &[Sensitivity]) -> String {
    let mut out = String::new();
    for s in ranking {
        let _ = writeln!(
            out,
            "  {:<16} swing {:>12}  ({} .. {})",
            s.key,
            signed(s.swing),
            number(s.balance_at_min),
            number(s.balance_at_max)
        );
    }
    out
}

pub fn stress(summary: &StressSummary) -> String {
    format!(
        "  {} runs, mean balance {}\n  p5 {}  p50 {}  p95 {}\n  healthy {}  warning {}  critical {}\n",
        summary.iterations,
        number(summary.mean_balance),
        number(summary.percentiles.p5),
        number(summary.percentiles.p50),
        number(summary.percentiles.p95),
        percent(summary.healthy_rate),
        percent(summary.warning_rate),
        percent(summary.critical_rate),
    )
}

/// Lower-case category name used in export keys
pub fn category_key(category: Category) -> String {
    category.name().to_ascii_lowercase()
}
