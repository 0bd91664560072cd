//! Human-readable session and summary reports

use crate::analysis::aggregate::{GroupKey, Summary, aggregate, format_percent, format_value};
use crate::io::configuration::{NO_DATA, REPORT_TIME_FORMAT, SUMMARY_DECIMALS};
use crate::session::trial::{Category, Direction, Session};
use std::fmt::Write;

const SESSION_LINES: [(&str, GroupKey); 5] = [
    ("Total", GroupKey::Overall),
    ("Hand", GroupKey::Category(Category::Hands)),
    ("Foot", GroupKey::Category(Category::Feet)),
    ("Left", GroupKey::Side(Direction::Left)),
    ("Right", GroupKey::Side(Direction::Right)),
];

/// Describe one session: when it ran, pain level, duration and accuracy per group
pub fn session_report(session: &Session) -> String {
    let summary = aggregate(&session.trials);
    let overall = summary.overall();
    let mut out = String::new();

    let started = session.header.as_ref().map_or_else(
        || "without session header".to_string(),
        |h| h.started.format(REPORT_TIME_FORMAT).to_string(),
    );
    let _ = writeln!(
        out,
        "Run {started} - {:.3} seconds for {} images",
        session.duration().as_secs_f64(),
        overall.n
    );

    if let Some(header) = &session.header {
        let pain = header
            .pain_level
            .map_or_else(|| "not recorded".to_string(), |p| p.to_string());
        let _ = writeln!(out, "Pain level: {pain}");
    }

    for (label, key) in SESSION_LINES {
        let stats = summary.get(key);
        let _ = writeln!(
            out,
            "{label} accuracy: {}/{} {}",
            stats.n_correct,
            stats.n,
            format_percent(stats.accuracy)
        );
    }

    let average = overall
        .mean_latency
        .map_or_else(|| NO_DATA.to_string(), |v| format!("{v:.2} seconds"));
    let _ = writeln!(out, "Average time per image: {average}");

    out
}

/// Tabulate every group of a summary
pub fn summary_table(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>5} {:>9} {:>9} {:>9} {:>9}",
        "group", "n", "correct", "accuracy", "mean", "median"
    );

    for (key, stats) in summary.groups() {
        let _ = writeln!(
            out,
            "{:<12} {:>5} {:>9} {:>9} {:>9} {:>9}",
            key.to_string(),
            stats.n,
            stats.n_correct,
            format_value(stats.accuracy, SUMMARY_DECIMALS),
            format_value(stats.mean_latency, SUMMARY_DECIMALS),
            format_value(stats.median_latency, SUMMARY_DECIMALS),
        );
    }

    out
}
