//! Export — JSON report and CSV signal table.

use anyhow::{Context, Result};
use fearlab_core::domain::SignalEvent;
use fearlab_core::QueryReport;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a full `QueryReport` to pretty JSON.
pub fn export_json(report: &QueryReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize QueryReport to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export signal events as CSV. Pending returns are empty cells.
///
/// Columns: date, primary, secondary, six_month_return_pct, twelve_month_return_pct
pub fn export_signals_csv(events: &[SignalEvent]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date",
        "primary",
        "secondary",
        "six_month_return_pct",
        "twelve_month_return_pct",
    ])?;

    for e in events {
        wtr.write_record([
            &e.date.to_string(),
            &format!("{:.2}", e.primary_at_signal),
            &format!("{:.2}", e.secondary_at_signal),
            &optional_pct(e.six_month_return),
            &optional_pct(e.twelve_month_return),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn optional_pct(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}
