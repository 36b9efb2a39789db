//! Reporting and export — JSON and CSV artifacts.
//!
//! - **JSON**: full round-trip serialization of a `RunReport` with schema versioning
//! - **CSV**: trade tape and equity/drawdown curve for external analysis tools
//!
//! Unknown schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat};

use perpsim_core::domain::Trade;

use crate::runner::{RunReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize RunReport to JSON")
}

/// Deserialize a `RunReport`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunReport> {
    let report: RunReport =
        serde_json::from_str(json).context("failed to deserialize RunReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// RFC 3339 rendering of unix milliseconds; the raw number if out of range.
pub fn format_timestamp(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| ms.to_string())
}

/// Columns: type, entry_date, exit_date, entry_price, exit_price, size,
/// commission, profit, profit_percent, exit_reason
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "type",
        "entry_date",
        "exit_date",
        "entry_price",
        "exit_price",
        "size",
        "commission",
        "profit",
        "profit_percent",
        "exit_reason",
    ])?;

    for t in trades {
        let direction = serde_json::to_value(t.direction)?;
        let reason = serde_json::to_value(t.exit_reason)?;
        wtr.write_record(&[
            direction.as_str().unwrap_or_default().to_string(),
            format_timestamp(t.entry_date),
            format_timestamp(t.exit_date),
            format!("{:.6}", t.entry_price),
            format!("{:.6}", t.exit_price),
            format!("{:.6}", t.size),
            format!("{:.4}", t.commission),
            format!("{:.4}", t.profit),
            format!("{:.4}", t.profit_percent),
            reason.as_str().unwrap_or_default().to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Columns: index, equity, drawdown_pct. Index 0 is the starting capital.
pub fn export_equity_csv(equity: &[f64], drawdown: &[f64]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["index", "equity", "drawdown_pct"])?;
    for (i, eq) in equity.iter().enumerate() {
        let dd = drawdown.get(i).copied().unwrap_or(0.0);
        wtr.write_record(&[i.to_string(), format!("{:.2}", eq), format!("{:.4}", dd)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one run.
///
/// Creates `{name}_{run_id prefix}/` under `output_dir` containing:
/// - `report.json`: the full `RunReport`
/// - `trades.csv`: trade tape
/// - `equity.csv`: equity and drawdown curve
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &RunReport, output_dir: &Path) -> Result<PathBuf> {
    let stem = if report.name.is_empty() { "run" } else { report.name.as_str() };
    let prefix = report.run_id.get(..12).unwrap_or(&report.run_id);
    let run_dir = output_dir.join(format!("{stem}_{prefix}"));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)
        .context("failed to write report.json")?;
    std::fs::write(run_dir.join("trades.csv"), export_trades_csv(&report.result.trades)?)
        .context("failed to write trades.csv")?;
    std::fs::write(
        run_dir.join("equity.csv"),
        export_equity_csv(&report.result.equity, &report.result.drawdown)?,
    )
    .context("failed to write equity.csv")?;

    Ok(run_dir)
}
