//! Artifact export — JSON results and CSV tables.
//!
//! Persisted results carry a `schema_version`; readers refuse versions
//! newer than they understand instead of misreading them.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use rebalab_core::{EquityPoint, RebalanceEvent, SkippedTrade};

use crate::runner::{ComparisonResult, SCHEMA_VERSION};

// ─── JSON ───────────────────────────────────────────────────────────

/// Serialize a result to pretty-printed JSON.
pub fn export_json(result: &ComparisonResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize result to JSON")
}

/// Parse a result back from JSON, refusing future schema versions.
pub fn import_json(json: &str) -> Result<ComparisonResult> {
    let result: ComparisonResult =
        serde_json::from_str(json).context("failed to parse result JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Export an equity curve as CSV.
///
/// Columns: date, total_value, stock_value, cash, ratio
pub fn export_equity_csv(equity: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "total_value", "stock_value", "cash", "ratio"])?;
    for point in equity {
        wtr.write_record([
            point.date.to_string(),
            format!("{:.2}", point.total_value),
            format!("{:.2}", point.stock_value),
            format!("{:.2}", point.cash),
            format!("{:.6}", point.ratio),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the executed trade log as CSV.
///
/// Columns: date, action, amount, price, ratio_before, ratio_after
pub fn export_events_csv(events: &[RebalanceEvent]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "action",
        "amount",
        "price",
        "ratio_before",
        "ratio_after",
    ])?;
    for event in events {
        wtr.write_record([
            event.date.to_string(),
            format!("{:?}", event.action),
            format!("{:.2}", event.amount),
            format!("{:.4}", event.price),
            format!("{:.6}", event.ratio_before),
            format!("{:.6}", event.ratio_after),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export skipped buys as CSV.
///
/// Columns: date, price, required_cash, available_cash
pub fn export_skips_csv(skips: &[SkippedTrade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "price", "required_cash", "available_cash"])?;
    for skip in skips {
        wtr.write_record([
            skip.date.to_string(),
            format!("{:.4}", skip.price),
            format!("{:.2}", skip.required_cash),
            format!("{:.2}", skip.available_cash),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact directories ───────────────────────────────────────────

/// Save the full artifact set for one comparison run.
///
/// Creates `<output_dir>/<first 12 chars of the run ID>/` holding:
///
/// - `summary.json` — the complete [`ComparisonResult`]
/// - `equity.csv` — strategy equity curve
/// - `benchmark.csv` — buy-and-hold equity curve
/// - `events.csv` — executed rebalance trades
/// - `skipped.csv` — buys the cash could not cover
///
/// Returns the run directory path.
pub fn save_artifacts(result: &ComparisonResult, output_dir: &Path) -> Result<PathBuf> {
    // Imported results may carry a run ID shorter than the prefix.
    let short_id: String = result.run_id.chars().take(12).collect();
    let run_dir = output_dir.join(short_id);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create {}", run_dir.display()))?;

    std::fs::write(run_dir.join("summary.json"), export_json(result)?)
        .context("failed to write summary.json")?;
    std::fs::write(
        run_dir.join("equity.csv"),
        export_equity_csv(&result.strategy.equity)?,
    )
    .context("failed to write equity.csv")?;
    std::fs::write(
        run_dir.join("benchmark.csv"),
        export_equity_csv(&result.benchmark)?,
    )
    .context("failed to write benchmark.csv")?;
    std::fs::write(
        run_dir.join("events.csv"),
        export_events_csv(&result.strategy.events)?,
    )
    .context("failed to write events.csv")?;
    std::fs::write(
        run_dir.join("skipped.csv"),
        export_skips_csv(&result.strategy.skipped)?,
    )
    .context("failed to write skipped.csv")?;

    Ok(run_dir)
}

/// Load a result back from an artifact directory.
pub fn load_artifacts(dir: &Path) -> Result<ComparisonResult> {
    let path = dir.join("summary.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
