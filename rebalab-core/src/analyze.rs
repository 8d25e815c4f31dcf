//! Performance analysis — pure functions over an equity curve.
//!
//! Every metric is a pure function: equity points in, scalar out. No
//! dependency on the simulator or the trigger machinery, so strategy
//! and benchmark curves go through the identical arithmetic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::EquityPoint;

/// Trading days per year used for annualization.
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annual risk-free rate subtracted in the Sharpe numerator.
const RISK_FREE_RATE: f64 = 0.015;

/// Calendar days per year for CAGR. The curve spans calendar dates, not
/// trading-day indices, so CAGR annualizes over elapsed calendar time.
const DAYS_PER_YEAR: f64 = 365.0;

/// Headline statistics for one equity curve.
///
/// Percentages are stored as percentages (10.0 means +10%), matching
/// how they are printed and exported.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub final_value: f64,
    pub total_return_pct: f64,
    pub cagr_pct: f64,
    /// Largest peak-to-trough loss, as a positive percentage.
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
}

/// Compute all statistics for an equity curve started from `init_cash`.
///
/// An empty curve yields an all-zero summary so callers can render a
/// report for a run that produced nothing.
pub fn analyze(equity: &[EquityPoint], init_cash: f64) -> PerformanceSummary {
    let (Some(first), Some(last)) = (equity.first(), equity.last()) else {
        return PerformanceSummary::default();
    };
    let final_value = last.total_value;
    if init_cash <= 0.0 {
        return PerformanceSummary {
            final_value,
            ..PerformanceSummary::default()
        };
    }

    let values: Vec<f64> = equity.iter().map(|p| p.total_value).collect();

    PerformanceSummary {
        final_value,
        total_return_pct: (final_value / init_cash - 1.0) * 100.0,
        cagr_pct: cagr_pct(first.date, last.date, init_cash, final_value),
        max_drawdown_pct: max_drawdown_pct(&values),
        sharpe_ratio: sharpe_ratio(&values),
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Compound annual growth rate as a percentage.
///
/// Annualizes over elapsed calendar days. A same-day span counts as one
/// year so a single-point curve reports its plain return.
pub fn cagr_pct(start: NaiveDate, end: NaiveDate, init_cash: f64, final_value: f64) -> f64 {
    if init_cash <= 0.0 || final_value <= 0.0 {
        return 0.0;
    }
    let days = (end - start).num_days();
    let years = if days <= 0 {
        1.0
    } else {
        days as f64 / DAYS_PER_YEAR
    };
    ((final_value / init_cash).powf(1.0 / years) - 1.0) * 100.0
}

/// Maximum drawdown as a positive percentage (18.18 means a 18.18% dip).
///
/// Returns 0.0 for constant or monotonically increasing curves.
pub fn max_drawdown_pct(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mut peak = values[0];
    let mut max_dd = 0.0_f64;

    for &value in values {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = (peak - value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd * 100.0
}

/// Annualized Sharpe ratio from daily returns.
///
/// Sharpe = (mean(daily) * 252 - rf) / (std(daily) * sqrt(252)) with a
/// 1.5% annual risk-free rate. Returns 0.0 if variance is zero or the
/// curve has fewer than 3 points.
pub fn sharpe_ratio(values: &[f64]) -> f64 {
    let returns = daily_returns(values);
    if returns.len() < 2 {
        return 0.0;
    }
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    let annual_return = mean_f64(&returns) * TRADING_DAYS_PER_YEAR;
    let annual_vol = std * TRADING_DAYS_PER_YEAR.sqrt();
    (annual_return - RISK_FREE_RATE) / annual_vol
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Compute daily returns from a value curve.
pub fn daily_returns(values: &[f64]) -> Vec<f64> {
    if values.len() < 2 {
        return Vec::new();
    }
    values
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
