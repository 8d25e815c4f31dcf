//! Buy-and-hold benchmark projection.
//!
//! The yardstick the strategy is measured against: put everything into
//! the benchmark instrument on day one, pay entry commission, never
//! touch it again. No trigger, no events, no cash leg.

use crate::domain::{EquityPoint, PricePoint};
use crate::error::BacktestError;

/// Project a full-investment position held across the whole series.
///
/// Same input contract as the simulator: `points` is alignment output,
/// and an empty slice yields an empty curve.
pub fn run_buy_hold(
    points: &[PricePoint],
    init_cash: f64,
    commission_rate: f64,
) -> Result<Vec<EquityPoint>, BacktestError> {
    if !init_cash.is_finite() || init_cash <= 0.0 {
        return Err(BacktestError::invalid(
            "init_cash",
            format!("must be a finite positive number, got {init_cash}"),
        ));
    }
    if !commission_rate.is_finite() || !(0.0..1.0).contains(&commission_rate) {
        return Err(BacktestError::invalid(
            "commission_rate",
            "must be in [0, 1)",
        ));
    }

    let Some(first) = points.first() else {
        return Ok(Vec::new());
    };

    let shares = init_cash * (1.0 - commission_rate) / first.price;

    Ok(points
        .iter()
        .map(|point| {
            let stock_value = shares * point.price;
            EquityPoint {
                date: point.date,
                total_value: stock_value,
                stock_value,
                cash: 0.0,
                ratio: 1.0,
            }
        })
        .collect())
}
