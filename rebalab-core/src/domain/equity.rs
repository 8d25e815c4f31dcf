//! Equity curve samples.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::portfolio::PortfolioState;

/// One period of the equity curve: the portfolio valued at that day's
/// close. `total_value` is always the exact sum `stock_value + cash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub total_value: f64,
    pub stock_value: f64,
    pub cash: f64,
    /// Stock share of total value; 0.0 when the portfolio is worthless.
    pub ratio: f64,
}

impl EquityPoint {
    /// Value `portfolio` at `price` on `date`.
    pub fn snapshot(date: NaiveDate, portfolio: &PortfolioState, price: f64) -> Self {
        let stock_value = portfolio.stock_value(price);
        Self {
            date,
            total_value: stock_value + portfolio.cash,
            stock_value,
            cash: portfolio.cash,
            ratio: portfolio.current_ratio(price),
        }
    }
}
