//! Portfolio state — shares of the instrument plus idle cash.

use serde::{Deserialize, Serialize};

/// Mutable holdings owned exclusively by the simulator during a run.
///
/// Two invariants hold at every period after construction: `cash >= 0.0`
/// (a buy executes only when fully financed) and `shares >= 0.0` (sells
/// never exceed the held quantity). Derived values take the current price
/// because holdings alone carry no valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub shares: f64,
    pub cash: f64,
}

impl PortfolioState {
    /// Seed the initial position: `target_ratio` of the capital goes into
    /// the instrument at `price`, the rest stays as cash. Entry friction
    /// shows up as fewer shares, not as a logged trade.
    pub fn seed(init_cash: f64, target_ratio: f64, price: f64, commission_rate: f64) -> Self {
        Self {
            shares: init_cash * target_ratio * (1.0 - commission_rate) / price,
            cash: init_cash * (1.0 - target_ratio),
        }
    }

    pub fn stock_value(&self, price: f64) -> f64 {
        self.shares * price
    }

    /// Total value = stock value + cash.
    pub fn total_value(&self, price: f64) -> f64 {
        self.stock_value(price) + self.cash
    }

    /// Fraction of total value held in the instrument. Returns 0.0 for a
    /// valueless portfolio rather than NaN.
    pub fn current_ratio(&self, price: f64) -> f64 {
        let total = self.total_value(price);
        if total > 0.0 {
            self.stock_value(price) / total
        } else {
            0.0
        }
    }
}
