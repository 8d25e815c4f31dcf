//! Rebalance trigger policies.
//!
//! A policy looks at one period (price + current holdings) and answers a
//! single question: does the portfolio get pulled back to its target
//! allocation today? Three policies ship:
//!
//! - [`TriggerSpec::RelativeDeviation`] fires when the allocation drifts
//!   from target by a fraction OF the target.
//! - [`TriggerSpec::AbsoluteOffset`] fires when the allocation drifts from
//!   target by an absolute number of ratio points.
//! - [`TriggerSpec::PriceChange`] fires when the price has moved enough
//!   since the last executed rebalance, regardless of allocation.
//!
//! Policies never fire on the first period. The first period is where
//! the position is built, so there is no drift to correct yet and the
//! price-change reference has only just been set.

use serde::{Deserialize, Serialize};

use crate::domain::PortfolioState;
use crate::error::BacktestError;

// ─── Configuration ───────────────────────────────────────────────────

/// Trigger policy configuration (serializable enum).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerSpec {
    /// Fire when |ratio - target| / target >= threshold.
    RelativeDeviation { threshold: f64 },

    /// Fire when |ratio - target| >= threshold.
    AbsoluteOffset { threshold: f64 },

    /// Fire when price has moved by >= threshold since the last executed
    /// rebalance (or since the initial position).
    PriceChange { threshold: f64 },
}

impl Default for TriggerSpec {
    /// Relative deviation at 50% of target, the setting the original
    /// study of this strategy used.
    fn default() -> Self {
        Self::RelativeDeviation { threshold: 0.5 }
    }
}

impl TriggerSpec {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RelativeDeviation { .. } => "relative_deviation",
            Self::AbsoluteOffset { .. } => "absolute_offset",
            Self::PriceChange { .. } => "price_change",
        }
    }

    pub fn threshold(&self) -> f64 {
        match self {
            Self::RelativeDeviation { threshold }
            | Self::AbsoluteOffset { threshold }
            | Self::PriceChange { threshold } => *threshold,
        }
    }
}

// ─── Runtime policy ──────────────────────────────────────────────────

/// What the policy decided for one period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerDecision {
    pub fires: bool,
    /// Stock value the portfolio should hold after rebalancing, at this
    /// period's price. Valid whether or not the trigger fired.
    pub target_stock_value: f64,
}

/// A [`TriggerSpec`] bound to a target ratio, ready to run.
///
/// `PriceChange` carries memory (the price of the last executed
/// rebalance), so the simulator owns one policy per run and drives it
/// through [`TriggerPolicy::decide`] and
/// [`TriggerPolicy::on_trade_executed`].
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerPolicy {
    RelativeDeviation {
        target_ratio: f64,
        threshold: f64,
    },
    AbsoluteOffset {
        target_ratio: f64,
        threshold: f64,
    },
    PriceChange {
        target_ratio: f64,
        threshold: f64,
        /// Price at the last executed rebalance. Seeded on the first
        /// period, advanced only when a trade actually fills.
        last_rebalance_price: Option<f64>,
    },
}

impl TriggerPolicy {
    /// Bind a spec to a target ratio. Rejects thresholds that could
    /// never gate anything sensibly (non-finite, zero, negative).
    pub fn from_spec(spec: &TriggerSpec, target_ratio: f64) -> Result<Self, BacktestError> {
        let threshold = spec.threshold();
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(BacktestError::invalid(
                "threshold",
                format!("must be a finite positive number, got {threshold}"),
            ));
        }
        Ok(match spec {
            TriggerSpec::RelativeDeviation { .. } => Self::RelativeDeviation {
                target_ratio,
                threshold,
            },
            TriggerSpec::AbsoluteOffset { .. } => Self::AbsoluteOffset {
                target_ratio,
                threshold,
            },
            TriggerSpec::PriceChange { .. } => Self::PriceChange {
                target_ratio,
                threshold,
                last_rebalance_price: None,
            },
        })
    }

    fn target_ratio(&self) -> f64 {
        match self {
            Self::RelativeDeviation { target_ratio, .. }
            | Self::AbsoluteOffset { target_ratio, .. }
            | Self::PriceChange { target_ratio, .. } => *target_ratio,
        }
    }

    /// Evaluate one period. Must be called for every period in order,
    /// starting at 0, so price-change memory is seeded correctly.
    pub fn decide(
        &mut self,
        period: usize,
        price: f64,
        portfolio: &PortfolioState,
    ) -> TriggerDecision {
        let target_stock_value = portfolio.total_value(price) * self.target_ratio();

        if period == 0 {
            // The initial position is built here; nothing to correct.
            if let Self::PriceChange {
                last_rebalance_price,
                ..
            } = self
            {
                *last_rebalance_price = Some(price);
            }
            return TriggerDecision {
                fires: false,
                target_stock_value,
            };
        }

        let fires = match self {
            Self::RelativeDeviation {
                target_ratio,
                threshold,
            } => {
                let ratio = portfolio.current_ratio(price);
                ((ratio - *target_ratio).abs() / *target_ratio) >= *threshold
            }
            Self::AbsoluteOffset {
                target_ratio,
                threshold,
            } => {
                let ratio = portfolio.current_ratio(price);
                (ratio - *target_ratio).abs() >= *threshold
            }
            Self::PriceChange {
                threshold,
                last_rebalance_price,
                ..
            } => match last_rebalance_price {
                Some(reference) => (price / *reference - 1.0).abs() >= *threshold,
                None => false,
            },
        };

        TriggerDecision {
            fires,
            target_stock_value,
        }
    }

    /// Notify the policy that a rebalance trade filled at `price`.
    ///
    /// Skipped trades do NOT reach this method, so a buy the cash could
    /// not cover leaves the price-change reference where it was.
    pub fn on_trade_executed(&mut self, price: f64) {
        if let Self::PriceChange {
            last_rebalance_price,
            ..
        } = self
        {
            *last_rebalance_price = Some(price);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portfolio(shares: f64, cash: f64) -> PortfolioState {
        PortfolioState { shares, cash }
    }

    #[test]
    fn spec_default_is_relative_half() {
        let spec = TriggerSpec::default();
        assert_eq!(spec.name(), "relative_deviation");
        assert_eq!(spec.threshold(), 0.5);
    }

    #[test]
    fn spec_serializes_with_screaming_tag() {
        let spec = TriggerSpec::PriceChange { threshold: 0.1 };
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, r#"{"type":"PRICE_CHANGE","threshold":0.1}"#);
        let back: TriggerSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn from_spec_rejects_bad_thresholds() {
        for bad in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let spec = TriggerSpec::RelativeDeviation { threshold: bad };
            assert!(TriggerPolicy::from_spec(&spec, 0.5).is_err());
        }
    }

    #[test]
    fn never_fires_on_first_period() {
        // Allocation grossly off target on purpose.
        let state = portfolio(10_000.0, 0.0);
        for spec in [
            TriggerSpec::RelativeDeviation { threshold: 0.01 },
            TriggerSpec::AbsoluteOffset { threshold: 0.01 },
            TriggerSpec::PriceChange { threshold: 0.01 },
        ] {
            let mut policy = TriggerPolicy::from_spec(&spec, 0.5).unwrap();
            let decision = policy.decide(0, 100.0, &state);
            assert!(!decision.fires, "{} fired on period 0", spec.name());
        }
    }

    #[test]
    fn relative_deviation_scales_with_target() {
        // ratio = 2/3, target = 0.5, relative deviation = (1/6)/(1/2) = 1/3
        let state = portfolio(5_000.0, 250_000.0); // at price 100: 500k stock, 250k cash
        let spec = TriggerSpec::RelativeDeviation { threshold: 0.3 };
        let mut policy = TriggerPolicy::from_spec(&spec, 0.5).unwrap();
        assert!(policy.decide(1, 100.0, &state).fires);

        let spec = TriggerSpec::RelativeDeviation { threshold: 0.34 };
        let mut policy = TriggerPolicy::from_spec(&spec, 0.5).unwrap();
        assert!(!policy.decide(1, 100.0, &state).fires);
    }

    #[test]
    fn absolute_offset_ignores_target_scale() {
        // Same state: ratio 2/3, absolute offset = 1/6 ≈ 0.1667
        let state = portfolio(5_000.0, 250_000.0);
        let spec = TriggerSpec::AbsoluteOffset { threshold: 0.16 };
        let mut policy = TriggerPolicy::from_spec(&spec, 0.5).unwrap();
        assert!(policy.decide(1, 100.0, &state).fires);

        let spec = TriggerSpec::AbsoluteOffset { threshold: 0.17 };
        let mut policy = TriggerPolicy::from_spec(&spec, 0.5).unwrap();
        assert!(!policy.decide(1, 100.0, &state).fires);
    }

    #[test]
    fn price_change_measures_from_last_fill() {
        let state = portfolio(5_000.0, 500_000.0);
        let spec = TriggerSpec::PriceChange { threshold: 0.5 };
        let mut policy = TriggerPolicy::from_spec(&spec, 0.5).unwrap();

        policy.decide(0, 100.0, &state); // seeds reference at 100
        assert!(!policy.decide(1, 140.0, &state).fires); // +40%
        assert!(policy.decide(2, 160.0, &state).fires); // +60%

        // Reference advances only on execution.
        policy.on_trade_executed(160.0);
        assert!(!policy.decide(3, 200.0, &state).fires); // +25% from 160
    }

    #[test]
    fn price_change_reference_survives_skipped_fills() {
        let state = portfolio(5_000.0, 500_000.0);
        let spec = TriggerSpec::PriceChange { threshold: 0.5 };
        let mut policy = TriggerPolicy::from_spec(&spec, 0.5).unwrap();

        policy.decide(0, 100.0, &state);
        assert!(policy.decide(1, 160.0, &state).fires);
        // No on_trade_executed call: the trade was skipped.
        assert!(policy.decide(2, 161.0, &state).fires);
    }

    #[test]
    fn decision_reports_target_stock_value() {
        let state = portfolio(5_000.0, 250_000.0);
        let spec = TriggerSpec::AbsoluteOffset { threshold: 0.9 };
        let mut policy = TriggerPolicy::from_spec(&spec, 0.5).unwrap();
        let decision = policy.decide(1, 100.0, &state);
        assert!(!decision.fires);
        assert_eq!(decision.target_stock_value, 375_000.0);
    }
}
