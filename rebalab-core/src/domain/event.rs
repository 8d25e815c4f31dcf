//! Rebalance trade records.
//!
//! Two record kinds come out of a simulation besides the equity curve:
//!
//! - [`RebalanceEvent`] — a trade that executed, with the portfolio ratio
//!   on both sides of it.
//! - [`SkippedTrade`] — a buy the trigger demanded but cash could not
//!   finance. Skips are reported, never silently dropped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of an executed rebalance trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

/// One executed rebalance trade.
///
/// `amount` is the traded stock value at `price` (always positive);
/// commission and tax are already reflected in the portfolio, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalanceEvent {
    pub date: NaiveDate,
    pub action: TradeAction,
    /// Stock value moved, before frictions.
    pub amount: f64,
    pub price: f64,
    pub ratio_before: f64,
    pub ratio_after: f64,
}

/// A triggered buy that the available cash could not cover.
///
/// The portfolio is left untouched and trigger memory does not advance,
/// so the same condition can fire again on a later period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedTrade {
    pub date: NaiveDate,
    pub price: f64,
    /// Cash the buy would have needed, commission included.
    pub required_cash: f64,
    pub available_cash: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_serializes_screaming_snake() {
        assert_eq!(serde_json::to_string(&TradeAction::Buy).unwrap(), "\"BUY\"");
        assert_eq!(
            serde_json::to_string(&TradeAction::Sell).unwrap(),
            "\"SELL\""
        );
    }

    #[test]
    fn event_roundtrip() {
        let event = RebalanceEvent {
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            action: TradeAction::Sell,
            amount: 125_000.0,
            price: 200.0,
            ratio_before: 2.0 / 3.0,
            ratio_after: 0.5,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: RebalanceEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn skipped_trade_roundtrip() {
        let skip = SkippedTrade {
            date: NaiveDate::from_ymd_opt(2024, 3, 16).unwrap(),
            price: 1.5,
            required_cash: 5_001.9,
            available_cash: 5_000.0,
        };
        let json = serde_json::to_string(&skip).unwrap();
        let back: SkippedTrade = serde_json::from_str(&json).unwrap();
        assert_eq!(back, skip);
    }
}
