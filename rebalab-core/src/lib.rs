//! Rebalab Core — the rebalancing backtest engine.
//!
//! This crate contains the heart of the system:
//! - Domain types (price points, portfolio state, rebalance events, equity points)
//! - Pair alignment of two daily price series to their common valid dates
//! - Pluggable trigger policies (relative deviation, absolute offset, price change)
//! - The day-by-day rebalance simulator with commission/tax fills
//! - Buy-and-hold benchmark projection
//! - Performance analyzer (total return, CAGR, max drawdown, Sharpe)
//! - Price feed trait for data sources

pub mod align;
pub mod analyze;
pub mod benchmark;
pub mod domain;
pub mod error;
pub mod feed;
pub mod simulate;
pub mod trigger;

pub use align::{align_pair, AlignedPair, MIN_ALIGNED_POINTS};
pub use analyze::{analyze, PerformanceSummary};
pub use benchmark::run_buy_hold;
pub use domain::{
    EquityPoint, PortfolioState, PricePoint, PriceSeries, RebalanceEvent, SkippedTrade,
    TradeAction,
};
pub use error::BacktestError;
pub use feed::{FeedError, PriceFeed};
pub use simulate::{run_rebalance, BacktestParams, StrategyRun};
pub use trigger::{TriggerDecision, TriggerPolicy, TriggerSpec};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: all engine types are Send + Sync.
    ///
    /// Runs over shared immutable series execute in parallel in the runner,
    /// so every type crossing that boundary must satisfy this. If any type
    /// fails the check, the build breaks immediately.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::PricePoint>();
        require_sync::<domain::PricePoint>();
        require_send::<domain::PriceSeries>();
        require_sync::<domain::PriceSeries>();
        require_send::<domain::PortfolioState>();
        require_sync::<domain::PortfolioState>();
        require_send::<domain::RebalanceEvent>();
        require_sync::<domain::RebalanceEvent>();
        require_send::<domain::SkippedTrade>();
        require_sync::<domain::SkippedTrade>();
        require_send::<domain::EquityPoint>();
        require_sync::<domain::EquityPoint>();

        // Alignment
        require_send::<align::AlignedPair>();
        require_sync::<align::AlignedPair>();

        // Trigger types
        require_send::<trigger::TriggerSpec>();
        require_sync::<trigger::TriggerSpec>();
        require_send::<trigger::TriggerPolicy>();
        require_sync::<trigger::TriggerPolicy>();

        // Simulation types
        require_send::<simulate::BacktestParams>();
        require_sync::<simulate::BacktestParams>();
        require_send::<simulate::StrategyRun>();
        require_sync::<simulate::StrategyRun>();

        // Analysis
        require_send::<analyze::PerformanceSummary>();
        require_sync::<analyze::PerformanceSummary>();

        // Errors
        require_send::<error::BacktestError>();
        require_sync::<error::BacktestError>();
    }

    /// Architecture contract: trigger policies do NOT mutate portfolio state.
    ///
    /// `decide()` takes `&PortfolioState`: a policy can read the allocation,
    /// but only the simulator moves cash and shares. If someone changes the
    /// parameter to `&mut`, this test breaks loudly.
    #[test]
    fn trigger_decide_cannot_mutate_portfolio() {
        fn _check_signature(
            policy: &mut TriggerPolicy,
            portfolio: &PortfolioState,
        ) -> TriggerDecision {
            policy.decide(1, 100.0, portfolio)
        }
    }
}
