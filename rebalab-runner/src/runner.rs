//! Comparison runner — wires feeds, alignment, engine, and analysis.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rebalab_core::{
    align_pair, analyze, run_buy_hold, run_rebalance, BacktestError, EquityPoint, FeedError,
    PerformanceSummary, PriceFeed, PriceSeries, StrategyRun,
};

use crate::config::{ConfigError, RunConfig, RunId};

/// Current schema version for persisted results.
///
/// Bump on breaking changes to [`ComparisonResult`]; readers refuse
/// anything newer than they understand.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Errors from running a comparison.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),
}

/// Complete record of one strategy-versus-benchmark comparison.
///
/// Self-contained: the config that produced it, a hash of the exact
/// data it ran on, both equity curves, and both summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    /// BLAKE3 fingerprint of the aligned pair the run consumed.
    pub dataset_hash: String,
    pub config: RunConfig,
    pub strategy: StrategyRun,
    pub strategy_summary: PerformanceSummary,
    pub benchmark: Vec<EquityPoint>,
    pub benchmark_summary: PerformanceSummary,
}

/// Run one full comparison.
///
/// Fetches both symbols over the configured window, aligns them to
/// their shared valid sessions, simulates the rebalanced strategy on
/// the leveraged series, projects buy-and-hold on the benchmark
/// series, and analyzes both curves from the same starting capital.
pub fn run_comparison(
    config: &RunConfig,
    feed: &dyn PriceFeed,
) -> Result<ComparisonResult, RunError> {
    config.validate()?;
    let params = config.params();
    let backtest = &config.backtest;

    let leveraged = PriceSeries::new(
        backtest.leveraged_symbol.clone(),
        feed.fetch(
            &backtest.leveraged_symbol,
            backtest.start_date,
            backtest.end_date,
        )?,
    );
    let benchmark = PriceSeries::new(
        backtest.benchmark_symbol.clone(),
        feed.fetch(
            &backtest.benchmark_symbol,
            backtest.start_date,
            backtest.end_date,
        )?,
    );

    let pair = align_pair(leveraged, benchmark)?;
    let dataset_hash = pair.fingerprint();

    let strategy = run_rebalance(&pair.leveraged.points, &params, &config.trigger)?;
    let benchmark_curve = run_buy_hold(
        &pair.benchmark.points,
        params.init_cash,
        params.commission_rate,
    )?;

    let strategy_summary = analyze(&strategy.equity, params.init_cash);
    let benchmark_summary = analyze(&benchmark_curve, params.init_cash);

    Ok(ComparisonResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        dataset_hash,
        config: config.clone(),
        strategy,
        strategy_summary,
        benchmark: benchmark_curve,
        benchmark_summary,
    })
}

/// Run a batch of comparisons in parallel.
///
/// Each config gets its own result slot: one failed run never aborts
/// the rest of the batch.
pub fn run_comparisons(
    configs: &[RunConfig],
    feed: &dyn PriceFeed,
) -> Vec<Result<ComparisonResult, RunError>> {
    configs
        .par_iter()
        .map(|config| run_comparison(config, feed))
        .collect()
}
