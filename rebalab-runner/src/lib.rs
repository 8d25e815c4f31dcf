//! Rebalab Runner — orchestration around the rebalancing engine.
//!
//! This crate builds on `rebalab-core` to provide:
//! - TOML run configuration with content-addressed run IDs
//! - Price feeds: CSV directories and deterministic synthetic walks
//! - The comparison runner (strategy vs buy-and-hold, batched in parallel)
//! - Artifact export: JSON summary plus CSV tables per run

pub mod config;
pub mod feeds;
pub mod report;
pub mod runner;

pub use config::{BacktestSection, ConfigError, CostsSection, RunConfig, RunId};
pub use feeds::{CsvFeed, SyntheticFeed};
pub use report::{
    export_equity_csv, export_events_csv, export_json, export_skips_csv, import_json,
    load_artifacts, save_artifacts,
};
pub use runner::{run_comparison, run_comparisons, ComparisonResult, RunError, SCHEMA_VERSION};
