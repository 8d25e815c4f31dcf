//! Rebalab CLI — run, compare, and demo commands.
//!
//! Commands:
//! - `run` — one comparison from a TOML config (or built-in defaults)
//! - `compare` — several configs side by side, in parallel
//! - `demo` — the default pairing on deterministic synthetic data

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use rebalab_core::{PerformanceSummary, PriceFeed};
use rebalab_runner::{
    export_json, run_comparison, run_comparisons, save_artifacts, ComparisonResult, CsvFeed,
    RunConfig, SyntheticFeed,
};

#[derive(Parser)]
#[command(
    name = "rebalab",
    about = "Rebalab CLI — threshold-rebalancing backtest engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one strategy-versus-benchmark comparison.
    Run {
        /// Path to a TOML config file. Without it, built-in defaults run.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory holding one <symbol>.csv per instrument.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Use the synthetic feed instead of CSV files.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Seed for the synthetic feed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Print the full result JSON to stdout.
        #[arg(long, default_value_t = false)]
        print_json: bool,
    },
    /// Run several configs side by side and print a comparison table.
    Compare {
        /// TOML config files, one run each.
        #[arg(required = true)]
        configs: Vec<PathBuf>,

        /// Directory holding one <symbol>.csv per instrument.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Use the synthetic feed instead of CSV files.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Seed for the synthetic feed.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Run the default pairing on synthetic data. No files needed.
    Demo {
        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Seed for the synthetic feed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Start date (YYYY-MM-DD). Defaults to 2015-01-01.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to 2024-12-31.
        #[arg(long)]
        end: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            data_dir,
            output_dir,
            synthetic,
            seed,
            print_json,
        } => run_cmd(config, data_dir, output_dir, synthetic, seed, print_json),
        Commands::Compare {
            configs,
            data_dir,
            output_dir,
            synthetic,
            seed,
        } => compare_cmd(configs, data_dir, output_dir, synthetic, seed),
        Commands::Demo {
            output_dir,
            seed,
            start,
            end,
        } => demo_cmd(output_dir, seed, start, end),
    }
}

fn build_feed(data_dir: &Path, synthetic: bool, seed: u64) -> Box<dyn PriceFeed> {
    if synthetic {
        Box::new(SyntheticFeed::new(seed))
    } else {
        Box::new(CsvFeed::new(data_dir))
    }
}

fn run_cmd(
    config_path: Option<PathBuf>,
    data_dir: PathBuf,
    output_dir: PathBuf,
    synthetic: bool,
    seed: u64,
    print_json: bool,
) -> Result<()> {
    let config = match config_path {
        Some(path) => RunConfig::from_file(&path)?,
        None => RunConfig::default(),
    };

    let feed = build_feed(&data_dir, synthetic, seed);
    let result = run_comparison(&config, feed.as_ref())?;

    print_summary(&result, feed.name());
    if synthetic {
        println!("WARNING: results based on SYNTHETIC data");
        println!();
    }

    if print_json {
        println!("{}", export_json(&result)?);
    }

    let run_dir = save_artifacts(&result, &output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());

    Ok(())
}

fn compare_cmd(
    config_paths: Vec<PathBuf>,
    data_dir: PathBuf,
    output_dir: PathBuf,
    synthetic: bool,
    seed: u64,
) -> Result<()> {
    let mut configs = Vec::with_capacity(config_paths.len());
    for path in &config_paths {
        configs.push(RunConfig::from_file(path)?);
    }

    let feed = build_feed(&data_dir, synthetic, seed);
    let results = run_comparisons(&configs, feed.as_ref());

    println!();
    println!(
        "{:<14} {:<28} {:>9} {:>9} {:>8} {:>7} {:>7}",
        "Run", "Trigger", "Return%", "Bench%", "Sharpe", "Trades", "Skips"
    );
    println!("{}", "-".repeat(87));

    let mut failures = 0;
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(result) => {
                let trigger = format!(
                    "{} ({})",
                    result.config.trigger.name(),
                    result.config.trigger.threshold()
                );
                println!(
                    "{:<14} {:<28} {:>9.2} {:>9.2} {:>8.3} {:>7} {:>7}",
                    result.run_id.chars().take(12).collect::<String>(),
                    trigger,
                    result.strategy_summary.total_return_pct,
                    result.benchmark_summary.total_return_pct,
                    result.strategy_summary.sharpe_ratio,
                    result.strategy.events.len(),
                    result.strategy.skipped.len(),
                );
                save_artifacts(result, &output_dir)?;
            }
            Err(err) => {
                failures += 1;
                eprintln!("Error for {}: {err}", config_paths[i].display());
            }
        }
    }

    println!();
    println!("Artifacts saved to: {}", output_dir.display());

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn demo_cmd(
    output_dir: PathBuf,
    seed: u64,
    start: Option<String>,
    end: Option<String>,
) -> Result<()> {
    let mut config = RunConfig::default();
    if let Some(start) = start.as_deref() {
        config.backtest.start_date = NaiveDate::parse_from_str(start, "%Y-%m-%d")?;
    }
    if let Some(end) = end.as_deref() {
        config.backtest.end_date = NaiveDate::parse_from_str(end, "%Y-%m-%d")?;
    }

    let feed = SyntheticFeed::new(seed);
    let result = run_comparison(&config, &feed)?;

    print_summary(&result, feed.name());
    println!("WARNING: results based on SYNTHETIC data");
    println!();

    let run_dir = save_artifacts(&result, &output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());

    Ok(())
}

fn print_summary(result: &ComparisonResult, feed_name: &str) {
    let backtest = &result.config.backtest;

    println!();
    println!("=== Comparison Result ===");
    println!(
        "Run ID:         {}",
        result.run_id.chars().take(12).collect::<String>()
    );
    println!("Feed:           {feed_name}");
    println!(
        "Symbols:        {} vs {}",
        backtest.leveraged_symbol, backtest.benchmark_symbol
    );
    if let (Some(first), Some(last)) = (
        result.strategy.equity.first(),
        result.strategy.equity.last(),
    ) {
        println!("Period:         {} to {}", first.date, last.date);
    }
    println!("Sessions:       {}", result.strategy.equity.len());
    println!(
        "Trigger:        {} (threshold {})",
        result.config.trigger.name(),
        result.config.trigger.threshold()
    );
    println!("Rebalances:     {}", result.strategy.events.len());
    println!("Skipped Buys:   {}", result.strategy.skipped.len());

    print_side("Strategy (rebalanced)", &result.strategy_summary);
    print_side("Benchmark (buy & hold)", &result.benchmark_summary);
    println!();
}

fn print_side(label: &str, summary: &PerformanceSummary) {
    println!();
    println!("--- {label} ---");
    println!("Final Value:    {:.2}", summary.final_value);
    println!("Total Return:   {:.2}%", summary.total_return_pct);
    println!("CAGR:           {:.2}%", summary.cagr_pct);
    println!("Max Drawdown:   {:.2}%", summary.max_drawdown_pct);
    println!("Sharpe:         {:.3}", summary.sharpe_ratio);
}
