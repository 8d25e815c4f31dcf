//! Price feed abstraction.
//!
//! The engine consumes plain [`PricePoint`] slices and never fetches
//! anything itself. Feeds (CSV files, synthetic generators) live behind
//! this trait so the simulation stays deterministic and testable.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::PricePoint;

/// Structured error types for feed operations.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("feed parse error: {0}")]
    Parse(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },
}

/// Trait for daily close-price sources.
///
/// Implementations handle the specifics of one source. Alignment and
/// validity filtering sit above this trait, so a feed may return raw
/// points with gaps, duplicates, or placeholder values.
pub trait PriceFeed: Send + Sync {
    /// Human-readable name of this feed.
    fn name(&self) -> &str;

    /// Fetch daily closes for a symbol over a date range (inclusive).
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, FeedError>;
}
