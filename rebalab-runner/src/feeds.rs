//! Price feed implementations — CSV directories and synthetic walks.

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use rebalab_core::{FeedError, PriceFeed, PricePoint};

// ─── CSV feed ───────────────────────────────────────────────────────

/// Reads daily closes from `<dir>/<symbol>.csv`.
///
/// Expected format: a `date,close` header, ISO dates, one row per
/// session. Lines starting with `#` are skipped.
pub struct CsvFeed {
    dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    close: f64,
}

impl CsvFeed {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PriceFeed for CsvFeed {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, FeedError> {
        let path = self.dir.join(format!("{symbol}.csv"));
        if !path.exists() {
            return Err(FeedError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let text = std::fs::read_to_string(&path)?;

        let mut reader = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .from_reader(text.as_bytes());

        let mut points = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row.map_err(|e| FeedError::Parse(e.to_string()))?;
            let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
                .map_err(|e| FeedError::Parse(format!("bad date '{}': {e}", row.date)))?;
            if date < start || date > end {
                continue;
            }
            points.push(PricePoint::new(date, row.close));
        }
        Ok(points)
    }
}

// ─── Synthetic feed ─────────────────────────────────────────────────

/// Deterministic random-walk generator for offline runs and tests.
///
/// The RNG is seeded from the symbol name and the feed seed, so the
/// same symbol always walks the same path and different symbols
/// decorrelate.
pub struct SyntheticFeed {
    seed: u64,
}

impl SyntheticFeed {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for SyntheticFeed {
    fn default() -> Self {
        Self::new(42)
    }
}

impl PriceFeed for SyntheticFeed {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, FeedError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(symbol.as_bytes());
        hasher.update(&self.seed.to_le_bytes());
        let rng_seed: [u8; 32] = *hasher.finalize().as_bytes();
        let mut rng = StdRng::from_seed(rng_seed);

        let mut points = Vec::new();
        let mut price = 100.0_f64;
        let mut current = start;
        while current <= end {
            // Weekend days produce no session.
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += chrono::Duration::days(1);
                continue;
            }
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            price *= 1.0 + daily_return;
            points.push(PricePoint::new(current, price));
            current += chrono::Duration::days(1);
        }
        Ok(points)
    }
}
