//! Two-series date alignment.
//!
//! The instrument and benchmark series rarely share an identical calendar
//! (different listing dates, exchange holidays, feed gaps). Alignment
//! keeps only the dates where BOTH series carry a valid close, so every
//! simulated period prices both sides. Invalid points (NaN, zero,
//! negative) are dropped before intersecting; there is no forward-fill
//! of tradable price data.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{PricePoint, PriceSeries};
use crate::error::BacktestError;

/// Minimum aligned length accepted for a backtest run.
pub const MIN_ALIGNED_POINTS: usize = 10;

/// A pair of equal-length series on a shared ascending date axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    pub leveraged: PriceSeries,
    pub benchmark: PriceSeries,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.leveraged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leveraged.is_empty()
    }

    /// Deterministic BLAKE3 hash over both series, recorded in run
    /// manifests so results can be traced back to their exact inputs.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for series in [&self.leveraged, &self.benchmark] {
            hasher.update(series.symbol.as_bytes());
            for point in &series.points {
                hasher.update(point.date.to_string().as_bytes());
                hasher.update(&point.price.to_le_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Index valid points by date. A later duplicate wins so a feed's
/// corrected re-emission of a date supersedes the earlier row.
fn by_date(points: &[PricePoint]) -> BTreeMap<NaiveDate, f64> {
    let mut map = BTreeMap::new();
    for point in points {
        if point.is_valid() {
            map.insert(point.date, point.price);
        }
    }
    map
}

/// Align two raw series to the intersection of their valid dates.
///
/// Input order does not matter; the output axis is ascending. Rejects
/// overlaps shorter than [`MIN_ALIGNED_POINTS`] because the statistics
/// downstream are meaningless on a handful of periods.
pub fn align_pair(
    leveraged: PriceSeries,
    benchmark: PriceSeries,
) -> Result<AlignedPair, BacktestError> {
    let lev = by_date(&leveraged.points);
    let ben = by_date(&benchmark.points);

    let mut lev_points = Vec::new();
    let mut ben_points = Vec::new();
    for (date, price) in &lev {
        if let Some(ben_price) = ben.get(date) {
            lev_points.push(PricePoint::new(*date, *price));
            ben_points.push(PricePoint::new(*date, *ben_price));
        }
    }

    if lev_points.len() < MIN_ALIGNED_POINTS {
        return Err(BacktestError::InsufficientData {
            len: lev_points.len(),
            min: MIN_ALIGNED_POINTS,
        });
    }

    Ok(AlignedPair {
        leveraged: PriceSeries::new(leveraged.symbol, lev_points),
        benchmark: PriceSeries::new(benchmark.symbol, ben_points),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
    }

    fn series(symbol: &str, points: Vec<(u32, f64)>) -> PriceSeries {
        PriceSeries::new(
            symbol,
            points
                .into_iter()
                .map(|(d, p)| PricePoint::new(day(d), p))
                .collect(),
        )
    }

    fn ramp(symbol: &str, days: std::ops::RangeInclusive<u32>) -> PriceSeries {
        series(symbol, days.map(|d| (d, 100.0 + d as f64)).collect())
    }

    #[test]
    fn align_keeps_only_shared_dates() {
        let lev = ramp("00631L.TW", 1..=12);
        let ben = ramp("0050.TW", 2..=13);

        let pair = align_pair(lev, ben).unwrap();

        assert_eq!(pair.len(), 11);
        assert_eq!(pair.leveraged.points[0].date, day(2));
        assert_eq!(pair.leveraged.points[10].date, day(12));
        // Same axis on both sides.
        for (l, b) in pair.leveraged.points.iter().zip(&pair.benchmark.points) {
            assert_eq!(l.date, b.date);
        }
    }

    #[test]
    fn invalid_points_drop_the_date_from_both_sides() {
        let mut lev = ramp("LEV", 1..=13);
        let mut ben = ramp("BEN", 1..=13);
        lev.points[4].price = f64::NAN; // day 5
        ben.points[5].price = 0.0; // day 6

        let pair = align_pair(lev, ben).unwrap();

        assert_eq!(pair.len(), 11);
        assert!(pair.leveraged.points.iter().all(|p| p.date != day(5)));
        assert!(pair.leveraged.points.iter().all(|p| p.date != day(6)));
        assert!(pair.benchmark.points.iter().all(|p| p.is_valid()));
    }

    #[test]
    fn duplicate_dates_last_wins() {
        let mut lev = ramp("LEV", 1..=10);
        // Corrected close for day 3 re-emitted at the end of the feed.
        lev.points.push(PricePoint::new(day(3), 999.0));
        let ben = ramp("BEN", 1..=10);

        let pair = align_pair(lev, ben).unwrap();

        assert_eq!(pair.len(), 10);
        let day3 = pair
            .leveraged
            .points
            .iter()
            .find(|p| p.date == day(3))
            .unwrap();
        assert_eq!(day3.price, 999.0);
    }

    #[test]
    fn unsorted_input_comes_out_ascending() {
        let mut lev = ramp("LEV", 1..=10);
        lev.points.reverse();
        let ben = ramp("BEN", 1..=10);

        let pair = align_pair(lev, ben).unwrap();

        let dates: Vec<_> = pair.leveraged.points.iter().map(|p| p.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn short_overlap_is_rejected() {
        let lev = ramp("LEV", 1..=9);
        let ben = ramp("BEN", 1..=9);

        let err = align_pair(lev, ben).unwrap_err();
        match err {
            BacktestError::InsufficientData { len, min } => {
                assert_eq!(len, 9);
                assert_eq!(min, MIN_ALIGNED_POINTS);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fingerprint_is_deterministic_and_price_sensitive() {
        let pair = align_pair(ramp("LEV", 1..=10), ramp("BEN", 1..=10)).unwrap();
        let again = align_pair(ramp("LEV", 1..=10), ramp("BEN", 1..=10)).unwrap();
        assert_eq!(pair.fingerprint(), again.fingerprint());

        let mut bumped = ramp("LEV", 1..=10);
        bumped.points[7].price += 0.0001;
        let other = align_pair(bumped, ramp("BEN", 1..=10)).unwrap();
        assert_ne!(pair.fingerprint(), other.fingerprint());
    }
}
