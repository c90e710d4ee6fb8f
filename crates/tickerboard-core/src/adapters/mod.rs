mod coingecko;
mod yahoo;

pub use coingecko::{CoinGeckoAdapter, COINGECKO_API_KEY_ENV};
pub use yahoo::YahooAdapter;

use crate::{PricePoint, Symbol, UtcDateTime};

/// Stable per-symbol seed for the offline data generators.
fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(u64::from(byte))
    })
}

/// Smooth, strictly positive synthetic price for day `index`.
fn synthetic_price(seed: u64, base: f64, index: usize) -> f64 {
    let phase = (seed % 7) as f64;
    let wave = ((index as f64) / 9.0 + phase).sin() * 0.15;
    let drift = index as f64 * 0.0008;
    base * (1.0 + wave + drift)
}

/// Daily points from `days` days ago up to `now`, skipping days rejected
/// by `keep`.
fn synthetic_points(
    symbol: &Symbol,
    base: f64,
    days: u32,
    now: UtcDateTime,
    keep: impl Fn(UtcDateTime) -> bool,
) -> Vec<PricePoint> {
    let seed = symbol_seed(symbol);
    (0..=i64::from(days))
        .rev()
        .map(|age| now.days_before(age))
        .filter(|ts| keep(*ts))
        .enumerate()
        .filter_map(|(index, ts)| PricePoint::new(ts, synthetic_price(seed, base, index)).ok())
        .collect()
}
