//! Multi-period percentage changes.
//!
//! The 24h, 7d and 30d anchors are positional: they count rows back from
//! the end of the series instead of doing calendar arithmetic. Equity
//! series skip weekends and holidays, so "8 rows back" is only roughly a
//! week. This matches how the panels have always been computed; a cluster
//! of missing sessions near the end skews the 7d/30d figures.

use crate::{ChangeSet, PriceSeries, UtcDateTime};

/// Rows back from the end used as the 24h anchor.
const H24_OFFSET: usize = 2;
/// Rows back from the end used as the 7d anchor (one week plus a session).
const D7_OFFSET: usize = 8;
const D7_MIN_LEN: usize = 7;
/// Rows back from the end used as the 30d anchor.
const D30_OFFSET: usize = 31;
const D30_MIN_LEN: usize = 30;

/// Computes the 24h/7d/30d/YTD changes of `current_price` against `series`.
///
/// Never fails: a period without a usable anchor reports `0.0`.
pub fn compute_changes(series: &PriceSeries, current_price: f64, now: UtcDateTime) -> ChangeSet {
    ChangeSet {
        h24: positional_change(series, current_price, H24_OFFSET, H24_OFFSET),
        d7: positional_change(series, current_price, D7_OFFSET, D7_MIN_LEN),
        d30: positional_change(series, current_price, D30_OFFSET, D30_MIN_LEN),
        ytd: ytd_anchor(series, now)
            .map(|anchor| percent_change(current_price, anchor))
            .unwrap_or(0.0),
    }
}

/// `(current - anchor) / anchor * 100`, degrading to `0.0` for a zero
/// anchor or any non-finite result.
pub fn percent_change(current: f64, anchor: f64) -> f64 {
    if anchor == 0.0 {
        return 0.0;
    }

    let change = (current - anchor) / anchor * 100.0;
    if change.is_finite() {
        change
    } else {
        0.0
    }
}

/// Price of the first point in `now`'s calendar year, else of the first
/// point overall.
pub fn ytd_anchor(series: &PriceSeries, now: UtcDateTime) -> Option<f64> {
    let year = now.year();
    series
        .points()
        .iter()
        .find(|point| point.ts.year() == year)
        .or_else(|| series.points().first())
        .map(|point| point.price)
}

fn positional_change(series: &PriceSeries, current: f64, offset: usize, min_len: usize) -> f64 {
    if series.len() < min_len {
        return 0.0;
    }

    // A series of exactly `min_len` rows can still be one short of `offset`.
    series
        .from_end(offset)
        .map(|anchor| percent_change(current, anchor.price))
        .unwrap_or(0.0)
}
