//! Property-style checks for change calculation and trend sampling across
//! many series shapes.

use time::Weekday;
use tickerboard_core::{compute_changes, sample, sample_trend, ChangeSet};
use tickerboard_tests::*;

fn series_of_len(cadence: Cadence, len: usize) -> PriceSeries {
    let prices = (0..len).map(|index| 50.0 + index as f64).collect::<Vec<_>>();
    daily_series(cadence, &prices, fixed_now(), 0)
}

#[test]
fn short_series_never_report_uncovered_periods() {
    // Given: series from 0 to 40 points
    for len in 0..=40 {
        let series = series_of_len(Cadence::TradingSessions, len);

        // When: changes are computed
        let changes = compute_changes(&series, 200.0, fixed_now());

        // Then: periods without an anchor row are exactly zero
        if len < 2 {
            assert_eq!(changes.h24, 0.0, "len {len}");
        }
        if len < 8 {
            assert_eq!(changes.d7, 0.0, "len {len}");
        }
        if len < 31 {
            assert_eq!(changes.d30, 0.0, "len {len}");
        }
        assert!(changes.as_array().iter().all(|value| value.is_finite()));
    }
}

#[test]
fn covered_periods_match_the_positional_anchor() {
    // Given: a 60-point series
    let series = series_of_len(Cadence::Continuous, 60);
    let current = 123.0;

    // When: changes are computed
    let changes = compute_changes(&series, current, fixed_now());

    // Then: each period uses len-2, len-8 and len-31
    let points = series.points();
    let expected = |index: usize| (current - points[index].price) / points[index].price * 100.0;
    assert!((changes.h24 - expected(58)).abs() < 1e-9);
    assert!((changes.d7 - expected(52)).abs() < 1e-9);
    assert!((changes.d30 - expected(29)).abs() < 1e-9);
}

#[test]
fn empty_history_is_flat() {
    let changes = compute_changes(&PriceSeries::empty(Cadence::Continuous), 50.0, fixed_now());
    assert_eq!(changes, ChangeSet::ZERO);
    assert!(sample_trend(&PriceSeries::empty(Cadence::TradingSessions), fixed_now()).is_empty());
}

#[test]
fn trend_is_bounded_by_cap_and_window() {
    // Given: series of many lengths for both cadences
    for len in [1_usize, 3, 7, 12, 13, 30, 89, 90, 91, 120, 365] {
        for cadence in [Cadence::TradingSessions, Cadence::Continuous] {
            let series = series_of_len(cadence, len);

            // When: the trend is sampled
            let trend = sample_trend(&series, fixed_now());

            // Then: it holds at most 12 chronological prices from the last 91 days
            assert!(!trend.is_empty(), "len {len}");
            assert!(trend.len() <= 12, "len {len}");
            assert!(trend.len() <= len.min(91), "len {len}");
            assert!(trend.windows(2).all(|pair| pair[0] < pair[1]), "len {len}");
        }
    }
}

#[test]
fn crypto_trend_takes_every_seventh_point_of_the_window() {
    // Given: 100 daily crypto points ending yesterday, 90 of them in the window
    let prices = (0..100).map(|index| index as f64 + 1.0).collect::<Vec<_>>();
    let series = daily_series(Cadence::Continuous, &prices, fixed_now(), 1);

    // When: the trend is sampled
    let trend = sample_trend(&series, fixed_now());

    // Then: it holds window indices 0, 7, ..., 77
    let window_start = 10;
    let expected = (0..12)
        .map(|k| prices[window_start + k * 7])
        .collect::<Vec<_>>();
    assert_eq!(trend, expected);
}

#[test]
fn stock_trend_is_friday_closes() {
    // Given: half a year of calendar days
    let series = series_of_len(Cadence::TradingSessions, 180);

    // When: the trend is sampled
    let trend = sample(&series, fixed_now(), 12);

    // Then: every sampled price sits on a Friday
    let fridays = series
        .points()
        .iter()
        .filter(|point| point.ts.weekday() == Weekday::Friday)
        .map(|point| point.price)
        .collect::<Vec<_>>();
    assert_eq!(trend.len(), 12);
    assert!(trend.iter().all(|price| fridays.contains(price)));
}
