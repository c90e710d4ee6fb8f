//! Trend sampling for compact charts.
//!
//! Reduces a price history of arbitrary density to at most `max_points`
//! chronological prices covering roughly the last quarter.

use time::Weekday;

use crate::{Cadence, PricePoint, PriceSeries, UtcDateTime};

/// Number of trend points rendered per panel.
pub const DEFAULT_TREND_POINTS: usize = 12;
/// Lookback window for trend sampling.
pub const TREND_WINDOW_DAYS: i64 = 90;
/// Stride used to approximate a weekly sample from a daily stream.
pub const CONTINUOUS_STRIDE: usize = 7;

/// [`sample`] with the default of 12 points.
pub fn sample_trend(series: &PriceSeries, now: UtcDateTime) -> Vec<f64> {
    sample(series, now, DEFAULT_TREND_POINTS)
}

/// Samples `series` down to at most `max_points` chronological prices.
///
/// Trading-session series keep the Friday closes of the last 90 days;
/// continuous series take every 7th point of that window. An empty window
/// falls back to the tail of the whole series.
pub fn sample(series: &PriceSeries, now: UtcDateTime, max_points: usize) -> Vec<f64> {
    if series.is_empty() || max_points == 0 {
        return Vec::new();
    }

    let window = recent_window(series.points(), now);
    if window.is_empty() {
        return tail(series.points(), max_points);
    }

    match series.cadence() {
        Cadence::TradingSessions => weekly_closes(window, max_points),
        Cadence::Continuous => window
            .iter()
            .step_by(CONTINUOUS_STRIDE)
            .take(max_points)
            .map(|point| point.price)
            .collect(),
    }
}

/// Suffix of `points` at or after `now - 90 days`. Points are sorted, so
/// the window is always a contiguous tail.
fn recent_window(points: &[PricePoint], now: UtcDateTime) -> &[PricePoint] {
    let cutoff = now.days_before(TREND_WINDOW_DAYS);
    let start = points.partition_point(|point| point.ts < cutoff);
    &points[start..]
}

fn weekly_closes(window: &[PricePoint], max_points: usize) -> Vec<f64> {
    let fridays = window
        .iter()
        .filter(|point| point.ts.weekday() == Weekday::Friday)
        .copied()
        .collect::<Vec<_>>();

    if fridays.is_empty() {
        tail(window, max_points)
    } else {
        tail(&fridays, max_points)
    }
}

fn tail(points: &[PricePoint], max_points: usize) -> Vec<f64> {
    let start = points.len().saturating_sub(max_points);
    points[start..].iter().map(|point| point.price).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> UtcDateTime {
        // A Wednesday.
        UtcDateTime::parse("2024-05-15T00:00:00Z").expect("timestamp")
    }

    /// `count` points one day apart, the last one `days_before_now` days ago.
    fn daily(cadence: Cadence, count: usize, days_before_now: i64) -> PriceSeries {
        let points = (0..count)
            .map(|index| {
                let age = days_before_now + (count - 1 - index) as i64;
                PricePoint::new(now().days_before(age), 1.0 + index as f64).expect("point")
            })
            .collect();
        PriceSeries::new(cadence, points)
    }

    #[test]
    fn empty_series_samples_to_nothing() {
        assert!(sample_trend(&PriceSeries::empty(Cadence::TradingSessions), now()).is_empty());
        assert!(sample_trend(&PriceSeries::empty(Cadence::Continuous), now()).is_empty());
    }

    #[test]
    fn continuous_stream_takes_every_seventh_point_capped_at_twelve() {
        // 100 daily points ending yesterday; the last 90 fall in the window.
        let series = daily(Cadence::Continuous, 100, 1);
        let trend = sample_trend(&series, now());

        assert_eq!(trend.len(), 12);
        let expected = (0..12).map(|k| 11.0 + (k * 7) as f64).collect::<Vec<_>>();
        assert_eq!(trend, expected);
    }

    #[test]
    fn continuous_short_window_is_not_padded() {
        let series = daily(Cadence::Continuous, 20, 0);
        let trend = sample_trend(&series, now());
        assert_eq!(trend, vec![1.0, 8.0, 15.0]);
    }

    #[test]
    fn trading_sessions_keep_last_twelve_fridays() {
        let series = daily(Cadence::TradingSessions, 200, 0);
        let trend = sample_trend(&series, now());

        assert_eq!(trend.len(), 12);
        let fridays = series
            .points()
            .iter()
            .filter(|p| p.ts.weekday() == Weekday::Friday && p.ts >= now().days_before(90))
            .map(|p| p.price)
            .collect::<Vec<_>>();
        assert_eq!(trend, fridays[fridays.len() - 12..].to_vec());
        assert!(trend.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn trading_sessions_without_fridays_use_window_tail() {
        // Monday..Thursday of the current week.
        let points = (0..3)
            .map(|index| {
                PricePoint::new(now().days_before(2 - index), 10.0 + index as f64)
                    .expect("point")
            })
            .collect();
        let series = PriceSeries::new(Cadence::TradingSessions, points);
        assert_eq!(sample_trend(&series, now()), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn stale_history_falls_back_to_series_tail() {
        let series = daily(Cadence::Continuous, 30, 200);
        let trend = sample_trend(&series, now());
        let expected = (19..31).map(|price| price as f64).collect::<Vec<_>>();
        assert_eq!(trend, expected);
    }

    #[test]
    fn output_never_exceeds_window_length_or_cap() {
        for count in [1_usize, 2, 5, 13, 60, 365] {
            for cadence in [Cadence::TradingSessions, Cadence::Continuous] {
                let series = daily(cadence, count, 0);
                let window_len = count.min(91);
                let trend = sample(&series, now(), 12);
                assert!(trend.len() <= 12);
                assert!(trend.len() <= window_len);
            }
        }
    }

    #[test]
    fn respects_custom_caps() {
        let series = daily(Cadence::Continuous, 90, 0);
        assert_eq!(sample(&series, now(), 3), vec![1.0, 8.0, 15.0]);
        assert!(sample(&series, now(), 0).is_empty());
    }
}
