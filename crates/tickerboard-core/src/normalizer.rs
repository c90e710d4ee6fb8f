//! Per-instrument normalization into one uniform record.

use crate::data_source::{PriceFeed, SourceError, SourceErrorKind};
use crate::{
    changes, sampler, FailureReason, FailureRecord, InstrumentKind, InstrumentSnapshot,
    PriceSeries, Symbol, UtcDateTime,
};

/// Builds the snapshot for one instrument.
///
/// The price is validated first: an absent, non-finite or non-positive
/// price is rejected even when history is available. An absent history
/// means retrieval produced nothing; an empty one yields zero changes and
/// an empty trend.
pub fn normalize(
    kind: InstrumentKind,
    symbol: &Symbol,
    current_price: Option<f64>,
    history: Option<&PriceSeries>,
    now: UtcDateTime,
) -> Result<InstrumentSnapshot, FailureRecord> {
    let current_price = match current_price {
        Some(price) if price.is_finite() && price > 0.0 => price,
        Some(price) => {
            return Err(FailureRecord::new(symbol.clone(), FailureReason::InvalidPrice)
                .with_detail(format!("price {price} is not a positive number")))
        }
        None => {
            return Err(FailureRecord::new(symbol.clone(), FailureReason::InvalidPrice)
                .with_detail("provider reported no current price"))
        }
    };

    let history =
        history.ok_or_else(|| FailureRecord::new(symbol.clone(), FailureReason::NoData))?;

    Ok(InstrumentSnapshot {
        symbol: symbol.clone(),
        current_price,
        changes: changes::compute_changes(history, current_price, now),
        trend: sampler::sample_trend(history, now),
        kind,
    })
}

/// [`normalize`] over a fetch outcome.
pub fn normalize_feed(
    kind: InstrumentKind,
    symbol: &Symbol,
    outcome: Result<PriceFeed, SourceError>,
    now: UtcDateTime,
) -> Result<InstrumentSnapshot, FailureRecord> {
    match outcome {
        Ok(feed) => normalize(kind, symbol, feed.current_price, Some(&feed.history), now),
        Err(error) if error.kind() == SourceErrorKind::NoData => {
            Err(FailureRecord::new(symbol.clone(), FailureReason::NoData)
                .with_detail(error.message()))
        }
        Err(error) => Err(FailureRecord::new(symbol.clone(), FailureReason::FetchError)
            .with_detail(error.to_string())),
    }
}
