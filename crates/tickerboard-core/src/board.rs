//! One refresh cycle over a list of tickers.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adapters::{CoinGeckoAdapter, YahooAdapter};
use crate::data_source::{HistoryRequest, PriceSource, DEFAULT_LOOKBACK_DAYS};
use crate::normalizer::normalize_feed;
use crate::{
    AssetRegistry, FailureReason, FailureRecord, InstrumentKind, InstrumentSnapshot, Symbol,
    UtcDateTime,
};

/// Gap in percentage points between our 24h figure and the provider's
/// before the difference is logged.
const H24_DRIFT_TOLERANCE: f64 = 1.0;

pub type Entry = (Symbol, Result<InstrumentSnapshot, FailureRecord>);

/// Classifies, fetches and normalizes tickers through injected sources.
#[derive(Clone)]
pub struct Board {
    equity: Arc<dyn PriceSource>,
    crypto: Arc<dyn PriceSource>,
    registry: AssetRegistry,
    currency: String,
}

impl Board {
    pub fn new(
        equity: Arc<dyn PriceSource>,
        crypto: Arc<dyn PriceSource>,
        registry: AssetRegistry,
    ) -> Self {
        Self {
            equity,
            crypto,
            registry,
            currency: String::from("USD"),
        }
    }

    /// Board over the deterministic offline adapters.
    pub fn offline(registry: AssetRegistry) -> Self {
        Self::new(
            Arc::new(YahooAdapter::default()),
            Arc::new(CoinGeckoAdapter::default()),
            registry,
        )
    }

    /// Quote currency for crypto requests; equities quote in their
    /// listing currency.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Runs one pass over `symbols` in order. A failing ticker becomes a
    /// [`FailureRecord`] and the pass carries on.
    pub async fn collect(&self, symbols: &[Symbol], now: UtcDateTime) -> BoardReport {
        let cycle_id = Uuid::new_v4();
        let mut entries = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            let outcome = self.collect_one(symbol, now).await;
            if let Err(failure) = &outcome {
                warn!(%cycle_id, %failure, "ticker failed");
            }
            entries.push((symbol.clone(), outcome));
        }

        let report = BoardReport {
            cycle_id,
            generated_at: now,
            entries,
        };
        info!(
            %cycle_id,
            ok = report.snapshots().count(),
            failed = report.failures().count(),
            "refresh cycle complete"
        );
        report
    }

    async fn collect_one(
        &self,
        symbol: &Symbol,
        now: UtcDateTime,
    ) -> Result<InstrumentSnapshot, FailureRecord> {
        let kind = self.registry.classify(symbol);
        let (source, provider_key, currency) = match kind {
            InstrumentKind::Stock => (&self.equity, symbol.to_string(), "USD"),
            InstrumentKind::Crypto => (
                &self.crypto,
                self.registry.provider_id(symbol),
                self.currency.as_str(),
            ),
        };

        let request =
            HistoryRequest::new(symbol.clone(), provider_key, currency, DEFAULT_LOOKBACK_DAYS)
                .map_err(|error| {
                    FailureRecord::new(symbol.clone(), FailureReason::FetchError)
                        .with_detail(error.to_string())
                })?;

        debug!(%symbol, %kind, provider = %source.id(), "fetching");
        let outcome = source.fetch(request).await;
        let reported_h24 = outcome.as_ref().ok().and_then(|feed| feed.reported_h24);

        let snapshot = normalize_feed(kind, symbol, outcome, now)?;
        if let Some(reported) = reported_h24 {
            let drift = (snapshot.changes.h24 - reported).abs();
            if drift > H24_DRIFT_TOLERANCE {
                debug!(%symbol, computed = snapshot.changes.h24, reported, "24h change differs from provider");
            }
        }
        Ok(snapshot)
    }
}

/// Outcome of one [`Board::collect`] pass, in request order.
#[derive(Debug, Clone)]
pub struct BoardReport {
    pub cycle_id: Uuid,
    pub generated_at: UtcDateTime,
    pub entries: Vec<Entry>,
}

impl BoardReport {
    pub fn snapshots(&self) -> impl Iterator<Item = &InstrumentSnapshot> {
        self.entries.iter().filter_map(|(_, entry)| entry.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &FailureRecord> {
        self.entries.iter().filter_map(|(_, entry)| entry.as_ref().err())
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&Result<InstrumentSnapshot, FailureRecord>> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == symbol)
            .map(|(_, entry)| entry)
    }

    pub fn all_failed(&self) -> bool {
        !self.entries.is_empty() && self.snapshots().next().is_none()
    }
}
