//! Price source trait and request/response types.
//!
//! This module defines the adapter contract (`PriceSource`) that every
//! upstream provider implements. An adapter turns one [`HistoryRequest`]
//! into a [`PriceFeed`]: the provider's current price plus its raw daily
//! history, with no derived metrics.
//!
//! # Example
//!
//! ```rust,ignore
//! use tickerboard_core::{HistoryRequest, PriceSource, SourceError, Symbol, YahooAdapter};
//!
//! async fn fetch(adapter: &YahooAdapter) -> Result<(), SourceError> {
//!     let request = HistoryRequest::new(Symbol::parse("AAPL")?, "AAPL", "USD", 365)?;
//!     let feed = adapter.fetch(request).await?;
//!     println!("{} rows, last price {:?}", feed.history.len(), feed.current_price);
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{validate_currency_code, PriceSeries, ProviderId, Symbol, ValidationError};

/// Default history lookback in days.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// The provider answered but holds no history for the instrument.
    NoData,
    Unavailable,
    RateLimited,
    InvalidRequest,
    Parse,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NoData, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::RateLimited, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Parse, message)
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NoData => "source.no_data",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Parse => "source.parse",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}

/// Request payload for one instrument's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    /// Identifier the provider knows the instrument by (ticker or coin id).
    pub provider_key: String,
    /// Quote currency, uppercase ISO code.
    pub currency: String,
    pub lookback_days: u32,
}

impl HistoryRequest {
    pub fn new(
        symbol: Symbol,
        provider_key: impl Into<String>,
        currency: &str,
        lookback_days: u32,
    ) -> Result<Self, SourceError> {
        let provider_key = provider_key.into();
        if provider_key.trim().is_empty() {
            return Err(SourceError::invalid_request(
                "history request must name a provider key",
            ));
        }
        if lookback_days == 0 {
            return Err(SourceError::invalid_request(
                "history request lookback must be greater than zero",
            ));
        }

        Ok(Self {
            symbol,
            provider_key,
            currency: validate_currency_code(currency)?,
            lookback_days,
        })
    }
}

/// Raw provider answer for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceFeed {
    pub symbol: Symbol,
    pub source: ProviderId,
    /// Latest price as reported by the provider; may be absent or bogus.
    pub current_price: Option<f64>,
    pub history: PriceSeries,
    /// Provider-computed 24h change, kept only as a cross-check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_h24: Option<f64>,
}

/// Boxed future returned by [`PriceSource::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<PriceFeed, SourceError>> + Send + 'a>>;

/// Price provider contract.
///
/// Implementations must be `Send + Sync`; the board holds them behind
/// `Arc<dyn PriceSource>`.
pub trait PriceSource: Send + Sync {
    /// Returns the unique provider identifier.
    fn id(&self) -> ProviderId;

    /// Fetches the current price and daily history for one instrument.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] with kind [`SourceErrorKind::NoData`] when the
    /// provider does not know the instrument or has no rows for it, and
    /// another kind for transport, status or parsing failures.
    fn fetch<'a>(&'a self, req: HistoryRequest) -> FetchFuture<'a>;
}
