use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime, ValidationError};

/// Instrument class; decides which provider adapter serves a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    Stock,
    Crypto,
}

impl InstrumentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Crypto => "crypto",
        }
    }

    /// Title-cased label used for panel headers.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stock => "Stock",
            Self::Crypto => "Crypto",
        }
    }
}

impl Display for InstrumentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One historical observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPricePoint")]
pub struct PricePoint {
    pub ts: UtcDateTime,
    pub price: f64,
}

impl PricePoint {
    pub fn new(ts: UtcDateTime, price: f64) -> Result<Self, ValidationError> {
        validate_positive("price", price)?;
        Ok(Self { ts, price })
    }
}

#[derive(Deserialize)]
struct RawPricePoint {
    ts: UtcDateTime,
    price: f64,
}

impl TryFrom<RawPricePoint> for PricePoint {
    type Error = ValidationError;

    fn try_from(raw: RawPricePoint) -> Result<Self, Self::Error> {
        Self::new(raw.ts, raw.price)
    }
}

/// How a provider spaces its observations.
///
/// Equity rows are trading sessions whose weekday is meaningful; crypto
/// providers emit a flat stream that trades every day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    TradingSessions,
    Continuous,
}

/// Chronologically ordered price history for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPriceSeries")]
pub struct PriceSeries {
    cadence: Cadence,
    points: Vec<PricePoint>,
}

#[derive(Deserialize)]
struct RawPriceSeries {
    cadence: Cadence,
    points: Vec<PricePoint>,
}

impl From<RawPriceSeries> for PriceSeries {
    fn from(raw: RawPriceSeries) -> Self {
        Self::new(raw.cadence, raw.points)
    }
}

impl PriceSeries {
    /// Builds a series, sorting points by timestamp. Equal timestamps keep
    /// their provider order.
    pub fn new(cadence: Cadence, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|point| point.ts);
        Self { cadence, points }
    }

    pub fn empty(cadence: Cadence) -> Self {
        Self {
            cadence,
            points: Vec::new(),
        }
    }

    pub const fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Point `offset` positions before the end (`offset == 1` is the last).
    pub fn from_end(&self, offset: usize) -> Option<&PricePoint> {
        self.points
            .len()
            .checked_sub(offset)
            .and_then(|index| self.points.get(index))
    }
}

/// Percentage changes over the four display periods.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeSet {
    pub h24: f64,
    pub d7: f64,
    pub d30: f64,
    pub ytd: f64,
}

impl ChangeSet {
    pub const ZERO: Self = Self {
        h24: 0.0,
        d7: 0.0,
        d30: 0.0,
        ytd: 0.0,
    };

    /// Values in display order: 24h, 7d, 30d, YTD.
    pub const fn as_array(&self) -> [f64; 4] {
        [self.h24, self.d7, self.d30, self.ytd]
    }
}

/// Uniform per-ticker record consumed by rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSnapshot {
    pub symbol: Symbol,
    pub current_price: f64,
    pub changes: ChangeSet,
    pub trend: Vec<f64>,
    pub kind: InstrumentKind,
}

/// Why a ticker produced no snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureReason {
    NoData,
    InvalidPrice,
    FetchError,
}

impl FailureReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoData => "no-data",
            Self::InvalidPrice => "invalid-price",
            Self::FetchError => "fetch-error",
        }
    }
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure entry reported in place of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub symbol: Symbol,
    pub reason: FailureReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl FailureRecord {
    pub fn new(symbol: Symbol, reason: FailureReason) -> Self {
        Self {
            symbol,
            reason,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl Display for FailureRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unavailable for symbol {} ({})", self.symbol, self.reason)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// Validate and normalize currency to an uppercase 3-letter code.
pub fn validate_currency_code(input: &str) -> Result<String, ValidationError> {
    let normalized = input.trim().to_ascii_uppercase();
    let is_valid = normalized.len() == 3 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());

    if !is_valid {
        return Err(ValidationError::InvalidCurrency {
            value: input.to_owned(),
        });
    }

    Ok(normalized)
}

fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}
