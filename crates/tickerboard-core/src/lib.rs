//! # Tickerboard Core
//!
//! Price history normalization for the tickerboard terminal dashboard.
//!
//! ## Overview
//!
//! - **Change calculation**: 24h / 7d / 30d / YTD percentage changes from a
//!   daily price series, degrading to `0.0` when history is short
//! - **Trend sampling**: weekly (Friday) closes for equities, a fixed
//!   stride for crypto, at most 12 points over the last 90 days
//! - **Normalization**: one [`InstrumentSnapshot`] or [`FailureRecord`]
//!   per ticker, whatever the provider
//! - **Price sources**: Yahoo Finance and CoinGecko adapters behind the
//!   [`PriceSource`] trait, each with a deterministic offline mode
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo (equity) and CoinGecko (crypto) adapters |
//! | [`board`] | Per-cycle driver producing a [`BoardReport`] |
//! | [`changes`] | Multi-period percentage changes |
//! | [`data_source`] | Price source trait and request/response types |
//! | [`domain`] | Symbols, timestamps, series and snapshots |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`normalizer`] | Raw feed to snapshot |
//! | [`registry`] | Crypto ticker table |
//! | [`retry`] | Backoff and retry for provider calls |
//! | [`sampler`] | Trend sampling |
//! | [`source`] | Provider identifiers |
//! | [`throttling`] | Client-side rate limiting |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tickerboard_core::{AssetRegistry, Board, Symbol, UtcDateTime};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let board = Board::offline(AssetRegistry::default());
//!     let symbols = vec![Symbol::parse("AAPL")?, Symbol::parse("BTC")?];
//!
//!     let report = board.collect(&symbols, UtcDateTime::now()).await;
//!     for snapshot in report.snapshots() {
//!         println!("{} {:.2} ({:+.2}% 24h)", snapshot.symbol, snapshot.current_price, snapshot.changes.h24);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Watch    │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  Board          │────▶│ Asset Registry   │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Price Source    │────▶│ HTTP Client      │
//! │ (Adapter Trait) │     │ (reqwest/none)   │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Normalizer      │──▶ changes + sampler
//! └─────────────────┘
//! ```

pub mod adapters;
pub mod board;
pub mod changes;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod normalizer;
pub mod registry;
pub mod retry;
pub mod sampler;
pub mod source;
pub mod throttling;

pub use adapters::{CoinGeckoAdapter, YahooAdapter, COINGECKO_API_KEY_ENV};
pub use board::{Board, BoardReport};
pub use changes::{compute_changes, percent_change};
pub use data_source::{
    HistoryRequest, PriceFeed, PriceSource, SourceError, SourceErrorKind, DEFAULT_LOOKBACK_DAYS,
};
pub use domain::*;
pub use error::ValidationError;
pub use http_client::{HttpClient, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient};
pub use normalizer::{normalize, normalize_feed};
pub use registry::AssetRegistry;
pub use retry::RetryConfig;
pub use sampler::{sample, sample_trend, DEFAULT_TREND_POINTS};
pub use source::ProviderId;
pub use throttling::RateGate;
