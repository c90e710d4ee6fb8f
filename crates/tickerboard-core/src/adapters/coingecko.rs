use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::{symbol_seed, synthetic_points};
use crate::data_source::{FetchFuture, HistoryRequest, PriceFeed, PriceSource, SourceError};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, NoopHttpClient};
use crate::retry::{execute_with_retry, RetryConfig};
use crate::throttling::RateGate;
use crate::{Cadence, PricePoint, PriceSeries, ProviderId, UtcDateTime};

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const API_KEY_HEADER: &str = "x-cg-demo-api-key";
/// Public API budget: 30 calls per minute.
const QUOTA_WINDOW: Duration = Duration::from_secs(60);
const QUOTA_LIMIT: u32 = 30;

/// Environment variable holding an optional CoinGecko demo API key.
pub const COINGECKO_API_KEY_ENV: &str = "TICKERBOARD_COINGECKO_API_KEY";

/// Crypto adapter over the CoinGecko public API.
///
/// Each fetch makes two calls, `simple/price` for the spot price and the
/// provider's own 24h change, then `market_chart` for daily history. Both
/// share one [`RateGate`].
#[derive(Clone)]
pub struct CoinGeckoAdapter {
    http_client: Arc<dyn HttpClient>,
    retry: RetryConfig,
    base_url: String,
    auth: HttpAuth,
    gate: RateGate,
    use_real_api: bool,
}

impl Default for CoinGeckoAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            retry: RetryConfig::default(),
            base_url: String::from(DEFAULT_BASE_URL),
            auth: HttpAuth::None,
            gate: RateGate::new(QUOTA_WINDOW, QUOTA_LIMIT),
            use_real_api: false,
        }
    }
}

impl CoinGeckoAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            use_real_api,
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.auth = match api_key.filter(|key| !key.trim().is_empty()) {
            Some(value) => HttpAuth::Header {
                name: String::from(API_KEY_HEADER),
                value,
            },
            None => HttpAuth::None,
        };
        self
    }

    /// Reads the demo API key from [`COINGECKO_API_KEY_ENV`].
    pub fn api_key_from_env() -> Option<String> {
        std::env::var(COINGECKO_API_KEY_ENV).ok()
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    async fn get(&self, request: HttpRequest) -> Result<String, SourceError> {
        self.gate.until_ready().await;
        let request = request.with_auth(&self.auth);
        debug!(url = %request.full_url(), "requesting coingecko");

        let response = execute_with_retry(
            self.http_client.as_ref(),
            request,
            &self.retry,
            ProviderId::CoinGecko,
        )
        .await?;
        Ok(response.body)
    }

    async fn fetch_real(&self, req: &HistoryRequest) -> Result<PriceFeed, SourceError> {
        let vs_currency = req.currency.to_ascii_lowercase();

        let body = self
            .get(
                HttpRequest::get(format!("{}/simple/price", self.base_url))
                    .with_query("ids", req.provider_key.as_str())
                    .with_query("vs_currencies", vs_currency.as_str())
                    .with_query("include_24hr_change", "true"),
            )
            .await?;
        let prices: SimplePriceResponse = serde_json::from_str(&body)
            .map_err(|e| SourceError::parse(format!("failed to parse coingecko price: {e}")))?;
        let quote = prices.get(&req.provider_key).ok_or_else(|| {
            SourceError::no_data(format!("coingecko does not know coin id '{}'", req.provider_key))
        })?;
        let current_price = quote.get(&vs_currency).copied().flatten();
        let reported_h24 = quote
            .get(&format!("{vs_currency}_24h_change"))
            .copied()
            .flatten();

        let body = self
            .get(
                HttpRequest::get(format!(
                    "{}/coins/{}/market_chart",
                    self.base_url,
                    urlencoding::encode(&req.provider_key)
                ))
                .with_query("vs_currency", vs_currency.as_str())
                .with_query("days", req.lookback_days.to_string())
                .with_query("interval", "daily"),
            )
            .await?;
        let chart: MarketChartResponse = serde_json::from_str(&body)
            .map_err(|e| SourceError::parse(format!("failed to parse coingecko chart: {e}")))?;

        let points = chart
            .prices
            .iter()
            .filter_map(|[ts_millis, price]| {
                let ts = UtcDateTime::from_unix_millis(*ts_millis as i64).ok()?;
                PricePoint::new(ts, *price).ok()
            })
            .collect::<Vec<_>>();

        if points.is_empty() {
            return Err(SourceError::no_data(format!(
                "coingecko returned no history for '{}'",
                req.provider_key
            )));
        }

        Ok(PriceFeed {
            symbol: req.symbol.clone(),
            source: ProviderId::CoinGecko,
            current_price,
            history: PriceSeries::new(Cadence::Continuous, points),
            reported_h24,
        })
    }

    fn fetch_fake(&self, req: &HistoryRequest) -> Result<PriceFeed, SourceError> {
        let now = UtcDateTime::now();
        let base = 0.5 + (symbol_seed(&req.symbol) % 60_000) as f64 / 3.0;
        let points = synthetic_points(&req.symbol, base, req.lookback_days, now, |_| true);

        let history = PriceSeries::new(Cadence::Continuous, points);
        let current_price = history.last().map(|point| point.price);
        let reported_h24 = match (current_price, history.from_end(2)) {
            (Some(current), Some(anchor)) => {
                Some((current - anchor.price) / anchor.price * 100.0)
            }
            _ => None,
        };

        Ok(PriceFeed {
            symbol: req.symbol.clone(),
            source: ProviderId::CoinGecko,
            current_price,
            history,
            reported_h24,
        })
    }
}

impl PriceSource for CoinGeckoAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::CoinGecko
    }

    fn fetch<'a>(&'a self, req: HistoryRequest) -> FetchFuture<'a> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_real(&req).await
            } else {
                self.fetch_fake(&req)
            }
        })
    }
}

/// `{coin_id: {"usd": 1.0, "usd_24h_change": -0.4}}`
type SimplePriceResponse = BTreeMap<String, BTreeMap<String, Option<f64>>>;

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    #[serde(default)]
    prices: Vec<[f64; 2]>,
}
