use std::sync::Arc;

use serde::Deserialize;
use time::Weekday;
use tracing::debug;

use super::{symbol_seed, synthetic_points};
use crate::data_source::{FetchFuture, HistoryRequest, PriceFeed, PriceSource, SourceError};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::retry::{execute_with_retry, RetryConfig};
use crate::{Cadence, PricePoint, PriceSeries, ProviderId, UtcDateTime};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Equity adapter over the Yahoo Finance chart API.
///
/// Built with [`Default`] it never touches the network and serves
/// deterministic session data instead.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    retry: RetryConfig,
    base_url: String,
    use_real_api: bool,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            retry: RetryConfig::default(),
            base_url: String::from(DEFAULT_BASE_URL),
            use_real_api: false,
        }
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            use_real_api,
            ..Self::default()
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    async fn fetch_real(&self, req: &HistoryRequest) -> Result<PriceFeed, SourceError> {
        let request = HttpRequest::get(format!(
            "{}/v8/finance/chart/{}",
            self.base_url,
            urlencoding::encode(&req.provider_key)
        ))
        .with_query("range", chart_range(req.lookback_days))
        .with_query("interval", "1d");

        debug!(symbol = %req.symbol, url = %request.full_url(), "requesting yahoo chart");
        let response =
            execute_with_retry(self.http_client.as_ref(), request, &self.retry, ProviderId::Yahoo)
                .await?;

        self.parse_chart(req, &response.body)
    }

    fn parse_chart(&self, req: &HistoryRequest, body: &str) -> Result<PriceFeed, SourceError> {
        let chart: YahooChartResponse = serde_json::from_str(body)
            .map_err(|e| SourceError::parse(format!("failed to parse yahoo chart: {e}")))?;

        if let Some(error) = chart.chart.error {
            return Err(if error.code.eq_ignore_ascii_case("not found") {
                SourceError::no_data(format!("yahoo: {}", error.description))
            } else {
                SourceError::unavailable(format!(
                    "yahoo chart error {}: {}",
                    error.code, error.description
                ))
            });
        }

        let result = chart
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| SourceError::no_data(format!("yahoo returned no chart for {}", req.symbol)))?;

        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .and_then(|quote| quote.close)
            .unwrap_or_default();
        let timestamps = result.timestamp.unwrap_or_default();

        let points = timestamps
            .iter()
            .zip(closes)
            .filter_map(|(ts, close)| {
                let ts = UtcDateTime::from_unix_seconds(*ts).ok()?;
                PricePoint::new(ts, close?).ok()
            })
            .collect::<Vec<_>>();

        if points.is_empty() {
            return Err(SourceError::no_data(format!(
                "yahoo returned no closes for {}",
                req.symbol
            )));
        }

        let history = PriceSeries::new(Cadence::TradingSessions, points);
        let meta = result.meta;
        let current_price = meta
            .regular_market_price
            .or(meta.previous_close)
            .or_else(|| history.last().map(|point| point.price));

        Ok(PriceFeed {
            symbol: req.symbol.clone(),
            source: ProviderId::Yahoo,
            current_price,
            history,
            reported_h24: None,
        })
    }

    fn fetch_fake(&self, req: &HistoryRequest) -> Result<PriceFeed, SourceError> {
        let now = UtcDateTime::now();
        let base = 40.0 + (symbol_seed(&req.symbol) % 4_000) as f64 / 10.0;
        let points = synthetic_points(&req.symbol, base, req.lookback_days, now, |ts| {
            !matches!(ts.weekday(), Weekday::Saturday | Weekday::Sunday)
        });

        let history = PriceSeries::new(Cadence::TradingSessions, points);
        let current_price = history.last().map(|point| point.price * 1.002);

        Ok(PriceFeed {
            symbol: req.symbol.clone(),
            source: ProviderId::Yahoo,
            current_price,
            history,
            reported_h24: None,
        })
    }
}

impl PriceSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
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

/// Smallest chart range covering `lookback_days`.
fn chart_range(lookback_days: u32) -> &'static str {
    match lookback_days {
        0..=31 => "1mo",
        32..=93 => "3mo",
        94..=186 => "6mo",
        187..=366 => "1y",
        367..=732 => "2y",
        _ => "5y",
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    meta: YahooChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooChartMeta {
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    previous_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    #[serde(default)]
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    close: Option<Vec<Option<f64>>>,
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{HttpFuture, HttpResponse};
    use crate::Symbol;

    struct FixedClient {
        response: HttpResponse,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl FixedClient {
        fn json(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: HttpResponse::with_status(status, body),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl HttpClient for FixedClient {
        fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
            self.seen.lock().expect("seen lock").push(request);
            let response = self.response.clone();
            Box::pin(async move { Ok(response) })
        }
    }

    fn request(ticker: &str) -> HistoryRequest {
        HistoryRequest::new(Symbol::parse(ticker).expect("symbol"), ticker, "USD", 365)
            .expect("request")
    }

    fn adapter(client: Arc<FixedClient>) -> YahooAdapter {
        YahooAdapter::with_http_client(client).with_retry(RetryConfig::no_retry())
    }

    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"currency": "USD", "regularMarketPrice": 191.5, "chartPreviousClose": 180.0},
                "timestamp": [1704724200, 1704378600, 1704465000],
                "indicators": {"quote": [{"close": [187.0, 181.0, null]}]}
            }],
            "error": null
        }
    }"#;

    #[tokio::test]
    async fn parses_chart_skipping_null_closes() {
        let client = FixedClient::json(200, CHART);
        let feed = adapter(client.clone())
            .fetch(request("AAPL"))
            .await
            .expect("chart parses");

        assert_eq!(feed.source, ProviderId::Yahoo);
        assert_eq!(feed.current_price, Some(191.5));
        let prices = feed.history.points().iter().map(|p| p.price).collect::<Vec<_>>();
        assert_eq!(prices, vec![181.0, 187.0]);
        assert_eq!(feed.history.cadence(), Cadence::TradingSessions);

        let seen = client.seen.lock().expect("seen lock");
        assert_eq!(seen[0].url, "https://query1.finance.yahoo.com/v8/finance/chart/AAPL");
        assert_eq!(seen[0].query_value("range"), Some("1y"));
        assert_eq!(seen[0].query_value("interval"), Some("1d"));
    }

    #[tokio::test]
    async fn falls_back_to_previous_close_then_last_close() {
        let body = CHART.replace(
            "\"regularMarketPrice\": 191.5",
            "\"previousClose\": 186.0",
        );
        let feed = adapter(FixedClient::json(200, &body))
            .fetch(request("AAPL"))
            .await
            .expect("chart parses");
        assert_eq!(feed.current_price, Some(186.0));

        let body = CHART.replace("\"regularMarketPrice\": 191.5, ", "");
        let feed = adapter(FixedClient::json(200, &body))
            .fetch(request("AAPL"))
            .await
            .expect("chart parses");
        assert_eq!(feed.current_price, Some(187.0));
    }

    #[tokio::test]
    async fn ignores_chart_previous_close_from_start_of_range() {
        // chartPreviousClose is the close before the first bar of the range.
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {"chartPreviousClose": 50.0},
                    "timestamp": [1704378600, 1704465000],
                    "indicators": {"quote": [{"close": [51.0, 190.0]}]}
                }],
                "error": null
            }
        }"#;

        let feed = adapter(FixedClient::json(200, body))
            .fetch(request("AAPL"))
            .await
            .expect("chart parses");
        assert_eq!(feed.current_price, Some(190.0));
    }

    #[tokio::test]
    async fn encodes_index_symbols_in_path() {
        let client = FixedClient::json(200, CHART);
        let _ = adapter(client.clone()).fetch(request("^GSPC")).await;

        let seen = client.seen.lock().expect("seen lock");
        assert!(seen[0].url.ends_with("/chart/%5EGSPC"));
    }

    #[tokio::test]
    async fn not_found_chart_is_no_data() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;

        let err = adapter(FixedClient::json(200, body))
            .fetch(request("ZZZZ"))
            .await
            .expect_err("unknown symbol");
        assert_eq!(err.kind(), SourceErrorKind::NoData);

        let err = adapter(FixedClient::json(404, body))
            .fetch(request("ZZZZ"))
            .await
            .expect_err("unknown symbol");
        assert_eq!(err.kind(), SourceErrorKind::NoData);
    }

    #[tokio::test]
    async fn all_null_closes_is_no_data() {
        let body = r#"{"chart":{"result":[{"meta":{"regularMarketPrice":10.0},"timestamp":[1704724200],"indicators":{"quote":[{"close":[null]}]}}],"error":null}}"#;

        let err = adapter(FixedClient::json(200, body))
            .fetch(request("AAPL"))
            .await
            .expect_err("no closes");
        assert_eq!(err.kind(), SourceErrorKind::NoData);
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let err = adapter(FixedClient::json(200, "<html>"))
            .fetch(request("AAPL"))
            .await
            .expect_err("bad body");
        assert_eq!(err.kind(), SourceErrorKind::Parse);
    }

    #[tokio::test]
    async fn offline_mode_serves_weekday_sessions() {
        let feed = YahooAdapter::default()
            .fetch(request("MSFT"))
            .await
            .expect("mock data");

        assert!(feed.current_price.is_some_and(|price| price > 0.0));
        assert!(feed.history.len() > 200);
        assert!(feed
            .history
            .points()
            .iter()
            .all(|p| !matches!(p.ts.weekday(), Weekday::Saturday | Weekday::Sunday)));
    }

    #[test]
    fn chart_range_covers_lookback() {
        assert_eq!(chart_range(30), "1mo");
        assert_eq!(chart_range(365), "1y");
        assert_eq!(chart_range(1_000), "5y");
    }
}
