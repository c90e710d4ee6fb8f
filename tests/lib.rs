//! Shared fixtures for the tickerboard behavior tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

pub use std::sync::Arc;
pub use tickerboard_core::{
    data_source::FetchFuture,
    http_client::{HttpError, HttpFuture},
    AssetRegistry, Board, BoardReport, Cadence, CoinGeckoAdapter, FailureReason, HistoryRequest,
    HttpClient, HttpRequest, HttpResponse, InstrumentKind, PriceFeed, PricePoint, PriceSeries,
    PriceSource, ProviderId, RetryConfig, SourceError, SourceErrorKind, Symbol, UtcDateTime,
    YahooAdapter,
};

/// Reference instant used by the tests: Wednesday 2024-05-15, midnight UTC.
pub fn fixed_now() -> UtcDateTime {
    UtcDateTime::parse("2024-05-15T00:00:00Z").expect("valid timestamp")
}

pub fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

/// One point per day, the last one `days_before_now` days before `now`.
pub fn daily_series(
    cadence: Cadence,
    prices: &[f64],
    now: UtcDateTime,
    days_before_now: i64,
) -> PriceSeries {
    let count = prices.len() as i64;
    let points = prices
        .iter()
        .enumerate()
        .map(|(index, price)| {
            let age = days_before_now + count - 1 - index as i64;
            PricePoint::new(now.days_before(age), *price).expect("valid point")
        })
        .collect();
    PriceSeries::new(cadence, points)
}

/// Price source answering from a script keyed by provider key. Unknown
/// keys answer `no_data`.
pub struct ScriptedSource {
    id: ProviderId,
    script: Mutex<BTreeMap<String, Result<PriceFeed, SourceError>>>,
    requests: Mutex<Vec<HistoryRequest>>,
}

impl ScriptedSource {
    pub fn new(id: ProviderId) -> Self {
        Self {
            id,
            script: Mutex::new(BTreeMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_feed(
        self,
        provider_key: &str,
        current_price: Option<f64>,
        history: PriceSeries,
    ) -> Self {
        let feed = PriceFeed {
            symbol: symbol(provider_key),
            source: self.id,
            current_price,
            history,
            reported_h24: None,
        };
        self.with_outcome(provider_key, Ok(feed))
    }

    pub fn with_error(self, provider_key: &str, error: SourceError) -> Self {
        self.with_outcome(provider_key, Err(error))
    }

    fn with_outcome(self, provider_key: &str, outcome: Result<PriceFeed, SourceError>) -> Self {
        self.script
            .lock()
            .expect("script lock")
            .insert(provider_key.to_owned(), outcome);
        self
    }

    pub fn requests(&self) -> Vec<HistoryRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl PriceSource for ScriptedSource {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn fetch<'a>(&'a self, req: HistoryRequest) -> FetchFuture<'a> {
        self.requests.lock().expect("requests lock").push(req.clone());
        let outcome = self
            .script
            .lock()
            .expect("script lock")
            .get(&req.provider_key)
            .cloned()
            .unwrap_or_else(|| Err(SourceError::no_data("not scripted")));

        Box::pin(async move {
            outcome.map(|mut feed| {
                feed.symbol = req.symbol;
                feed
            })
        })
    }
}

/// HTTP transport replaying queued replies per URL suffix.
#[derive(Default)]
pub struct RoutedHttpClient {
    routes: Mutex<Vec<(String, VecDeque<Result<HttpResponse, HttpError>>)>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl RoutedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `reply` for the next request whose URL ends with `suffix`.
    pub fn route(self, suffix: &str, reply: Result<HttpResponse, HttpError>) -> Self {
        {
            let mut routes = self.routes.lock().expect("routes lock");
            match routes.iter_mut().find(|(candidate, _)| candidate == suffix) {
                Some((_, queue)) => queue.push_back(reply),
                None => routes.push((suffix.to_owned(), VecDeque::from([reply]))),
            }
        }
        self
    }

    pub fn ok(self, suffix: &str, body: &str) -> Self {
        self.route(suffix, Ok(HttpResponse::ok_json(body)))
    }

    pub fn status(self, suffix: &str, status: u16) -> Self {
        self.route(suffix, Ok(HttpResponse::with_status(status, "")))
    }

    pub fn seen(&self) -> Vec<HttpRequest> {
        self.seen.lock().expect("seen lock").clone()
    }
}

impl HttpClient for RoutedHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        let reply = {
            let mut routes = self.routes.lock().expect("routes lock");
            routes
                .iter_mut()
                .find(|(suffix, _)| request.url.ends_with(suffix.as_str()))
                .and_then(|(_, queue)| queue.pop_front())
                .unwrap_or_else(|| Ok(HttpResponse::with_status(404, "")))
        };
        self.seen.lock().expect("seen lock").push(request);
        Box::pin(async move { reply })
    }
}

/// Retry policy that retries quickly enough for tests.
pub fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig::fixed(std::time::Duration::from_millis(1), max_retries)
}
