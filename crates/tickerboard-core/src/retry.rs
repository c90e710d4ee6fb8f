//! Retry with exponential backoff and jitter for provider calls.

use std::time::Duration;

use tracing::{debug, warn};

use crate::data_source::SourceError;
use crate::http_client::{HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse};
use crate::ProviderId;

/// Backoff strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed {
        delay: Duration,
    },
    /// `base * factor^attempt`, capped at `max`, optionally jittered by
    /// +/- 50%.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(250),
            factor: 2.0,
            max: Duration::from_secs(4),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let seconds = base.as_secs_f64() * factor.powi(exponent);
                let capped = Duration::from_secs_f64(seconds.min(max.as_secs_f64()));

                if !jitter {
                    return capped;
                }

                let millis = u64::try_from(capped.as_millis()).unwrap_or(u64::MAX);
                let spread = millis / 2;
                let offset = fastrand::u64(0..=spread.saturating_mul(2));
                Duration::from_millis((millis - spread).saturating_add(offset))
            }
        }
    }
}

/// When and how often a failed provider call is repeated.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub enabled: bool,
    /// Total attempts are `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
    pub retry_on_status: Vec<u16>,
    pub retry_on_timeout: bool,
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 2,
            backoff: Backoff::default(),
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
            retry_on_timeout: true,
            retry_on_connect: true,
        }
    }
}

impl RetryConfig {
    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
            ..Self::default()
        }
    }

    pub fn no_retry() -> Self {
        Self {
            enabled: false,
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    pub fn should_retry_error(&self, error: &HttpError) -> bool {
        match error.kind() {
            HttpErrorKind::Timeout => self.retry_on_timeout,
            HttpErrorKind::Connect => self.retry_on_connect,
            HttpErrorKind::Other => false,
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }

    fn has_budget(&self, attempt: u32) -> bool {
        self.enabled && attempt < self.max_retries
    }
}

/// Executes `request`, repeating transient failures per `config`.
///
/// A final non-success status is classified: 404 means the provider does
/// not know the instrument, 429 is a rate limit, anything else is an
/// upstream outage.
pub async fn execute_with_retry(
    client: &dyn HttpClient,
    request: HttpRequest,
    config: &RetryConfig,
    provider: ProviderId,
) -> Result<HttpResponse, SourceError> {
    let mut attempt = 0_u32;
    loop {
        match client.execute(request.clone()).await {
            Ok(response) if response.is_success() => {
                debug!(%provider, url = %request.url, attempt, "provider call succeeded");
                return Ok(response);
            }
            Ok(response)
                if config.has_budget(attempt) && config.should_retry_status(response.status) =>
            {
                warn!(%provider, status = response.status, attempt, "retrying provider call");
            }
            Ok(response) => return Err(status_error(provider, response.status)),
            Err(error) if config.has_budget(attempt) && config.should_retry_error(&error) => {
                warn!(%provider, error = %error, attempt, "retrying provider call");
            }
            Err(error) => {
                return Err(SourceError::unavailable(format!(
                    "{provider} transport error: {}",
                    error.message()
                )));
            }
        }

        tokio::time::sleep(config.delay_for_attempt(attempt)).await;
        attempt += 1;
    }
}

fn status_error(provider: ProviderId, status: u16) -> SourceError {
    match status {
        404 => SourceError::no_data(format!("{provider} has no data for this instrument")),
        429 => SourceError::rate_limited(format!("{provider} rate limit exceeded")),
        _ => SourceError::unavailable(format!("{provider} returned status {status}")),
    }
}
