use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Client-side request budget for one provider.
///
/// Cloning shares the budget.
#[derive(Clone)]
pub struct RateGate {
    limiter: Arc<DirectRateLimiter>,
}

impl RateGate {
    /// Allows `limit` requests per `window`, all of which may burst.
    pub fn new(window: Duration, limit: u32) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota_from_window(window, limit))),
        }
    }

    /// Waits until the budget admits one more request.
    pub async fn until_ready(&self) {
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for RateGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGate").finish_non_exhaustive()
    }
}

fn quota_from_window(window: Duration, limit: u32) -> Quota {
    let burst = NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN);
    let seconds_per_cell = (window.as_secs_f64() / f64::from(burst.get())).max(0.001);

    Quota::with_period(Duration::from_secs_f64(seconds_per_cell))
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `true` when the gate admits a request within a few milliseconds.
    async fn admits_now(gate: &RateGate) -> bool {
        tokio::time::timeout(Duration::from_millis(50), gate.until_ready())
            .await
            .is_ok()
    }

    #[tokio::test]
    async fn waits_once_the_burst_is_spent() {
        let gate = RateGate::new(Duration::from_secs(60), 2);

        assert!(admits_now(&gate).await);
        assert!(admits_now(&gate).await);
        assert!(!admits_now(&gate).await);
    }

    #[tokio::test]
    async fn clones_share_one_budget() {
        let gate = RateGate::new(Duration::from_secs(60), 1);
        let other = gate.clone();

        assert!(admits_now(&gate).await);
        assert!(!admits_now(&other).await);
    }

    #[tokio::test]
    async fn zero_limit_is_treated_as_one() {
        let gate = RateGate::new(Duration::from_secs(60), 0);
        assert!(admits_now(&gate).await);
        assert!(!admits_now(&gate).await);
    }

    #[tokio::test]
    async fn until_ready_returns_while_budget_remains() {
        let gate = RateGate::new(Duration::from_secs(1), 5);
        for _ in 0..5 {
            gate.until_ready().await;
        }
    }
}
