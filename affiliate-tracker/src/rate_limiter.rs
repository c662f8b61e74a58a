//! Per-client request rate limiting.
//!
//! Implements a fixed-window counter: each client key may make at most
//! `max_requests` requests per `window`; the count resets once the window
//! that started with the client's first request has elapsed.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, trace};

/// Configuration for the request rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Length of one counting window.
    pub window: Duration,
    /// Requests allowed per client per window.
    pub max_requests: u32,
    /// Key clients by the first `X-Forwarded-For` hop instead of the peer address.
    pub trust_proxy: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(15 * 60),
            max_requests: 100,
            trust_proxy: false,
        }
    }
}

impl RateLimitConfig {
    /// Create RateLimitConfig from environment variables.
    ///
    /// Environment variables:
    /// - `RATE_LIMIT_WINDOW_SECS`: window length in seconds (default: 900)
    /// - `RATE_LIMIT_MAX_REQUESTS`: requests per window (default: 100)
    /// - `TRUST_PROXY`: use `X-Forwarded-For` for the client key (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let window = std::env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.window);

        let max_requests = std::env::var("RATE_LIMIT_MAX_REQUESTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_requests);

        let trust_proxy = crate::config::env_flag("TRUST_PROXY");

        Self {
            window,
            max_requests,
            trust_proxy,
        }
    }
}

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed {
        limit: u32,
        remaining: u32,
        /// Time until the client's window resets.
        reset_after: Duration,
    },
    Limited {
        limit: u32,
        retry_after: Duration,
    },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
struct LimiterState {
    windows: HashMap<String, Window>,
    last_prune: Instant,
}

/// Fixed-window rate limiter shared across request tasks.
#[derive(Debug, Clone)]
pub struct FixedWindowLimiter {
    state: Arc<Mutex<LimiterState>>,
    window: Duration,
    max_requests: u32,
}

impl FixedWindowLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(LimiterState {
                windows: HashMap::new(),
                last_prune: Instant::now(),
            })),
            window: config.window,
            max_requests: config.max_requests,
        }
    }

    pub fn limit(&self) -> u32 {
        self.max_requests
    }

    /// Count one request for `key` against the current time.
    pub async fn try_acquire(&self, key: &str) -> RateLimitDecision {
        self.try_acquire_at(key, Instant::now()).await
    }

    /// Count one request for `key` as of `now`.
    ///
    /// The check and the increment happen under one lock, so concurrent
    /// callers never lose counts. Rejected requests are not counted.
    pub async fn try_acquire_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let mut state = self.state.lock().await;
        self.prune_expired(&mut state, now);

        let window = self.get_or_create_window(&mut state.windows, key, now);
        let reset_after = (window.started + self.window).saturating_duration_since(now);

        if window.count >= self.max_requests {
            trace!(client = %key, retry_after = ?reset_after, "rate limited");
            return RateLimitDecision::Limited {
                limit: self.max_requests,
                retry_after: reset_after,
            };
        }

        window.count += 1;
        RateLimitDecision::Allowed {
            limit: self.max_requests,
            remaining: self.max_requests - window.count,
            reset_after,
        }
    }

    /// Number of clients currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.state.lock().await.windows.len()
    }

    fn get_or_create_window<'a>(
        &self,
        windows: &'a mut HashMap<String, Window>,
        key: &str,
        now: Instant,
    ) -> &'a mut Window {
        let fresh = Window {
            started: now,
            count: 0,
        };
        match windows.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                let window = entry.into_mut();
                if now.saturating_duration_since(window.started) >= self.window {
                    *window = fresh;
                }
                window
            }
            Entry::Vacant(entry) => entry.insert(fresh),
        }
    }

    /// Drop windows that have fully elapsed, at most once per window length.
    fn prune_expired(&self, state: &mut LimiterState, now: Instant) {
        if now.saturating_duration_since(state.last_prune) < self.window {
            return;
        }
        let before = state.windows.len();
        let window = self.window;
        state
            .windows
            .retain(|_, w| now.saturating_duration_since(w.started) < window);
        state.last_prune = now;

        let pruned = before - state.windows.len();
        if pruned > 0 {
            debug!(pruned, remaining = state.windows.len(), "Pruned expired rate-limit windows");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> FixedWindowLimiter {
        FixedWindowLimiter::new(&RateLimitConfig {
            window: Duration::from_secs(window_secs),
            max_requests,
            trust_proxy: false,
        })
    }

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.window, Duration::from_secs(900));
        assert_eq!(config.max_requests, 100);
        assert!(!config.trust_proxy);
    }

    #[tokio::test]
    async fn test_hundred_and_first_request_is_limited() {
        let limiter = limiter(100, 900);
        let t0 = Instant::now();

        for i in 0..100 {
            let decision = limiter.try_acquire_at("1.2.3.4", t0).await;
            assert!(decision.is_allowed(), "request {} should pass", i + 1);
        }

        let decision = limiter
            .try_acquire_at("1.2.3.4", t0 + Duration::from_secs(60))
            .await;
        assert_eq!(
            decision,
            RateLimitDecision::Limited {
                limit: 100,
                retry_after: Duration::from_secs(840),
            }
        );
    }

    #[tokio::test]
    async fn test_counter_resets_after_window() {
        let limiter = limiter(2, 900);
        let t0 = Instant::now();

        assert!(limiter.try_acquire_at("c", t0).await.is_allowed());
        assert!(limiter.try_acquire_at("c", t0).await.is_allowed());
        assert!(!limiter.try_acquire_at("c", t0).await.is_allowed());

        let later = t0 + Duration::from_secs(900);
        assert_eq!(
            limiter.try_acquire_at("c", later).await,
            RateLimitDecision::Allowed {
                limit: 2,
                remaining: 1,
                reset_after: Duration::from_secs(900),
            }
        );
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let limiter = limiter(1, 60);
        let t0 = Instant::now();

        assert!(limiter.try_acquire_at("a", t0).await.is_allowed());
        assert!(!limiter.try_acquire_at("a", t0).await.is_allowed());
        assert!(limiter.try_acquire_at("b", t0).await.is_allowed());
    }

    #[tokio::test]
    async fn test_expired_windows_are_pruned() {
        let limiter = limiter(5, 60);
        let t0 = Instant::now();

        limiter.try_acquire_at("a", t0).await;
        limiter.try_acquire_at("b", t0).await;
        assert_eq!(limiter.tracked_clients().await, 2);

        limiter
            .try_acquire_at("c", t0 + Duration::from_secs(120))
            .await;
        assert_eq!(limiter.tracked_clients().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_never_lose_counts() {
        let limiter = limiter(50, 900);
        let t0 = Instant::now();

        let handles: Vec<_> = (0..80)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.try_acquire_at("shared", t0).await })
            })
            .collect();

        let mut allowed = 0;
        for handle in handles {
            if handle.await.unwrap().is_allowed() {
                allowed += 1;
            }
        }
        assert_eq!(allowed, 50);
    }
}
