//! Global request rate limiting middleware.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::api::error::ApiError;
use crate::rate_limiter::{FixedWindowLimiter, RateLimitConfig, RateLimitDecision};

const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");
const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Shared state for [`rate_limit_middleware`].
#[derive(Debug, Clone)]
pub struct RateLimitState {
    limiter: FixedWindowLimiter,
    trust_proxy: bool,
}

impl RateLimitState {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            limiter: FixedWindowLimiter::new(config),
            trust_proxy: config.trust_proxy,
        }
    }

    pub fn limiter(&self) -> &FixedWindowLimiter {
        &self.limiter
    }
}

/// Derive the client key: peer IP, or the first forwarded hop behind a trusted proxy.
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy: bool,
) -> String {
    if trust_proxy {
        let forwarded = headers
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty());
        if let Some(hop) = forwarded {
            return hop.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Whole seconds, rounded up, as a header value.
fn seconds_header(duration: Duration) -> HeaderValue {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    HeaderValue::from(secs)
}

/// Count the request against its client's window; reject with 429 when exhausted.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer, state.trust_proxy);

    match state.limiter.try_acquire(&key).await {
        RateLimitDecision::Allowed {
            limit,
            remaining,
            reset_after,
        } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(RATELIMIT_LIMIT, HeaderValue::from(limit));
            headers.insert(RATELIMIT_REMAINING, HeaderValue::from(remaining));
            headers.insert(RATELIMIT_RESET, seconds_header(reset_after));
            response
        }
        RateLimitDecision::Limited { limit, retry_after } => {
            warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
            let mut response = ApiError::too_many_requests().into_response();
            let headers = response.headers_mut();
            headers.insert(RATELIMIT_LIMIT, HeaderValue::from(limit));
            headers.insert(RATELIMIT_REMAINING, HeaderValue::from(0u32));
            headers.insert(RATELIMIT_RESET, seconds_header(retry_after));
            headers.insert(RETRY_AFTER, seconds_header(retry_after));
            response
        }
    }
}
