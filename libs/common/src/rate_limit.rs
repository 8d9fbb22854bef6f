//! Per-client request quota

use anyhow::{Result, anyhow};
use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};
use tracing::warn;

use crate::response::ApiResponse;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later.";

/// Rate limiter keyed by client address
pub type ClientRateLimiter = Arc<DefaultKeyedRateLimiter<IpAddr>>;

/// Allow `max_requests` per client per `window`, refilled evenly
pub fn client_rate_limiter(max_requests: u32, window: Duration) -> Result<ClientRateLimiter> {
    let burst = NonZeroU32::new(max_requests)
        .ok_or_else(|| anyhow!("Rate limit must allow at least one request"))?;
    let quota = Quota::with_period(window / max_requests)
        .ok_or_else(|| anyhow!("Rate limit window must be positive"))?
        .allow_burst(burst);

    Ok(Arc::new(RateLimiter::keyed(quota)))
}

// Requests without connection info share one bucket
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Middleware answering 429 once a client exhausts its quota
pub async fn enforce_rate_limit(
    State(limiter): State<ClientRateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_ip(&request);

    match limiter.check_key(&client) {
        Ok(_) => next.run(request).await,
        Err(_) => {
            warn!("Rate limit exceeded for {}", client);
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ApiResponse::failure(RATE_LIMIT_MESSAGE)),
            )
                .into_response()
        }
    }
}
