//! Advisory per-client rate limiting.
//!
//! Fixed window per client IP. Purely advisory to intake: limiter failures
//! never block a request, and the quota header is best-effort.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;

use super::state::AppState;
use super::types::{ApiResponse, error_codes};

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    used: u32,
}

pub enum Quota {
    Allowed { remaining: u32 },
    Exceeded,
}

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: DashMap<IpAddr, Window>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: DashMap::new(),
        }
    }

    /// Consume one unit of quota for `client`.
    pub fn check(&self, client: IpAddr) -> Quota {
        let mut entry = self.windows.entry(client).or_insert(Window {
            started: Instant::now(),
            used: 0,
        });

        // Quota resets once the window has elapsed.
        if entry.started.elapsed() >= self.window {
            entry.started = Instant::now();
            entry.used = 0;
        }

        if entry.used >= self.max_requests {
            return Quota::Exceeded;
        }

        entry.used += 1;
        Quota::Allowed {
            remaining: self.max_requests - entry.used,
        }
    }
}

pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<ApiResponse<()>>)> {
    let Some(limiter) = &state.limiter else {
        return Ok(next.run(request).await);
    };

    match limiter.check(addr.ip()) {
        Quota::Exceeded => Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(ApiResponse::<()>::error(
                error_codes::RATE_LIMITED,
                "please slow down the rate of your requests",
            )),
        )),
        Quota::Allowed { remaining } => {
            let mut response = next.run(request).await;
            if let Ok(value) = HeaderValue::from_str(&remaining.to_string()) {
                response.headers_mut().insert("request-quota-left", value);
            }
            Ok(response)
        }
    }
}
