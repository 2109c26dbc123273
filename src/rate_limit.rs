//! Per-client request limiting.
//!
//! Each client, identified by the IP address of its TCP peer, gets a window
//! opened by its first request. Requests are counted until the window
//! elapses, at which point the counter starts over.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use actix_web::{web, HttpResponse};
use actix_web_lab::middleware::Next;

use crate::config::RateLimitSettings;

const PRUNE_THRESHOLD: usize = 10_000;

struct Window {
    started_at: Instant,
    hits: u32,
}

/// Outcome of counting one request against a client's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

impl RateLimitDecision {
    fn write_headers(&self, headers: &mut HeaderMap) {
        headers.insert(
            HeaderName::from_static("ratelimit-limit"),
            HeaderValue::from(self.limit),
        );
        headers.insert(
            HeaderName::from_static("ratelimit-remaining"),
            HeaderValue::from(self.remaining),
        );
        headers.insert(
            HeaderName::from_static("ratelimit-reset"),
            HeaderValue::from(self.reset_seconds()),
        );
    }

    fn reset_seconds(&self) -> u64 {
        let seconds = self.reset_after.as_secs();
        if self.reset_after.subsec_nanos() > 0 {
            seconds + 1
        } else {
            seconds
        }
    }
}

#[derive(Default)]
struct Clients {
    windows: HashMap<IpAddr, Window>,
    last_pruned: Option<Instant>,
}

impl Clients {
    /// Drops elapsed windows, at most once per window length.
    fn prune(&mut self, now: Instant, window: Duration) {
        if self.windows.len() <= PRUNE_THRESHOLD {
            return;
        }
        if let Some(at) = self.last_pruned {
            if now.saturating_duration_since(at) < window {
                return;
            }
        }
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started_at) < window);
        self.last_pruned = Some(now);
    }
}

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: Mutex<Clients>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Mutex::new(Clients::default()),
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(settings.max_requests, settings.window())
    }

    /// Counts a request from `client` and tells whether it may proceed.
    pub fn check(&self, client: IpAddr) -> RateLimitDecision {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> RateLimitDecision {
        // The increment and the comparison happen under the same lock.
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        clients.prune(now, self.window);

        let entry = clients.windows.entry(client).or_insert(Window {
            started_at: now,
            hits: 0,
        });
        if now.saturating_duration_since(entry.started_at) >= self.window {
            entry.started_at = now;
            entry.hits = 0;
        }
        entry.hits = entry.hits.saturating_add(1);

        RateLimitDecision {
            allowed: entry.hits <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(entry.hits),
            reset_after: self
                .window
                .saturating_sub(now.saturating_duration_since(entry.started_at)),
        }
    }
}

/// Rejects requests from clients over their limit with a `429`.
///
/// Requests pass through untouched when no [`RateLimiter`] is registered
/// as app data or the peer address is unknown.
pub async fn enforce_rate_limit(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    let limiter = req.app_data::<web::Data<RateLimiter>>().cloned();
    let client = req.peer_addr().map(|addr| addr.ip());

    let (limiter, client) = match (limiter, client) {
        (Some(limiter), Some(client)) => (limiter, client),
        _ => return Ok(next.call(req).await?.map_into_boxed_body()),
    };

    let decision = limiter.check(client);
    if !decision.allowed {
        tracing::warn!(%client, "Rate limit exceeded");
        let response = HttpResponse::TooManyRequests()
            .insert_header((RETRY_AFTER, HeaderValue::from(decision.reset_seconds())))
            .body("Too many requests, please try again later.");
        let mut response = req.into_response(response);
        decision.write_headers(response.headers_mut());
        return Ok(response);
    }

    let mut response = next.call(req).await?.map_into_boxed_body();
    decision.write_headers(response.headers_mut());
    Ok(response)
}
