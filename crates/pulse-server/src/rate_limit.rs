use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use pulse_types::envelope::Envelope;

/// Fixed-window request limiter keyed by client IP, applied uniformly at the
/// edge. Counters reset when their window elapses; no per-resource tuning.
#[derive(Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<LimiterState>>,
    max_requests: u32,
    window: Duration,
}

struct LimiterState {
    windows: HashMap<IpAddr, Window>,
    last_sweep: Instant,
}

struct Window {
    started: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(LimiterState {
                windows: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            max_requests,
            window,
        }
    }

    fn check(&self, ip: IpAddr, now: Instant) -> bool {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // drop expired windows at most once per window, so the map stays
        // bounded by the number of clients seen in the current window
        if now.duration_since(state.last_sweep) >= self.window {
            let window = self.window;
            state
                .windows
                .retain(|_, w| now.duration_since(w.started) < window);
            state.last_sweep = now;
        }

        let entry = state.windows.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        entry.count += 1;
        entry.count <= self.max_requests
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.state.lock().unwrap().windows.len()
    }
}

pub async fn limit(
    State(limiter): State<RateLimiter>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Response {
    if !limiter.check(addr.ip(), Instant::now()) {
        warn!("rate limit exceeded for {}", addr.ip());
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(Envelope::<()>::error(429, "too many requests")),
        )
            .into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_limits_and_resets() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        let t0 = Instant::now();

        assert!(limiter.check(ip, t0));
        assert!(limiter.check(ip, t0));
        assert!(limiter.check(ip, t0));
        assert!(!limiter.check(ip, t0));

        // a fresh window admits requests again
        let t1 = t0 + Duration::from_secs(61);
        assert!(limiter.check(ip, t1));
    }

    #[test]
    fn test_expired_windows_are_evicted() {
        let limiter = RateLimiter::new(10, Duration::from_secs(60));
        let t0 = Instant::now();

        for i in 0..100u32 {
            let ip: IpAddr = format!("10.0.{}.{}", i / 256, i % 256).parse().unwrap();
            limiter.check(ip, t0);
        }
        assert_eq!(limiter.tracked_clients(), 100);

        // the first request of a later window sweeps every stale entry
        let t1 = t0 + Duration::from_secs(3600);
        let fresh: IpAddr = "192.168.1.1".parse().unwrap();
        assert!(limiter.check(fresh, t1));
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_clients_are_tracked_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check(a, t0));
        assert!(!limiter.check(a, t0));
        assert!(limiter.check(b, t0));
    }
}
