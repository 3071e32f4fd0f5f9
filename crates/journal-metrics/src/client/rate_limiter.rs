//! Sliding-window request rate limiter.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

const WINDOW: Duration = Duration::from_secs(1);

/// Admits at most `limit` calls in any trailing one-second window.
///
/// Shared by every fetch of a run. The window lives behind a tokio mutex, so
/// callers are admitted in the order they acquire the lock and a sleeping
/// caller holds everyone else back until its slot frees up.
#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    window: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter for `requests_per_second` calls (0 is treated as 1).
    #[must_use]
    pub fn new(requests_per_second: usize) -> Self {
        let limit = requests_per_second.max(1);
        debug!(limit, "Created rate limiter");
        Self { limit, window: Mutex::new(VecDeque::with_capacity(limit)) }
    }

    /// Configured ceiling.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Suspend until one more call fits in the window, then record it.
    pub async fn wait_if_needed(&self) {
        let mut window = self.window.lock().await;

        prune(&mut window, Instant::now());
        if window.len() >= self.limit {
            if let Some(&oldest) = window.front() {
                let wait = WINDOW.saturating_sub(Instant::now().saturating_duration_since(oldest));
                if !wait.is_zero() {
                    debug!(wait_ms = wait.as_millis() as u64, "Rate limiter: waiting");
                    sleep(wait).await;
                }
            }
            prune(&mut window, Instant::now());
        }

        window.push_back(Instant::now());
    }

    /// Calls recorded in the current window.
    pub async fn in_flight(&self) -> usize {
        let mut window = self.window.lock().await;
        prune(&mut window, Instant::now());
        window.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(crate::config::api::REQUESTS_PER_SECOND)
    }
}

fn prune(window: &mut VecDeque<Instant>, now: Instant) {
    while window.front().is_some_and(|t| now.saturating_duration_since(*t) >= WINDOW) {
        window.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_calls_under_limit_do_not_wait() {
        let limiter = RateLimiter::new(3);
        let start = Instant::now();

        for _ in 0..3 {
            limiter.wait_if_needed().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.in_flight().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_over_limit_waits_for_window() {
        let limiter = RateLimiter::new(2);
        let start = Instant::now();

        for _ in 0..3 {
            limiter.wait_if_needed().await;
        }

        assert!(start.elapsed() >= WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_more_than_limit_in_any_window() {
        let limiter = Arc::new(RateLimiter::new(4));
        let stamps = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..12 {
            let limiter = Arc::clone(&limiter);
            let stamps = Arc::clone(&stamps);
            handles.push(tokio::spawn(async move {
                limiter.wait_if_needed().await;
                stamps.lock().unwrap().push(Instant::now());
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut stamps = stamps.lock().unwrap().clone();
        stamps.sort();
        for (i, t) in stamps.iter().enumerate() {
            let in_window = stamps[i..].iter().take_while(|s| s.duration_since(*t) < WINDOW).count();
            assert!(in_window <= 4, "window starting at call {i} admitted {in_window}");
        }
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        assert_eq!(RateLimiter::new(0).limit(), 1);
    }
}
