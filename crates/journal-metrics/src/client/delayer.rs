//! Adaptive inter-request delay.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::trace;

/// Shared backoff cursor into an ascending delay table.
///
/// A failure anywhere moves every caller one step up the table; a success
/// anywhere drops everyone back to the first entry.
#[derive(Debug)]
pub struct AdaptiveDelayer {
    delays: Vec<Duration>,
    index: Mutex<usize>,
    successes: AtomicU64,
    failures: AtomicU64,
}

impl AdaptiveDelayer {
    /// Create a delayer over `delays` (expected ascending).
    #[must_use]
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays, index: Mutex::new(0), successes: AtomicU64::new(0), failures: AtomicU64::new(0) }
    }

    /// Record an outcome and sleep for the resulting delay.
    ///
    /// Returns the delay slept. The lock covers only the index update.
    pub async fn wait(&self, success: bool) -> Duration {
        let delay = self.advance(success);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }

    /// Update the index for an outcome and return the delay it selects.
    fn advance(&self, success: bool) -> Duration {
        if success {
            self.successes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }

        let Some(last) = self.delays.len().checked_sub(1) else {
            return Duration::ZERO;
        };

        let mut index = self.index.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *index = if success { 0 } else { (*index + 1).min(last) };
        let delay = self.delays[*index];
        trace!(index = *index, delay_ms = delay.as_millis() as u64, success, "Adaptive delay");
        delay
    }

    /// Current index into the delay table.
    #[must_use]
    pub fn current_index(&self) -> usize {
        *self.index.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Number of `wait(true)` calls so far.
    #[must_use]
    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    /// Number of `wait(false)` calls so far.
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl Default for AdaptiveDelayer {
    fn default() -> Self {
        Self::new(crate::config::api::DELAYS_MS.iter().copied().map(Duration::from_millis).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(values: &[u64]) -> Vec<Duration> {
        values.iter().copied().map(Duration::from_millis).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_escalates_and_caps() {
        let delayer = AdaptiveDelayer::new(ms(&[10, 20, 30]));

        assert_eq!(delayer.wait(false).await, Duration::from_millis(20));
        assert_eq!(delayer.wait(false).await, Duration::from_millis(30));
        assert_eq!(delayer.wait(false).await, Duration::from_millis(30));
        assert_eq!(delayer.current_index(), 2);
        assert_eq!(delayer.failures(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets() {
        let delayer = AdaptiveDelayer::new(ms(&[10, 20, 30]));
        delayer.wait(false).await;
        delayer.wait(false).await;

        assert_eq!(delayer.wait(true).await, Duration::from_millis(10));
        assert_eq!(delayer.current_index(), 0);
        assert_eq!(delayer.successes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_table() {
        let delayer = AdaptiveDelayer::default();
        assert_eq!(delayer.wait(true).await, Duration::from_millis(200));
        for _ in 0..10 {
            delayer.wait(false).await;
        }
        assert_eq!(delayer.wait(false).await, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_empty_table_is_zero_delay() {
        let delayer = AdaptiveDelayer::new(Vec::new());
        assert_eq!(delayer.wait(false).await, Duration::ZERO);
        assert_eq!(delayer.wait(true).await, Duration::ZERO);
        assert_eq!(delayer.failures(), 1);
    }
}
