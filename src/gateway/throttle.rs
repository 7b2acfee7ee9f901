//! Per-endpoint request spacing.
//!
//! The backend rate-limits aggressively, so requests to the same
//! `(endpoint, query)` key are spaced at least one window apart. A caller
//! that arrives early suspends until the window elapses; it is never
//! dropped.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

pub struct Throttle {
    window: Duration,
    last_request: DashMap<String, Instant>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_request: DashMap::new(),
        }
    }

    /// Wait until this key is allowed to issue a request, then claim the
    /// slot. Claiming happens before the request goes out so that a slow
    /// response does not let a second caller slip through early.
    pub async fn acquire(&self, key: &str) {
        let wait = {
            match self.last_request.get(key) {
                Some(last) => {
                    let elapsed = last.elapsed();
                    if elapsed < self.window {
                        Some(self.window - elapsed)
                    } else {
                        None
                    }
                }
                None => None,
            }
        };

        if let Some(wait) = wait {
            tracing::debug!(key, ?wait, "throttling request");
            tokio::time::sleep(wait).await;
        }

        self.last_request.insert(key.to_string(), Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let throttle = Throttle::new(Duration::from_millis(500));
        let before = Instant::now();
        throttle.acquire("pending-rides?").await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_acquire_waits_out_the_window() {
        let throttle = Throttle::new(Duration::from_millis(500));
        throttle.acquire("pending-rides?").await;

        tokio::time::advance(Duration::from_millis(200)).await;
        let before = Instant::now();
        throttle.acquire("pending-rides?").await;
        // Delayed by the remaining 300ms, not dropped.
        assert_eq!(before.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_after_window_is_immediate() {
        let throttle = Throttle::new(Duration::from_millis(500));
        throttle.acquire("dashboard-stats?").await;

        tokio::time::advance(Duration::from_millis(501)).await;
        let before = Instant::now();
        throttle.acquire("dashboard-stats?").await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let throttle = Throttle::new(Duration::from_millis(500));
        throttle.acquire("pending-rides?").await;

        let before = Instant::now();
        throttle.acquire("active-rides?").await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
