use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::clock::Clock;

pub const DEFAULT_MAX_REQUESTS: usize = 10;
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60_000);

/// Slack added to a computed wait so the oldest admission has left the
/// window when the caller retries.
const RETRY_SLACK: Duration = Duration::from_millis(100);

/// Sliding-window limiter: at most `max_requests` admissions per `window`.
///
/// Waiters are not queued, so admission order among concurrent callers is
/// best-effort.
pub struct RateLimiter {
    clock: Arc<dyn Clock>,
    max_requests: usize,
    window: Duration,
    admitted: Mutex<VecDeque<u64>>,
}

impl RateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_limits(clock, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }

    pub fn with_limits(clock: Arc<dyn Clock>, max_requests: usize, window: Duration) -> Self {
        Self {
            clock,
            max_requests: max_requests.max(1),
            window,
            admitted: Mutex::new(VecDeque::new()),
        }
    }

    /// Completes once the caller is admitted.
    pub async fn admit(&self) {
        loop {
            let wait = match self.try_admit() {
                None => return,
                Some(wait) => wait,
            };
            tracing::debug!(wait_ms = wait.as_millis() as u64, "Rate limit reached, waiting");
            self.clock.sleep(wait).await;
        }
    }

    /// Admit immediately if there is room, otherwise return how long to wait.
    fn try_admit(&self) -> Option<Duration> {
        let now = self.clock.now_ms();
        let window_ms = self.window.as_millis() as u64;
        let mut admitted = self
            .admitted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let cutoff = now.saturating_sub(window_ms);
        while admitted.front().is_some_and(|&t| t <= cutoff) {
            admitted.pop_front();
        }

        if admitted.len() < self.max_requests {
            admitted.push_back(now);
            return None;
        }

        let oldest = admitted.front().copied().unwrap_or(now);
        let remaining = window_ms.saturating_sub(now.saturating_sub(oldest));
        Some(Duration::from_millis(remaining) + RETRY_SLACK)
    }

    /// Admissions currently inside the window.
    pub fn in_window(&self) -> usize {
        let cutoff = self
            .clock
            .now_ms()
            .saturating_sub(self.window.as_millis() as u64);
        self.admitted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|&&t| t > cutoff)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[tokio::test]
    async fn test_admits_up_to_limit_without_waiting() {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let limiter = RateLimiter::with_limits(clock.clone(), 3, Duration::from_secs(60));

        for _ in 0..3 {
            limiter.admit().await;
        }
        assert_eq!(clock.now_ms(), 1_000_000);
        assert_eq!(limiter.in_window(), 3);
    }

    #[tokio::test]
    async fn test_waits_for_oldest_to_leave_window() {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let limiter = RateLimiter::with_limits(clock.clone(), 2, Duration::from_millis(1_000));

        limiter.admit().await;
        clock.advance(Duration::from_millis(400));
        limiter.admit().await;

        limiter.admit().await;
        // oldest at t0, now t0+400: wait 600 + 100 slack
        assert_eq!(clock.now_ms(), 1_000_000 + 400 + 700);
    }

    #[tokio::test]
    async fn test_never_exceeds_limit_in_any_window() {
        let clock = Arc::new(ManualClock::new(0));
        let window = Duration::from_millis(1_000);
        let limiter = RateLimiter::with_limits(clock.clone(), 4, window);

        let mut stamps = Vec::new();
        for _ in 0..20 {
            limiter.admit().await;
            stamps.push(clock.now_ms());
            clock.advance(Duration::from_millis(30));
        }

        for (i, &start) in stamps.iter().enumerate() {
            let in_window = stamps[i..]
                .iter()
                .take_while(|&&t| t < start + window.as_millis() as u64)
                .count();
            assert!(in_window <= 4, "window starting at {start} admitted {in_window}");
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_all_admitted() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = Arc::new(RateLimiter::with_limits(
            clock.clone(),
            2,
            Duration::from_millis(500),
        ));

        let waits = (0..5).map(|_| {
            let limiter = limiter.clone();
            async move { limiter.admit().await }
        });
        futures::future::join_all(waits).await;

        assert!(clock.now_ms() >= 1_000);
    }
}
