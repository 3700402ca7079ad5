//! Rate limiter for geolocation lookups
//!
//! The provider allows a fixed number of requests per minute. The limiter
//! keeps the grant times of the last `max_requests` lookups: below the cap
//! a lookup proceeds at once, at the cap it waits until the oldest grant
//! leaves the window. No `window` span ever holds more than `max_requests`
//! grants.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Sliding-window request budget
#[derive(Debug, Clone)]
pub struct RateWindow {
    max_requests: usize,
    window: Duration,
    grants: VecDeque<Instant>,
}

impl RateWindow {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let max_requests = max_requests.max(1) as usize;
        Self {
            max_requests,
            window,
            grants: VecDeque::with_capacity(max_requests),
        }
    }

    /// Requests per minute
    #[cfg(test)]
    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Number of grants still inside the current window
    #[cfg(test)]
    pub fn in_window(&self) -> usize {
        let now = Instant::now();
        self.grants
            .iter()
            .filter(|t| now.duration_since(**t) < self.window)
            .count()
    }

    /// Waits until one more request fits the budget, then records it
    pub async fn acquire(&mut self) {
        self.expire(Instant::now());

        if self.grants.len() >= self.max_requests {
            if let Some(oldest) = self.grants.pop_front() {
                let resume = oldest + self.window;
                tracing::info!(
                    "Geolocation budget of {} requests per {:?} reached, waiting {:?}",
                    self.max_requests,
                    self.window,
                    resume.saturating_duration_since(Instant::now())
                );
                sleep_until(resume).await;
            }
        }

        self.grants.push_back(Instant::now());
    }

    fn expire(&mut self, now: Instant) {
        while let Some(oldest) = self.grants.front() {
            if now.duration_since(*oldest) >= self.window {
                self.grants.pop_front();
            } else {
                break;
            }
        }
    }
}
