//! Retry policy for transient request failures
//!
//! Both the page fetcher and the geolocation resolver retry failed requests
//! after a fixed delay. By default the number of attempts is unbounded: a
//! fetch is never abandoned, only postponed.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Delay used between attempts unless configured otherwise
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Fixed-delay retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    delay: Duration,
    max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded(DEFAULT_RETRY_DELAY)
    }
}

impl RetryPolicy {
    /// Retries forever, sleeping `delay` between attempts
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Caps the total number of attempts (the first try included)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Returns true if another attempt may follow `attempts_made` failed ones
    pub fn allows_retry(&self, attempts_made: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempts_made < max,
            None => true,
        }
    }

    /// Logs a failed attempt and sleeps for the configured delay
    pub async fn pause(&self, what: &str, attempt: u32, error: &dyn Display) {
        tracing::warn!(
            "{} failed (attempt {}): {}. Retrying in {:?}",
            what,
            attempt,
            error,
            self.delay
        );
        tokio::time::sleep(self.delay).await;
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or
    /// the attempt budget runs out
    ///
    /// # Arguments
    ///
    /// * `what` - Short description used in retry log lines
    /// * `op` - Produces one attempt per call
    /// * `is_retryable` - Decides whether an error is transient
    pub async fn run<T, E, F, Fut, P>(&self, what: &str, mut op: F, is_retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if is_retryable(&e) && self.allows_retry(attempt) => {
                    self.pause(what, attempt, &e).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
