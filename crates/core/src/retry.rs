//! Retry policy for calls to the remote presentation service.

use crate::{Error, Result};
use std::time::Duration;

/// How often, and how patiently, collaborator calls are retried.
///
/// Rate-limited failures are retried up to `max_attempts` times after
/// `rate_limit_delay`. Any other collaborator failure lowers the budget to
/// `error_max_attempts` and waits `error_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed while failures are only rate limits.
    pub max_attempts: usize,
    /// Total attempts allowed once any other failure has been seen.
    pub error_max_attempts: usize,
    /// Wait after a rate-limited failure.
    pub rate_limit_delay: Duration,
    /// Wait after any other failure.
    pub error_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            error_max_attempts: 3,
            rate_limit_delay: Duration::from_secs(60),
            error_delay: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            error_max_attempts: 1,
            rate_limit_delay: Duration::ZERO,
            error_delay: Duration::ZERO,
        }
    }

    /// Set both delays.
    pub fn with_delays(mut self, rate_limit_delay: Duration, error_delay: Duration) -> Self {
        self.rate_limit_delay = rate_limit_delay;
        self.error_delay = error_delay;
        self
    }

    /// Run `op`, retrying collaborator failures according to this policy.
    ///
    /// Errors other than [`Error::RateLimited`] and [`Error::Collaborator`]
    /// are returned immediately.
    pub fn run<T, F>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut budget = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let err = match op() {
                Ok(value) => return Ok(value),
                Err(err @ (Error::RateLimited(_) | Error::Collaborator(_))) => err,
                Err(err) => return Err(err),
            };

            let delay = if err.is_rate_limited() {
                self.rate_limit_delay
            } else {
                budget = budget.min(self.error_max_attempts.max(1));
                self.error_delay
            };

            if attempt >= budget {
                log::warn!("Too many retries for {}", label);
                return Err(Error::RetriesExhausted {
                    label: label.to_string(),
                    attempts: attempt,
                    last: err.to_string(),
                });
            }

            log::warn!(
                "{} failed (attempt {}/{}), retrying in {:?}: {}",
                label,
                attempt,
                budget,
                delay,
                err
            );
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }
    }
}
