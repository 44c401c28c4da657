//! Retry policy for order submission.
//!
//! The policy bounds total attempts, computes the wait before each
//! resubmission and decides which broker faults are worth retrying.

use std::time::Duration;

use super::error::BrokerFault;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed,
    Exponential { factor: f64 },
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total submissions allowed, including the first.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff: Backoff,
    pub retryable: fn(&BrokerFault) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            backoff: Backoff::Exponential { factor: 2.0 },
            retryable: BrokerFault::is_retryable,
        }
    }
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            initial_delay: delay,
            backoff: Backoff::Fixed,
            retryable: BrokerFault::is_retryable,
        }
    }

    pub fn exponential(max_attempts: u32, initial_delay: Duration, factor: f64) -> Self {
        RetryPolicy {
            max_attempts,
            initial_delay,
            backoff: Backoff::Exponential { factor },
            retryable: BrokerFault::is_retryable,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_attempts.saturating_sub(1)
    }

    /// Wait before the `retry`-th resubmission (1-based). Saturates at
    /// `Duration::MAX` instead of overflowing.
    pub fn delay_for(&self, retry: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.initial_delay,
            Backoff::Exponential { factor } => {
                let exp = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
                let secs = self.initial_delay.as_secs_f64() * factor.powi(exp);
                Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
            }
        }
    }

    /// Whether another submission should follow a fault on attempt `attempts`.
    pub fn should_retry(&self, fault: &BrokerFault, attempts: u32) -> bool {
        (self.retryable)(fault) && attempts < self.max_attempts
    }
}

/// Blocking wait between attempts. Tests substitute a recorder.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
