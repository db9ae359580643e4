//! Retry and backoff for remote queries.
//!
//! A single query is modelled as a small state machine:
//!
//! ```text
//! Attempting ──ok──────────────▶ Resolved
//!     │
//!     └─failure─▶ BackingOff ──sleep──▶ Attempting
//!     └─failure, budget spent─▶ Exhausted
//! ```
//!
//! [`RetryPolicy::next_state`] is the pure transition out of `Attempting`.
//! [`drive`] runs the machine and performs the only suspension through an
//! injected [`Sleeper`], so tests never wait on a real clock.

use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::SelectorConfig;

/// Rate-limit hints reported alongside a rate-limit response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Explicit "retry after N seconds" directive.
    pub retry_after: Option<u64>,
    /// Remaining quota in the current window.
    pub remaining: Option<u64>,
    /// Instant (epoch seconds) at which the quota resets.
    pub reset_at: Option<i64>,
}

/// A failed attempt that may be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {status}")]
    Http { status: u16 },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("rate limit exceeded")]
    RateLimited(RateLimitInfo),
}

impl AttemptFailure {
    #[must_use]
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

/// State of a single retried query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryState<T> {
    Attempting {
        retry: u32,
    },
    BackingOff {
        retry: u32,
        wait: Duration,
        cause: AttemptFailure,
    },
    Exhausted {
        attempts: u32,
        last_error: AttemptFailure,
    },
    Resolved(T),
}

/// Terminal result of [`drive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    Resolved(T),
    Exhausted {
        attempts: u32,
        last_error: AttemptFailure,
    },
}

/// Shared retry budget and backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Network calls allowed per query, across rate-limit and transient
    /// failures combined.
    pub max_attempts: u32,
    /// Base delay for exponential backoff.
    pub base_wait: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_wait: Duration) -> Self {
        Self {
            max_attempts,
            base_wait,
        }
    }

    pub fn from_config(config: &SelectorConfig) -> Self {
        Self::new(config.max_attempts, config.base_wait)
    }

    /// `base_wait * 2^retry`, saturating.
    #[must_use]
    pub fn exponential_wait(&self, retry: u32) -> Duration {
        self.base_wait.saturating_mul(2u32.saturating_pow(retry))
    }

    /// Wait after a rate-limit signal.
    ///
    /// Precedence: explicit `retry_after`, then the reset instant when the
    /// quota is spent (never negative), then exponential backoff.
    #[must_use]
    pub fn rate_limit_wait(&self, info: &RateLimitInfo, retry: u32, now: DateTime<Utc>) -> Duration {
        if let Some(secs) = info.retry_after {
            return Duration::from_secs(secs);
        }
        if info.remaining == Some(0) {
            if let Some(reset_at) = info.reset_at {
                let secs = reset_at.saturating_sub(now.timestamp()).max(0);
                return Duration::from_secs(secs.unsigned_abs());
            }
        }
        self.exponential_wait(retry)
    }

    /// Transition out of `Attempting { retry }` given the attempt's outcome.
    ///
    /// Returns the next state and, when backing off, how long to wait.
    /// A failure that would bring the attempt count to `max_attempts`
    /// exhausts the query without waiting.
    pub fn next_state<T>(
        &self,
        retry: u32,
        outcome: Result<T, AttemptFailure>,
        now: DateTime<Utc>,
    ) -> (RetryState<T>, Option<Duration>) {
        let failure = match outcome {
            Ok(value) => return (RetryState::Resolved(value), None),
            Err(failure) => failure,
        };

        let attempts = retry.saturating_add(1);
        if attempts >= self.max_attempts {
            return (
                RetryState::Exhausted {
                    attempts,
                    last_error: failure,
                },
                None,
            );
        }

        let wait = match &failure {
            AttemptFailure::RateLimited(info) => self.rate_limit_wait(info, retry, now),
            _ => self.exponential_wait(retry),
        };
        (
            RetryState::BackingOff {
                retry: attempts,
                wait,
                cause: failure,
            },
            Some(wait),
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&SelectorConfig::default())
    }
}

/// Suspends the caller between attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Blocks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

/// Run `attempt` until it resolves or the retry budget is spent.
///
/// `attempt` receives the current retry count (0 for the first call).
pub fn drive<T, S, F>(policy: &RetryPolicy, sleeper: &S, mut attempt: F) -> RetryOutcome<T>
where
    S: Sleeper + ?Sized,
    F: FnMut(u32) -> Result<T, AttemptFailure>,
{
    let mut state = RetryState::Attempting { retry: 0 };
    loop {
        state = match state {
            RetryState::Attempting { retry } => {
                let outcome = attempt(retry);
                policy.next_state(retry, outcome, Utc::now()).0
            }
            RetryState::BackingOff { retry, wait, cause } => {
                if cause.is_rate_limit() {
                    tracing::warn!(
                        retry,
                        wait_secs = wait.as_secs(),
                        "Rate limit exceeded, waiting before retrying"
                    );
                } else {
                    tracing::warn!(
                        error = %cause,
                        retry,
                        wait_secs = wait.as_secs(),
                        "Request failed, retrying"
                    );
                }
                sleeper.sleep(wait);
                RetryState::Attempting { retry }
            }
            RetryState::Exhausted {
                attempts,
                last_error,
            } => {
                return RetryOutcome::Exhausted {
                    attempts,
                    last_error,
                }
            }
            RetryState::Resolved(value) => return RetryOutcome::Resolved(value),
        };
    }
}
