//! Rate-limit classification and exponential backoff for queued calls.
//!
//! When a queued call fails, the error is classified into a [`FailureType`]:
//! - [`FailureType::RateLimited`] - the remote side is throttling; retried with backoff
//! - [`FailureType::Permanent`] - any other failure; surfaced to the caller immediately
//! - [`FailureType::Cancelled`] - synthetic failures produced by the queue itself
//!
//! [`RetryPolicy`] then decides whether to retry based on the failure type and
//! how many retries the item has already consumed.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use bookmarks_core::admission::{CallError, RetryDecision, RetryPolicy, classify_error};
//!
//! let policy = RetryPolicy::default();
//! let error = CallError::with_status("Too Many Requests", 429);
//!
//! match policy.should_retry(classify_error(&error), 0) {
//!     RetryDecision::Retry { delay, .. } => assert_eq!(delay, Duration::from_secs(2)),
//!     RetryDecision::DoNotRetry { reason } => panic!("unexpected: {reason}"),
//! }
//! ```

use std::time::Duration;

use tracing::{debug, instrument};

use super::CallError;
use super::constants::{
    DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES, RATE_LIMIT_CODE, RATE_LIMIT_MESSAGE, RATE_LIMIT_STATUS,
};

/// Classification of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Transient throttling by the remote side (message marker, code or HTTP 429).
    RateLimited,

    /// Any other failure of the wrapped call.
    Permanent,

    /// Cancellation or shutdown produced by the queue; never retried.
    Cancelled,
}

/// Decision on whether to retry a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Re-queue the call after the specified delay.
    Retry {
        /// How long to wait before re-queueing.
        delay: Duration,
        /// Retry number this will be (1-indexed).
        retry: u32,
    },

    /// Settle the caller with the failure.
    DoNotRetry {
        /// Human-readable reason why no retry is attempted.
        reason: String,
    },
}

/// Exponential backoff for rate-limited calls.
///
/// # Delay Calculation
///
/// ```text
/// delay = base_delay * 2^retry_count
/// ```
///
/// Growth is unbounded and has no jitter. With defaults (3 retries, 2s base)
/// the delays are 2s, 4s, 8s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial dispatch.
    max_retries: u32,

    /// Delay before the first retry.
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a retry policy with custom settings.
    #[must_use]
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Returns the configured retry budget.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the configured base delay.
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Determines whether to retry a failed call.
    ///
    /// `retry_count` is the number of retries the item has already consumed
    /// (0 after the initial dispatch fails).
    #[instrument(skip(self), fields(max_retries = self.max_retries))]
    pub fn should_retry(&self, failure_type: FailureType, retry_count: u32) -> RetryDecision {
        match failure_type {
            FailureType::Permanent => {
                return RetryDecision::DoNotRetry {
                    reason: "not a rate-limit failure".to_string(),
                };
            }
            FailureType::Cancelled => {
                return RetryDecision::DoNotRetry {
                    reason: "call was cancelled".to_string(),
                };
            }
            FailureType::RateLimited => {}
        }

        if retry_count >= self.max_retries {
            debug!(retry_count, "retry budget exhausted");
            return RetryDecision::DoNotRetry {
                reason: format!("max retries ({}) exhausted", self.max_retries),
            };
        }

        RetryDecision::Retry {
            delay: self.backoff_delay(retry_count),
            retry: retry_count + 1,
        }
    }

    /// Returns `base_delay * 2^retry_count`, saturating instead of overflowing.
    #[must_use]
    pub fn backoff_delay(&self, retry_count: u32) -> Duration {
        let factor = 2_u32.saturating_pow(retry_count);
        self.base_delay.saturating_mul(factor)
    }
}

/// Classifies a call failure for retry decisions.
///
/// A failure is rate-limited when any of these hold:
///
/// | Signal | Match |
/// |--------|-------|
/// | message | contains `Rate limit exceeded` |
/// | code | equals `RATE_LIMIT_EXCEEDED` |
/// | status | equals `429` |
#[must_use]
pub fn classify_error(error: &CallError) -> FailureType {
    match error {
        CallError::Remote {
            message,
            code,
            status,
        } => {
            if message.contains(RATE_LIMIT_MESSAGE)
                || code.as_deref() == Some(RATE_LIMIT_CODE)
                || *status == Some(RATE_LIMIT_STATUS)
            {
                FailureType::RateLimited
            } else {
                FailureType::Permanent
            }
        }
        CallError::Cancelled | CallError::QueueClosed | CallError::NoRuntime => {
            FailureType::Cancelled
        }
    }
}

/// Returns true if the failure is shaped like remote throttling.
#[must_use]
pub fn is_rate_limited(error: &CallError) -> bool {
    classify_error(error) == FailureType::RateLimited
}
