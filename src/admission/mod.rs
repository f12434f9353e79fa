//! Admission control for calls to a scarce, throttled remote resource.
//!
//! Every call to the AI text generator or the page scraper goes through an
//! [`AdmissionQueue`]: it spaces dispatches at least `min_interval` apart,
//! retries rate-limited failures with exponential backoff, and exposes the
//! queue depth for live status indicators.
//!
//! # Overview
//!
//! - [`AdmissionQueue`] - the single-flight FIFO dispatcher
//! - [`RetryPolicy`] / [`classify_error`] - rate-limit classification and backoff
//! - [`CallError`] - failure type shared by queued calls and their callers
//!
//! One queue instance guards one resource class. Callers hold an explicit
//! handle (clone it to share); there is no process-global queue.

mod constants;
mod error;
mod queue;
mod retry;

pub use constants::{
    DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES, DEFAULT_MIN_INTERVAL, RATE_LIMIT_CODE,
    RATE_LIMIT_MESSAGE, RATE_LIMIT_STATUS,
};
pub use error::CallError;
pub use queue::{Admission, AdmissionConfig, AdmissionQueue, QueueStatus};
pub use retry::{FailureType, RetryDecision, RetryPolicy, classify_error, is_rate_limited};
