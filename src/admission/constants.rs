//! Defaults and classifier markers for the admission queue.

use std::time::Duration;

/// Default minimum spacing between two dispatch starts (1 second).
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1000);

/// Default retry budget for rate-limited calls.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff (2 seconds).
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(2000);

/// Message substring that marks a failure as rate-limited.
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded";

/// Structured failure code that marks a failure as rate-limited.
pub const RATE_LIMIT_CODE: &str = "RATE_LIMIT_EXCEEDED";

/// HTTP status that marks a failure as rate-limited.
pub const RATE_LIMIT_STATUS: u16 = 429;
