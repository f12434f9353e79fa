//! Shared HTTP client construction policy for scraper and AI traffic.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::Client;
use tracing::warn;

use super::BackendError;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Connect and read timeouts applied to every backend client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// TCP/TLS connect timeout.
    pub connect: Duration,
    /// Whole-request timeout.
    pub read: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read: Duration::from_secs(READ_TIMEOUT_SECS),
        }
    }
}

/// Builds an HTTP client with the shared timeout, User-Agent and compression policy.
///
/// # Errors
///
/// Returns [`BackendError`] when client construction fails.
pub fn build_http_client(
    timeouts: HttpTimeouts,
    user_agent: impl Into<String>,
) -> Result<Client, BackendError> {
    let user_agent = user_agent.into();
    match try_build(timeouts, &user_agent, false) {
        Err(BackendError::ClientPanic) => {
            // Some sandboxed environments panic when querying system proxy settings.
            warn!("HTTP client hit system proxy panic; building without proxy lookup");
            try_build(timeouts, &user_agent, true)
        }
        other => other,
    }
}

fn try_build(
    timeouts: HttpTimeouts,
    user_agent: &str,
    disable_proxy_lookup: bool,
) -> Result<Client, BackendError> {
    catch_unwind(AssertUnwindSafe(|| {
        let mut builder = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.read)
            .user_agent(user_agent)
            .gzip(true);
        if disable_proxy_lookup {
            builder = builder.no_proxy();
        }
        builder.build().map_err(BackendError::from)
    }))
    .map_err(|_| BackendError::ClientPanic)?
}
