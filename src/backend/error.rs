//! Construction errors for HTTP-backed collaborators.

use thiserror::Error;

/// Failure to set up a backend client.
#[derive(Debug, Error)]
pub enum BackendError {
    /// reqwest rejected the client configuration.
    #[error("HTTP client construction failed: {0}")]
    ClientBuild(#[from] reqwest::Error),

    /// Client construction panicked while reading system proxy settings.
    #[error("HTTP client construction panicked while initializing networking")]
    ClientPanic,

    /// The configured endpoint is not a usable base URL.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The configured endpoint
        endpoint: String,
        /// Why it was rejected
        reason: String,
    },
}
