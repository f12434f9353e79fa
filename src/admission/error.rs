//! Error types for calls routed through the admission queue.
//!
//! A [`CallError`] is what a wrapped call fails with, and what the caller's
//! future eventually resolves to when the call permanently fails. It carries
//! the three signals the rate-limit classifier inspects: a message, an
//! optional structured code and an optional HTTP-style status.

use thiserror::Error;

/// Failure of a call submitted to an [`AdmissionQueue`](super::AdmissionQueue).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The wrapped call itself failed.
    #[error("{message}")]
    Remote {
        /// Human-readable failure message.
        message: String,
        /// Structured failure code reported by the remote side, if any.
        code: Option<String>,
        /// HTTP-style status reported by the remote side, if any.
        status: Option<u16>,
    },

    /// The call was still queued when the queue was cleared.
    #[error("Request cancelled")]
    Cancelled,

    /// The drain task went away without settling the call.
    #[error("admission queue shut down before the call was settled")]
    QueueClosed,

    /// The call was submitted outside a Tokio runtime, so no drain loop could start.
    #[error("admission queue used outside a Tokio runtime")]
    NoRuntime,
}

impl CallError {
    /// Creates a remote failure with only a message.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            code: None,
            status: None,
        }
    }

    /// Creates a remote failure carrying an HTTP-style status.
    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self::Remote {
            message: message.into(),
            code: None,
            status: Some(status),
        }
    }

    /// Creates a remote failure carrying a structured code.
    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            code: Some(code.into()),
            status: None,
        }
    }

    /// Returns the structured code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Remote { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Returns the HTTP-style status, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => *status,
            _ => None,
        }
    }
}
