//! Error types for URL-list parsing.

use thiserror::Error;

/// Reason a line of pasted input was not accepted as a URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Line parsed as a URL but is not a web URL, or did not parse at all
    #[error("invalid URL '{line}': {reason}\n  Suggestion: {suggestion}")]
    InvalidUrl {
        /// The trimmed input line
        line: String,
        /// Why the line was rejected
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// Line does not look like a URL or a bare domain
    #[error("not a URL: '{line}'")]
    NotUrlLike {
        /// The trimmed input line
        line: String,
    },
}

impl ParseError {
    /// Creates an `InvalidUrl` error for a non-web URL scheme.
    #[must_use]
    pub fn unsupported_scheme(line: &str, scheme: &str) -> Self {
        Self::InvalidUrl {
            line: line.to_string(),
            reason: format!("scheme '{scheme}' is not supported"),
            suggestion: "Use http:// or https:// URLs".to_string(),
        }
    }

    /// Creates an `InvalidUrl` error for a line that failed to parse.
    #[must_use]
    pub fn malformed(line: &str, parse_error: &str) -> Self {
        Self::InvalidUrl {
            line: line.to_string(),
            reason: parse_error.to_string(),
            suggestion: "Check the URL format and try again".to_string(),
        }
    }

    /// Creates a `NotUrlLike` error.
    #[must_use]
    pub fn not_url_like(line: &str) -> Self {
        Self::NotUrlLike {
            line: line.to_string(),
        }
    }

    /// Returns the rejected input line.
    #[must_use]
    pub fn line(&self) -> &str {
        match self {
            Self::InvalidUrl { line, .. } | Self::NotUrlLike { line } => line,
        }
    }
}
