//! Keyword and AI-assisted bookmark search.
//!
//! Keyword matching always runs. The AI text generator is consulted only for
//! queries that look conversational or that keyword matching cannot answer,
//! and any AI failure degrades to the keyword results.

mod keyword;
mod prompt;
mod service;

pub use keyword::{keyword_matches, should_use_ai};
pub use prompt::{AI_BOOKMARK_LIMIT, NO_MATCHES, build_prompt, parse_ai_response};
pub use service::{AI_MAX_TOKENS, AI_MODEL, SearchOutcome, SearchService};
