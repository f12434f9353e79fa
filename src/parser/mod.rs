//! Parsing of pasted URL lists.
//!
//! # Example
//!
//! ```
//! use bookmarks_core::parser::validate_urls;
//!
//! let urls = validate_urls("https://example.com/page\nexample.org");
//! assert_eq!(urls, vec!["https://example.com/page", "https://example.org/"]);
//! ```

mod error;
mod url;

pub use error::ParseError;
pub use url::{LineResult, check_url_lines, validate_urls};
