//! Search orchestration: keyword results first, AI results merged in when useful.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::keyword::{keyword_matches, should_use_ai};
use super::prompt::{build_prompt, parse_ai_response};
use crate::admission::{AdmissionQueue, is_rate_limited};
use crate::backend::{TextGenerator, TextRequest};
use crate::store::Bookmark;

/// Model requested for search prompts.
pub const AI_MODEL: &str = "gpt-4o-mini";

/// Token cap for search responses.
pub const AI_MAX_TOKENS: u32 = 150;

/// Results of one search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    /// Matching bookmarks, keyword hits first, without duplicate ids.
    pub results: Vec<Bookmark>,
    /// True when an AI response contributed to `results`.
    pub used_ai: bool,
    /// AI failure message when the lookup was attempted and failed.
    pub ai_error: Option<String>,
    /// True when that failure was rate-limit shaped.
    pub rate_limited: bool,
}

/// Runs keyword search and, when warranted, an AI lookup through the admission queue.
#[derive(Clone)]
pub struct SearchService {
    queue: AdmissionQueue,
    generator: Arc<dyn TextGenerator>,
    model: String,
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl SearchService {
    /// Creates a service using [`AI_MODEL`].
    #[must_use]
    pub fn new(queue: AdmissionQueue, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            queue,
            generator,
            model: AI_MODEL.to_string(),
        }
    }

    /// Overrides the model identifier sent with each request.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Searches `bookmarks` for `query`.
    ///
    /// A blank query yields no results and no AI call. When `allow_ai` is
    /// false only keyword matching runs. AI failures never fail the search.
    #[instrument(skip(self, bookmarks), fields(bookmarks = bookmarks.len()))]
    pub async fn search(&self, query: &str, bookmarks: &[Bookmark], allow_ai: bool) -> SearchOutcome {
        if query.trim().is_empty() {
            return SearchOutcome::default();
        }

        let keyword_hits = keyword_matches(bookmarks, query);
        debug!(hits = keyword_hits.len(), "keyword search complete");

        if !allow_ai || bookmarks.is_empty() || !should_use_ai(query, keyword_hits.len()) {
            return SearchOutcome {
                results: keyword_hits,
                ..SearchOutcome::default()
            };
        }

        let request = TextRequest {
            prompt: build_prompt(query, bookmarks),
            max_tokens: AI_MAX_TOKENS,
            model: self.model.clone(),
        };
        let generator = Arc::clone(&self.generator);
        let response = self
            .queue
            .add(move || {
                let generator = Arc::clone(&generator);
                let request = request.clone();
                async move { generator.generate_text(&request).await }
            })
            .await;

        match response {
            Ok(generated) => {
                let Some(titles) = parse_ai_response(&generated.text) else {
                    info!("AI reported no matches");
                    return SearchOutcome {
                        results: keyword_hits,
                        used_ai: true,
                        ..SearchOutcome::default()
                    };
                };
                let ai_hits = title_matches(bookmarks, &titles);
                debug!(titles = titles.len(), hits = ai_hits.len(), "AI search complete");
                SearchOutcome {
                    results: merge_unique(keyword_hits, ai_hits),
                    used_ai: true,
                    ..SearchOutcome::default()
                }
            }
            Err(error) => {
                let rate_limited = is_rate_limited(&error);
                warn!(%error, rate_limited, "AI search failed, using keyword results");
                SearchOutcome {
                    results: keyword_hits,
                    used_ai: false,
                    ai_error: Some(error.to_string()),
                    rate_limited,
                }
            }
        }
    }
}

/// Bookmarks whose title contains, or is contained in, any returned title.
fn title_matches(bookmarks: &[Bookmark], titles: &[String]) -> Vec<Bookmark> {
    let titles: Vec<String> = titles.iter().map(|t| t.to_lowercase()).collect();
    bookmarks
        .iter()
        .filter(|bookmark| {
            let own = bookmark.title.to_lowercase();
            titles
                .iter()
                .any(|title| own.contains(title.as_str()) || title.contains(own.as_str()))
        })
        .cloned()
        .collect()
}

/// Concatenates and drops later bookmarks whose id was already seen.
fn merge_unique(first: Vec<Bookmark>, second: Vec<Bookmark>) -> Vec<Bookmark> {
    let mut seen = HashSet::new();
    first
        .into_iter()
        .chain(second)
        .filter(|bookmark| seen.insert(bookmark.id))
        .collect()
}
