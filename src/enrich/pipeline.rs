//! Batched enrichment of URL lists through the admission queue.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use super::ProcessedUrl;
use super::fallback::{fallback_title, favicon_url};
use crate::admission::{Admission, AdmissionQueue, CallError};
use crate::backend::{ScrapedPage, Scraper};

/// Default number of URLs submitted together.
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Default pause between consecutive batches.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(1000);

const GENERIC_FAILURE: &str = "Failed to process URL";

/// Batch sizing for [`Enricher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// URLs submitted to the queue before awaiting the batch (0 is treated as 1).
    pub batch_size: usize,
    /// Pause after each batch except the last.
    pub batch_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }
}

/// Scrapes URL lists in batches, one queued call per URL.
#[derive(Clone)]
pub struct Enricher {
    queue: AdmissionQueue,
    scraper: Arc<dyn Scraper>,
    config: BatchConfig,
}

impl std::fmt::Debug for Enricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enricher")
            .field("queue", &self.queue)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Enricher {
    /// Creates an enricher that routes every scrape through `queue`.
    #[must_use]
    pub fn new(queue: AdmissionQueue, scraper: Arc<dyn Scraper>, config: BatchConfig) -> Self {
        Self {
            queue,
            scraper,
            config,
        }
    }

    /// Returns the queue scrapes are submitted to.
    #[must_use]
    pub fn queue(&self) -> &AdmissionQueue {
        &self.queue
    }

    /// Enriches `urls`, returning exactly one record per URL in input order.
    ///
    /// Every URL of a batch is submitted before any is awaited. After each
    /// batch `on_progress(processed, total)` is invoked with
    /// `min((i + 1) * batch_size, total)`. Item failures never abort the run.
    #[instrument(skip(self, urls, on_progress), fields(total = urls.len(), batch_size = self.config.batch_size))]
    pub async fn process_urls_in_batches(
        &self,
        urls: &[String],
        mut on_progress: Option<&mut (dyn FnMut(usize, usize) + Send)>,
    ) -> Vec<ProcessedUrl> {
        let total = urls.len();
        let batch_size = self.config.batch_size.max(1);
        let batch_count = total.div_ceil(batch_size);
        let mut results = Vec::with_capacity(total);

        for (index, batch) in urls.chunks(batch_size).enumerate() {
            let admissions: Vec<_> = batch.iter().map(|url| self.submit(url)).collect();
            let outcomes = join_all(admissions).await;
            results.extend(
                batch
                    .iter()
                    .zip(outcomes)
                    .map(|(url, outcome)| to_processed(url, outcome)),
            );

            let processed = ((index + 1) * batch_size).min(total);
            debug!(processed, total, "batch complete");
            if let Some(callback) = on_progress.as_deref_mut() {
                callback(processed, total);
            }

            if index + 1 < batch_count {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        }

        let failed = results.iter().filter(|r| !r.success).count();
        info!(succeeded = total - failed, failed, "enrichment complete");
        results
    }

    /// Queues one enrichment attempt. The queued call never fails on a scrape
    /// error, so only queue-level failures reach the caller.
    fn submit(&self, url: &str) -> Admission<ProcessedUrl> {
        let scraper = Arc::clone(&self.scraper);
        let url = url.to_string();
        self.queue.add(move || {
            let scraper = Arc::clone(&scraper);
            let url = url.clone();
            async move {
                let scraped = scraper.scrape(&url).await;
                Ok::<_, CallError>(enrich_page(&url, scraped))
            }
        })
    }
}

fn enrich_page(url: &str, scraped: Result<ScrapedPage, CallError>) -> ProcessedUrl {
    let page = scraped.unwrap_or_else(|error| {
        warn!(%url, %error, "scrape failed, using URL-derived title");
        ScrapedPage::default()
    });
    let title = non_blank(page.metadata.title).unwrap_or_else(|| fallback_title(url));
    let description = non_blank(page.metadata.description)
        .or_else(|| non_blank(page.extract.headings.into_iter().next()))
        .unwrap_or_default();
    ProcessedUrl {
        url: url.to_string(),
        title,
        description,
        favicon_url: favicon_url(url),
        success: true,
        error: None,
    }
}

fn to_processed(url: &str, outcome: Result<ProcessedUrl, CallError>) -> ProcessedUrl {
    outcome.unwrap_or_else(|error| {
        warn!(%url, %error, "enrichment call failed");
        let message = error.to_string();
        let message = if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        };
        ProcessedUrl {
            url: url.to_string(),
            title: fallback_title(url),
            description: String::new(),
            favicon_url: favicon_url(url),
            success: false,
            error: Some(message),
        }
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;
    use tokio::time::Instant;

    use crate::admission::{AdmissionConfig, RetryPolicy};
    use crate::backend::{PageExtract, PageMetadata};

    /// Scraper that fails the first `failures[url]` attempts per URL with the given error.
    #[derive(Default)]
    struct FakeScraper {
        failures: HashMap<String, (u32, CallError)>,
        pages: HashMap<String, ScrapedPage>,
        attempts: Mutex<HashMap<String, u32>>,
        calls: AtomicU32,
        gate: Option<(String, Arc<Notify>)>,
    }

    impl FakeScraper {
        fn failing(mut self, url: &str, times: u32, error: CallError) -> Self {
            self.failures.insert(url.to_string(), (times, error));
            self
        }

        /// Holds scrapes of `url` until `gate` is notified.
        fn gated(mut self, url: &str, gate: Arc<Notify>) -> Self {
            self.gate = Some((url.to_string(), gate));
            self
        }

        fn page(mut self, url: &str, page: ScrapedPage) -> Self {
            self.pages.insert(url.to_string(), page);
            self
        }
    }

    #[async_trait]
    impl Scraper for FakeScraper {
        async fn scrape(&self, url: &str) -> Result<ScrapedPage, CallError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let attempt = {
                let mut attempts = self.attempts.lock().unwrap();
                let entry = attempts.entry(url.to_string()).or_insert(0);
                *entry += 1;
                *entry
            };
            if let Some((gated, gate)) = &self.gate
                && gated == url
            {
                gate.notified().await;
            }
            if let Some((times, error)) = self.failures.get(url)
                && attempt <= *times
            {
                return Err(error.clone());
            }
            Ok(self.pages.get(url).cloned().unwrap_or_else(|| ScrapedPage {
                metadata: PageMetadata {
                    title: Some(format!("Title of {url}")),
                    description: Some("scraped".to_string()),
                },
                extract: PageExtract::default(),
            }))
        }
    }

    fn enricher(scraper: FakeScraper, batch_size: usize, max_retries: u32) -> (Enricher, Arc<FakeScraper>) {
        let scraper = Arc::new(scraper);
        let queue = AdmissionQueue::new(AdmissionConfig::new(
            Duration::from_millis(10),
            RetryPolicy::new(max_retries, Duration::from_millis(100)),
        ));
        let config = BatchConfig {
            batch_size,
            batch_delay: Duration::from_millis(1000),
        };
        (
            Enricher::new(queue, Arc::clone(&scraper) as Arc<dyn Scraper>, config),
            scraper,
        )
    }

    fn urls(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("https://site{i}.com/")).collect()
    }

    // ==================== Result Shape ====================

    #[tokio::test(start_paused = true)]
    async fn test_failed_scrape_falls_back_to_derived_record() {
        let input = vec![
            "https://a.com/".to_string(),
            "https://www.b.com/posts/hello-world".to_string(),
            "https://c.com/".to_string(),
        ];
        let scraper = FakeScraper::default().failing(
            &input[1],
            u32::MAX,
            CallError::with_status("HTTP 500 fetching page", 500),
        );
        let (enricher, fake) = enricher(scraper, 3, 3);

        let results = enricher.process_urls_in_batches(&input, None).await;

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.success && r.error.is_none()));

        let fallback = &results[1];
        assert_eq!(fallback.title, "Hello World - b.com");
        assert_eq!(fallback.description, "");
        assert_eq!(
            fallback.favicon_url,
            "https://www.google.com/s2/favicons?domain=www.b.com&sz=16"
        );
        assert_eq!(fake.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_call_yields_unsuccessful_record_in_place() {
        let input = vec![
            "https://a.com/".to_string(),
            "https://www.b.com/posts/hello-world".to_string(),
            "https://c.com/".to_string(),
        ];
        let gate = Arc::new(Notify::new());
        let scraper = FakeScraper::default().gated(&input[0], Arc::clone(&gate));
        let (enricher, fake) = enricher(scraper, 3, 3);
        let queue = enricher.queue().clone();

        // Clear while the first call is in flight and the other two are queued
        let cancel = async {
            while fake.calls.load(Ordering::SeqCst) != 1 || queue.status().queue_length != 2 {
                tokio::task::yield_now().await;
            }
            let cancelled = queue.clear();
            gate.notify_one();
            cancelled
        };
        let (results, cancelled) =
            tokio::join!(enricher.process_urls_in_batches(&input, None), cancel);

        assert_eq!(cancelled, 2);
        assert_eq!(results.len(), 3);
        assert_eq!(
            results.iter().map(|r| r.url.as_str()).collect::<Vec<_>>(),
            input.iter().map(String::as_str).collect::<Vec<_>>()
        );
        assert!(results[0].success);

        let failed = &results[1];
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("Request cancelled"));
        assert_eq!(failed.title, "Hello World - b.com");
        assert_eq!(failed.description, "");
        assert_eq!(
            failed.favicon_url,
            "https://www.google.com/s2/favicons?domain=www.b.com&sz=16"
        );
        assert!(!results[2].success);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_preserves_input_order_across_batches() {
        let input = urls(8);
        let (enricher, _) = enricher(FakeScraper::default(), 3, 3);

        let results = enricher.process_urls_in_batches(&input, None).await;

        let output: Vec<_> = results.into_iter().map(|r| r.url).collect();
        assert_eq!(output, input);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_scraped_fields_fall_back() {
        let url = "https://example.com/docs/getting_started.html";
        let scraper = FakeScraper::default().page(
            url,
            ScrapedPage {
                metadata: PageMetadata {
                    title: Some("   ".to_string()),
                    description: None,
                },
                extract: PageExtract {
                    headings: vec!["Install".to_string(), "Usage".to_string()],
                },
            },
        );
        let (enricher, _) = enricher(scraper, 3, 3);

        let results = enricher
            .process_urls_in_batches(&[url.to_string()], None)
            .await;

        assert!(results[0].success);
        assert_eq!(results[0].title, "Getting Started - example.com");
        assert_eq!(results[0].description, "Install");
        assert_eq!(results[0].error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scraped_page_without_headings_has_empty_description() {
        let url = "https://example.com/";
        let scraper = FakeScraper::default().page(url, ScrapedPage::default());
        let (enricher, _) = enricher(scraper, 3, 3);

        let results = enricher
            .process_urls_in_batches(&[url.to_string()], None)
            .await;

        assert!(results[0].success);
        assert_eq!(results[0].title, "example.com");
        assert_eq!(results[0].description, "");
    }

    // ==================== Scrape Failures ====================

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_scrape_is_not_retried() {
        let input = urls(1);
        let scraper = FakeScraper::default().failing(
            &input[0],
            2,
            CallError::with_status("Too Many Requests", 429),
        );
        let (enricher, fake) = enricher(scraper, 3, 3);

        let results = enricher.process_urls_in_batches(&input, None).await;

        assert!(results[0].success);
        assert_eq!(results[0].title, "site1.com");
        assert_eq!(results[0].error, None);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scrape_failure_keeps_queue_idle_afterwards() {
        let input = urls(2);
        let scraper =
            FakeScraper::default().failing(&input[0], u32::MAX, CallError::remote("boom"));
        let (enricher, _) = enricher(scraper, 3, 3);

        let results = enricher.process_urls_in_batches(&input, None).await;

        assert!(results.iter().all(|r| r.success));
        assert!(enricher.queue().status().is_idle());
    }

    // ==================== Progress & Pacing ====================

    #[tokio::test(start_paused = true)]
    async fn test_progress_reported_once_per_batch() {
        let input = urls(7);
        let (enricher, _) = enricher(FakeScraper::default(), 3, 3);
        let mut seen = Vec::new();
        let mut record = |processed: usize, total: usize| seen.push((processed, total));

        enricher
            .process_urls_in_batches(&input, Some(&mut record))
            .await;

        assert_eq!(seen, vec![(3, 7), (6, 7), (7, 7)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_reports_nothing() {
        let (enricher, fake) = enricher(FakeScraper::default(), 3, 3);
        let mut calls = 0;
        let mut record = |_: usize, _: usize| calls += 1;

        let results = enricher.process_urls_in_batches(&[], Some(&mut record)).await;

        assert!(results.is_empty());
        assert_eq!(calls, 0);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_batch_size_processes_one_at_a_time() {
        let input = urls(2);
        let (enricher, _) = enricher(FakeScraper::default(), 0, 3);
        let mut seen = Vec::new();
        let mut record = |processed: usize, total: usize| seen.push((processed, total));

        let results = enricher
            .process_urls_in_batches(&input, Some(&mut record))
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(seen, vec![(1, 2), (2, 2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_delay_only_between_batches() {
        let input = urls(4);
        let (enricher, _) = enricher(FakeScraper::default(), 2, 3);
        let start = Instant::now();

        enricher.process_urls_in_batches(&input, None).await;

        // One inter-batch pause plus three 10ms dispatch gaps
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1000), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(2000), "elapsed {elapsed:?}");
    }
}
