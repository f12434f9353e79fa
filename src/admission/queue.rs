//! Single-flight admission queue for calls to a throttled remote resource.
//!
//! [`AdmissionQueue`] serializes calls submitted from any number of callers
//! and dispatches them one at a time, keeping consecutive dispatch starts at
//! least `min_interval` apart. Calls that fail with a rate-limit shaped error
//! are retried with exponential backoff and re-inserted at the *front* of the
//! queue, so a retried call jumps ahead of work that has never been tried.
//!
//! # Example
//!
//! ```no_run
//! use bookmarks_core::admission::{AdmissionConfig, AdmissionQueue, CallError};
//!
//! # async fn example() -> Result<(), CallError> {
//! let queue = AdmissionQueue::new(AdmissionConfig::default());
//!
//! let answer = queue.add(|| async { Ok::<_, CallError>(42) }).await?;
//! assert_eq!(answer, 42);
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::CallError;
use super::constants::DEFAULT_MIN_INTERVAL;
use super::retry::{RetryDecision, RetryPolicy, classify_error};

/// Configuration for an [`AdmissionQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionConfig {
    /// Minimum spacing between two dispatch starts.
    pub min_interval: Duration,
    /// Backoff policy for rate-limited calls.
    pub retry: RetryPolicy,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            retry: RetryPolicy::default(),
        }
    }
}

impl AdmissionConfig {
    /// Creates a configuration from its parts.
    #[must_use]
    pub fn new(min_interval: Duration, retry: RetryPolicy) -> Self {
        Self {
            min_interval,
            retry,
        }
    }
}

/// Point-in-time view of the queue, for progress indicators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    /// Calls waiting to be dispatched (excludes the one currently owned by the drain loop).
    pub queue_length: usize,
    /// Whether a drain loop is active.
    pub processing: bool,
}

impl QueueStatus {
    /// Returns true when nothing is queued and no drain loop is running.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.queue_length == 0 && !self.processing
    }
}

/// Type-erased queued call.
trait Dispatch: Send {
    /// Invokes the wrapped call once, settling the caller on success.
    fn attempt(&mut self) -> BoxFuture<'_, Result<(), CallError>>;

    /// Settles the caller with a failure.
    fn reject(self: Box<Self>, error: CallError);
}

struct PendingCall<T, F> {
    call: F,
    settle: Option<oneshot::Sender<Result<T, CallError>>>,
}

impl<T, F, Fut> Dispatch for PendingCall<T, F>
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, CallError>> + Send + 'static,
{
    fn attempt(&mut self) -> BoxFuture<'_, Result<(), CallError>> {
        let call = (self.call)();
        let settle = &mut self.settle;
        Box::pin(async move {
            let value = call.await?;
            if let Some(settle) = settle.take() {
                // Receiver dropped means the caller stopped waiting
                let _ = settle.send(Ok(value));
            }
            Ok(())
        })
    }

    fn reject(mut self: Box<Self>, error: CallError) {
        if let Some(settle) = self.settle.take() {
            let _ = settle.send(Err(error));
        }
    }
}

struct QueueItem {
    job: Box<dyn Dispatch>,
    retry_count: u32,
}

struct QueueState {
    pending: VecDeque<QueueItem>,
    draining: bool,
    last_dispatch_at: Option<Instant>,
}

struct Shared {
    config: AdmissionConfig,
    state: Mutex<QueueState>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Rate-limited FIFO dispatcher with retry-at-front priority.
///
/// Cloning is cheap and yields another handle to the same queue; all handles
/// share one pending list, one drain loop and one dispatch clock.
///
/// # Concurrency Model
///
/// - [`add`](Self::add) enqueues synchronously and spawns a drain task on the
///   current Tokio runtime when none is active
/// - The drain task is the only code that dispatches calls; it exits as soon
///   as the pending list is empty
/// - State sits behind a short-lived `std::sync::Mutex` that is never held
///   across an `.await`, so [`status`](Self::status) never waits on a call
///
/// A call that never completes stalls the queue: there is no per-call timeout.
#[derive(Clone)]
pub struct AdmissionQueue {
    shared: Arc<Shared>,
}

impl fmt::Debug for AdmissionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionQueue")
            .field("config", &self.shared.config)
            .field("status", &self.status())
            .finish()
    }
}

impl AdmissionQueue {
    /// Creates an empty queue.
    #[must_use]
    #[instrument(skip_all, fields(
        min_interval_ms = config.min_interval.as_millis(),
        max_retries = config.retry.max_retries(),
        base_delay_ms = config.retry.base_delay().as_millis(),
    ))]
    pub fn new(config: AdmissionConfig) -> Self {
        debug!("creating admission queue");
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(QueueState {
                    pending: VecDeque::new(),
                    draining: false,
                    last_dispatch_at: None,
                }),
            }),
        }
    }

    /// Returns the queue configuration.
    #[must_use]
    pub fn config(&self) -> AdmissionConfig {
        self.shared.config
    }

    /// Submits a call and returns a handle resolving to its final outcome.
    ///
    /// The call is enqueued before this method returns. `call` may be invoked
    /// more than once when its failures are rate-limited; each invocation
    /// must produce a fresh attempt.
    ///
    /// Outside a Tokio runtime the call is rejected with
    /// [`CallError::NoRuntime`] and the queue is left untouched.
    pub fn add<T, F, Fut>(&self, call: F) -> Admission<T>
    where
        T: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, CallError>> + Send + 'static,
    {
        let (settle, receiver) = oneshot::channel();
        let item = QueueItem {
            job: Box::new(PendingCall {
                call,
                settle: Some(settle),
            }),
            retry_count: 0,
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("call submitted outside a Tokio runtime; rejecting");
            item.job.reject(CallError::NoRuntime);
            return Admission { receiver };
        };

        let start_drain = {
            let mut state = self.shared.lock_state();
            state.pending.push_back(item);
            let idle = !state.draining;
            state.draining = true;
            debug!(queue_length = state.pending.len(), "call queued");
            idle
        };

        if start_drain {
            runtime.spawn(drain(Arc::clone(&self.shared)));
        }

        Admission { receiver }
    }

    /// Returns queue depth and whether a drain loop is active.
    #[must_use]
    pub fn status(&self) -> QueueStatus {
        let state = self.shared.lock_state();
        QueueStatus {
            queue_length: state.pending.len(),
            processing: state.draining,
        }
    }

    /// Rejects every queued call with [`CallError::Cancelled`].
    ///
    /// A call already taken by the drain loop is not affected. Returns the
    /// number of cancelled calls.
    pub fn clear(&self) -> usize {
        let cancelled: Vec<QueueItem> = self.shared.lock_state().pending.drain(..).collect();
        let count = cancelled.len();
        for item in cancelled {
            item.job.reject(CallError::Cancelled);
        }
        if count > 0 {
            info!(count, "cancelled queued calls");
        }
        count
    }
}

/// Pending outcome of a call submitted with [`AdmissionQueue::add`].
///
/// Dropping the handle does not withdraw the call; it is still dispatched.
#[must_use = "the call is dispatched regardless; dropping the handle discards its result"]
pub struct Admission<T> {
    receiver: oneshot::Receiver<Result<T, CallError>>,
}

impl<T> fmt::Debug for Admission<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Admission").finish_non_exhaustive()
    }
}

impl<T> Future for Admission<T> {
    type Output = Result<T, CallError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|settled| settled.unwrap_or_else(|_| Err(CallError::QueueClosed)))
    }
}

/// Resets queue ownership if the drain task unwinds or is dropped mid-loop.
struct DrainGuard {
    shared: Arc<Shared>,
    finished: bool,
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let orphaned: Vec<QueueItem> = {
            let mut state = self.shared.lock_state();
            state.draining = false;
            state.pending.drain(..).collect()
        };
        warn!(
            orphaned = orphaned.len(),
            "drain loop stopped unexpectedly; queued calls closed"
        );
        for item in orphaned {
            item.job.reject(CallError::QueueClosed);
        }
    }
}

async fn drain(shared: Arc<Shared>) {
    let mut guard = DrainGuard {
        shared: Arc::clone(&shared),
        finished: false,
    };
    let config = shared.config;
    debug!("drain loop started");

    loop {
        let (mut item, last_dispatch_at) = {
            let mut state = shared.lock_state();
            match state.pending.pop_front() {
                Some(item) => (item, state.last_dispatch_at),
                None => {
                    // Cleared under the same lock as the emptiness check so a
                    // concurrent add() either sees this loop or starts a new one
                    state.draining = false;
                    break;
                }
            }
        };

        if let Some(last) = last_dispatch_at {
            let wait = config.min_interval.saturating_sub(last.elapsed());
            if !wait.is_zero() {
                debug!(wait_ms = wait.as_millis(), "spacing dispatch");
                tokio::time::sleep(wait).await;
            }
        }

        shared.lock_state().last_dispatch_at = Some(Instant::now());

        let Err(error) = item.job.attempt().await else {
            debug!(retry_count = item.retry_count, "call succeeded");
            continue;
        };

        match config
            .retry
            .should_retry(classify_error(&error), item.retry_count)
        {
            RetryDecision::Retry { delay, retry } => {
                info!(
                    delay_ms = delay.as_millis(),
                    retry,
                    max_retries = config.retry.max_retries(),
                    "rate limited, retrying"
                );
                tokio::time::sleep(delay).await;
                item.retry_count = retry;
                shared.lock_state().pending.push_front(item);
            }
            RetryDecision::DoNotRetry { reason } => {
                debug!(error = %error, reason = %reason, "call failed");
                item.job.reject(error);
            }
        }
    }

    guard.finished = true;
    debug!("drain loop idle");
}
