//! Progress UI (spinner) for enrichment runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;

use bookmarks_core::{AdmissionQueue, QueueStatus};
use indicatif::{ProgressBar, ProgressStyle};

/// How often the spinner samples the admission queue.
const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Spawns the progress UI (spinner) when requested.
/// Returns (handle, stop) so the caller can signal stop and await the handle.
/// When `use_spinner` is false, returns (None, stop) with stop already true.
pub(crate) fn spawn_progress_ui(
    use_spinner: bool,
    queue: AdmissionQueue,
    percent: Arc<AtomicU8>,
) -> (Option<tokio::task::JoinHandle<()>>, Arc<AtomicBool>) {
    if !use_spinner {
        return (None, Arc::new(AtomicBool::new(true)));
    }
    let stop = Arc::new(AtomicBool::new(false));
    let handle = spawn_spinner_inner(queue, percent, Arc::clone(&stop));
    (Some(handle), stop)
}

fn spawn_spinner_inner(
    queue: AdmissionQueue,
    percent: Arc<AtomicU8>,
    stop: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));

        while !stop.load(Ordering::SeqCst) {
            spinner.set_message(status_message(
                percent.load(Ordering::SeqCst),
                queue.status(),
            ));
            tokio::time::sleep(STATUS_POLL_INTERVAL).await;
        }

        spinner.finish_and_clear();
    })
}

pub(crate) fn status_message(percent: u8, status: QueueStatus) -> String {
    let queue = if status.is_idle() {
        "queue idle".to_string()
    } else if status.processing {
        format!("{} waiting, processing", status.queue_length)
    } else {
        format!("{} waiting", status.queue_length)
    };
    format!("[{percent:>3}%] Enriching URLs ({queue})...")
}
