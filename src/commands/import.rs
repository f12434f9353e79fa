//! Import command handlers: pasted URL lists and bookmark files.

use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use anyhow::{Context, Result};
use bookmarks_core::TransferError;
use bookmarks_core::transfer::{import_file, import_urls};
use tracing::{debug, info};

use crate::app::context::AppContext;
use crate::app::{input_processor, progress_manager, terminal};
use crate::cli::{ImportArgs, ImportUrlsArgs};
use crate::output::render_import_summary;

pub(crate) async fn run_import_urls_command(ctx: &AppContext, args: &ImportUrlsArgs) -> Result<()> {
    let Some(input_text) = input_processor::read_url_input(&args.urls)? else {
        info!("No input provided. Pipe URLs via stdin or pass as arguments.");
        info!("Example: echo 'https://www.rust-lang.org' | bookmarks import-urls");
        return Ok(());
    };

    let user_id = ctx.user_id()?;
    let queue = ctx.admission_queue();
    let enricher = ctx.enricher(queue.clone())?;

    let percent = Arc::new(AtomicU8::new(0));
    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        ctx.settings.quiet,
        terminal::is_dumb_terminal(),
    );
    let (spinner_handle, stop) =
        progress_manager::spawn_progress_ui(use_spinner, queue, Arc::clone(&percent));

    let sink = Arc::clone(&percent);
    let mut on_progress = move |value: u8| {
        debug!(progress = value, "url import progress");
        sink.store(value, Ordering::SeqCst);
    };
    let result = import_urls(
        &ctx.store,
        &enricher,
        &user_id,
        &input_text,
        &mut on_progress,
    )
    .await;

    stop.store(true, Ordering::SeqCst);
    if let Some(handle) = spinner_handle {
        let _ = handle.await;
    }

    match result {
        Ok(summary) => {
            println!("{}", render_import_summary(&summary));
            Ok(())
        }
        Err(TransferError::NoValidUrls) => {
            println!("No valid URLs found in input.");
            Ok(())
        }
        Err(error) => Err(error).context("URL import failed"),
    }
}

pub(crate) async fn run_import_command(ctx: &AppContext, args: &ImportArgs) -> Result<()> {
    let content = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read import file '{}'", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let user_id = ctx.user_id()?;
    let mut on_progress = |value: u8| debug!(progress = value, "file import progress");
    let summary = import_file(&ctx.store, &user_id, &file_name, &content, &mut on_progress)
        .await
        .with_context(|| format!("Failed to import '{}'", args.file.display()))?;

    println!("{}", render_import_summary(&summary));
    Ok(())
}
