//! Export and stats command handlers.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bookmarks_core::transfer::{export_for_user, export_stats};
use tracing::info;

use crate::app::context::AppContext;
use crate::cli::ExportArgs;
use crate::output::render_stats;

/// Output path that streams the export to stdout.
const STDOUT_PATH: &str = "-";

pub(crate) async fn run_export_command(ctx: &AppContext, args: &ExportArgs) -> Result<()> {
    let user_id = ctx.user_id()?;
    let stats = export_stats(&ctx.store, &user_id).await?;
    info!(
        bookmarks = stats.total_bookmarks,
        categories = stats.categories,
        favorites = stats.favorites,
        format = %args.format,
        "exporting bookmarks"
    );

    let document = export_for_user(&ctx.store, &user_id, args.format).await?;

    let target = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(args.format.default_file_name()));
    if is_stdout(&target) {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(document.as_bytes())
            .context("Failed to write export to stdout")?;
        stdout.flush()?;
        return Ok(());
    }

    tokio::fs::write(&target, document.as_bytes())
        .await
        .with_context(|| format!("Failed to write export file '{}'", target.display()))?;
    println!(
        "Exported {} bookmarks to {} ({})",
        stats.total_bookmarks,
        target.display(),
        args.format.mime_type()
    );
    Ok(())
}

pub(crate) async fn run_stats_command(ctx: &AppContext) -> Result<()> {
    let user_id = ctx.user_id()?;
    let stats = export_stats(&ctx.store, &user_id).await?;
    println!("{}", render_stats(&stats));
    Ok(())
}

fn is_stdout(path: &Path) -> bool {
    path.as_os_str() == STDOUT_PATH
}
