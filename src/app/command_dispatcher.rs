//! CLI command routing: opens the store once and runs the selected subcommand.

use anyhow::Result;
use tracing::debug;

use crate::app::config_runtime::RuntimeSettings;
use crate::app::context::AppContext;
use crate::cli::Command;
use crate::commands;

/// Runs `command` against a freshly opened context, closing it afterwards.
pub(crate) async fn dispatch(command: &Command, settings: RuntimeSettings) -> Result<()> {
    let ctx = AppContext::open(settings).await?;
    debug!(?command, "dispatching command");

    let result = match command {
        Command::ImportUrls(args) => commands::run_import_urls_command(&ctx, args).await,
        Command::Import(args) => commands::run_import_command(&ctx, args).await,
        Command::Export(args) => commands::run_export_command(&ctx, args).await,
        Command::Search(args) => commands::run_search_command(&ctx, args).await,
        Command::List(args) => commands::run_list_command(&ctx, args).await,
        Command::Add(args) => commands::run_add_command(&ctx, args).await,
        Command::Categories => commands::run_categories_command(&ctx).await,
        Command::CategoryAdd(args) => commands::run_category_add_command(&ctx, args).await,
        Command::Stats => commands::run_stats_command(&ctx).await,
    };

    ctx.close().await;
    result
}
