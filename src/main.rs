//! CLI entry point for the bookmarks tool.

use anyhow::Result;
use tracing::{debug, info};

mod app;
mod app_config;
mod cli;
mod commands;
mod output;

use app::{command_dispatcher, config_manager, config_runtime, terminal};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let (cli, cli_sources) = config_runtime::parse_cli_with_sources();

    let settings = config_manager::resolve_config(&cli, &cli_sources)?;

    // Priority: explicit -v/-q > RUST_LOG env var > config verbosity > default (info)
    let default_level = config_runtime::resolve_default_log_level(&settings);
    let force_cli_log_level = config_runtime::should_force_cli_log_level(&cli_sources);
    terminal::init_tracing(
        default_level,
        force_cli_log_level,
        terminal::no_color_env_requested(),
    );

    debug!(?cli, "CLI arguments parsed");
    info!(user = %settings.user_id, "Bookmarks starting");

    command_dispatcher::dispatch(&cli.command, settings).await
}
