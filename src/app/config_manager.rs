//! Configuration lifecycle: load file config, merge CLI, resolve runtime settings.

use anyhow::Result;
use tracing::debug;

use crate::app::config_runtime::{self, CliValueSources, RuntimeSettings};
use crate::app_config::load_default_file_config;
use crate::cli::Cli;

/// Load file config and merge CLI overrides into the settings every command runs with.
pub(crate) fn resolve_config(cli: &Cli, cli_sources: &CliValueSources) -> Result<RuntimeSettings> {
    let loaded_config = load_default_file_config()?;
    let settings = config_runtime::resolve_settings(
        &cli.global,
        cli_sources,
        loaded_config.config.as_ref(),
    )?;
    debug!(
        config_path = ?loaded_config.path,
        from_file = loaded_config.config.is_some(),
        "configuration resolved"
    );
    Ok(settings)
}
