use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use bookmarks_core::backend::DEFAULT_AI_ENDPOINT;
use bookmarks_core::search::AI_MODEL;
use bookmarks_core::{AdmissionConfig, BatchConfig, HttpTimeouts, RetryPolicy};
use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};

use crate::app_config::{FileConfig, VerbositySetting, resolve_default_db_path};
use crate::cli::{Cli, GlobalArgs};

/// User that owns records when neither `--user` nor `user_id` is given.
pub(crate) const DEFAULT_USER_ID: &str = "local";

/// Environment variable holding the AI API key.
pub(crate) const AI_API_KEY_ENV: &str = "BOOKMARKS_AI_API_KEY";

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) min_interval: bool,
    pub(crate) max_retries: bool,
    pub(crate) base_delay: bool,
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

/// Effective settings after merging CLI flags over the config file.
#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) db_path: PathBuf,
    pub(crate) user_id: String,
    pub(crate) admission: AdmissionConfig,
    pub(crate) batch: BatchConfig,
    pub(crate) http_timeouts: HttpTimeouts,
    pub(crate) ai_endpoint: String,
    pub(crate) ai_model: String,
    pub(crate) verbose: u8,
    pub(crate) quiet: bool,
    pub(crate) debug: bool,
}

pub(crate) fn parse_cli_with_sources() -> (Cli, CliValueSources) {
    let command = Cli::command();
    let matches = command.get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    let sources = collect_value_sources(&matches);
    (cli, sources)
}

fn collect_value_sources(matches: &ArgMatches) -> CliValueSources {
    CliValueSources {
        min_interval: is_commandline_value(matches, "min_interval"),
        max_retries: is_commandline_value(matches, "max_retries"),
        base_delay: is_commandline_value(matches, "base_delay"),
        verbose: is_commandline_value(matches, "verbose"),
        quiet: is_commandline_value(matches, "quiet"),
    }
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Merges explicit CLI flags over file config values over built-in defaults.
pub(crate) fn resolve_settings(
    args: &GlobalArgs,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> Result<RuntimeSettings> {
    let empty = FileConfig::default();
    let file_config = file_config.unwrap_or(&empty);

    let db_path = args
        .db
        .clone()
        .or_else(|| file_config.db_path.clone())
        .unwrap_or_else(resolve_default_db_path);

    let user_id = args
        .user
        .clone()
        .or_else(|| file_config.user_id.clone())
        .unwrap_or_else(|| DEFAULT_USER_ID.to_string());
    if user_id.trim().is_empty() {
        bail!("Invalid effective user id: must not be empty");
    }

    let min_interval_ms = pick(
        cli_sources.min_interval,
        args.min_interval,
        file_config.min_interval_ms,
    );
    let max_retries = pick(
        cli_sources.max_retries,
        args.max_retries,
        file_config.max_retries,
    );
    let base_delay_ms = pick(
        cli_sources.base_delay,
        args.base_delay,
        file_config.base_delay_ms,
    );

    let admission = AdmissionConfig::new(
        Duration::from_millis(min_interval_ms),
        RetryPolicy::new(u32::from(max_retries), Duration::from_millis(base_delay_ms)),
    );

    let mut batch = BatchConfig::default();
    if let Some(batch_size) = file_config.batch_size {
        batch.batch_size = batch_size;
    }
    if let Some(batch_delay_ms) = file_config.batch_delay_ms {
        batch.batch_delay = Duration::from_millis(batch_delay_ms);
    }

    let (verbose, quiet, debug) = if cli_sources.verbose || cli_sources.quiet {
        (args.verbose, args.quiet, false)
    } else {
        config_verbosity(file_config.verbosity.unwrap_or(VerbositySetting::Default))
    };

    Ok(RuntimeSettings {
        db_path,
        user_id,
        admission,
        batch,
        http_timeouts: resolve_http_timeouts(file_config),
        ai_endpoint: file_config
            .ai_endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_AI_ENDPOINT.to_string()),
        ai_model: file_config
            .ai_model
            .clone()
            .unwrap_or_else(|| AI_MODEL.to_string()),
        verbose,
        quiet,
        debug,
    })
}

fn pick<T: Copy>(from_cli: bool, cli_value: T, file_value: Option<T>) -> T {
    if from_cli {
        cli_value
    } else {
        file_value.unwrap_or(cli_value)
    }
}

fn config_verbosity(verbosity: VerbositySetting) -> (u8, bool, bool) {
    match verbosity {
        VerbositySetting::Default => (0, false, false),
        VerbositySetting::Verbose => (1, false, false),
        VerbositySetting::Quiet => (0, true, false),
        VerbositySetting::Debug => (0, false, true),
    }
}

pub(crate) fn resolve_http_timeouts(file_config: &FileConfig) -> HttpTimeouts {
    let mut timeouts = HttpTimeouts::default();
    if let Some(secs) = file_config.http_connect_timeout_secs {
        timeouts.connect = Duration::from_secs(secs);
    }
    if let Some(secs) = file_config.http_read_timeout_secs {
        timeouts.read = Duration::from_secs(secs);
    }
    timeouts
}

pub(crate) fn resolve_default_log_level(settings: &RuntimeSettings) -> &'static str {
    if settings.quiet {
        "error"
    } else if settings.debug {
        "trace"
    } else {
        match settings.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn should_force_cli_log_level(cli_sources: &CliValueSources) -> bool {
    cli_sources.verbose || cli_sources.quiet
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(argv: &[&str]) -> (Cli, CliValueSources) {
        let matches = Cli::command().try_get_matches_from(argv).unwrap();
        let cli = Cli::from_arg_matches(&matches).unwrap();
        (cli, collect_value_sources(&matches))
    }

    #[test]
    fn test_value_sources_only_flag_explicit_flags() {
        let (_, sources) = parse(&["bookmarks", "--max-retries", "1", "stats"]);
        assert!(sources.max_retries);
        assert!(!sources.min_interval);
        assert!(!sources.base_delay);
        assert!(!sources.verbose);
    }

    #[test]
    fn test_value_sources_see_globals_after_subcommand() {
        let (_, sources) = parse(&["bookmarks", "stats", "--min-interval", "10", "-v"]);
        assert!(sources.min_interval);
        assert!(sources.verbose);
    }

    #[test]
    fn test_resolve_settings_defaults_without_config() {
        let cli = Cli::parse_from(["bookmarks", "--db", "x.db", "stats"]);
        let settings =
            resolve_settings(&cli.global, &CliValueSources::default(), None).unwrap();
        assert_eq!(settings.db_path, PathBuf::from("x.db"));
        assert_eq!(settings.user_id, DEFAULT_USER_ID);
        assert_eq!(settings.admission, AdmissionConfig::default());
        assert_eq!(settings.batch, BatchConfig::default());
        assert_eq!(settings.http_timeouts, HttpTimeouts::default());
        assert_eq!(settings.ai_endpoint, DEFAULT_AI_ENDPOINT);
        assert_eq!(settings.ai_model, AI_MODEL);
        assert_eq!(resolve_default_log_level(&settings), "info");
    }

    #[test]
    fn test_file_config_fills_unspecified_flags() {
        let cli = Cli::parse_from(["bookmarks", "stats"]);
        let file = FileConfig {
            db_path: Some(PathBuf::from("/data/b.db")),
            user_id: Some("alice".to_string()),
            min_interval_ms: Some(250),
            max_retries: Some(1),
            base_delay_ms: Some(100),
            batch_size: Some(5),
            batch_delay_ms: Some(0),
            ai_model: Some("llama3".to_string()),
            http_read_timeout_secs: Some(90),
            verbosity: Some(VerbositySetting::Quiet),
            ..FileConfig::default()
        };
        let settings =
            resolve_settings(&cli.global, &CliValueSources::default(), Some(&file)).unwrap();
        assert_eq!(settings.db_path, PathBuf::from("/data/b.db"));
        assert_eq!(settings.user_id, "alice");
        assert_eq!(settings.admission.min_interval, Duration::from_millis(250));
        assert_eq!(settings.admission.retry.max_retries(), 1);
        assert_eq!(
            settings.admission.retry.base_delay(),
            Duration::from_millis(100)
        );
        assert_eq!(settings.batch.batch_size, 5);
        assert_eq!(settings.batch.batch_delay, Duration::ZERO);
        assert_eq!(settings.ai_model, "llama3");
        assert_eq!(settings.http_timeouts.read, Duration::from_secs(90));
        assert_eq!(resolve_default_log_level(&settings), "error");
    }

    #[test]
    fn test_explicit_cli_flags_override_file_config() {
        let (cli, sources) = parse(&[
            "bookmarks",
            "--user",
            "bob",
            "--max-retries",
            "0",
            "-v",
            "stats",
        ]);
        let file = FileConfig {
            user_id: Some("alice".to_string()),
            max_retries: Some(7),
            min_interval_ms: Some(5),
            verbosity: Some(VerbositySetting::Quiet),
            ..FileConfig::default()
        };
        let settings = resolve_settings(&cli.global, &sources, Some(&file)).unwrap();
        assert_eq!(settings.user_id, "bob");
        assert_eq!(settings.admission.retry.max_retries(), 0);
        assert_eq!(settings.admission.min_interval, Duration::from_millis(5));
        assert_eq!(resolve_default_log_level(&settings), "debug");
        assert!(should_force_cli_log_level(&sources));
    }

    #[test]
    fn test_resolve_settings_rejects_blank_user() {
        let cli = Cli::parse_from(["bookmarks", "--user", " ", "stats"]);
        assert!(resolve_settings(&cli.global, &CliValueSources::default(), None).is_err());
    }

    #[test]
    fn test_config_debug_verbosity_maps_to_trace() {
        let cli = Cli::parse_from(["bookmarks", "stats"]);
        let file = FileConfig {
            verbosity: Some(VerbositySetting::Debug),
            ..FileConfig::default()
        };
        let settings =
            resolve_settings(&cli.global, &CliValueSources::default(), Some(&file)).unwrap();
        assert_eq!(resolve_default_log_level(&settings), "trace");
    }
}
