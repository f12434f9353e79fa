//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// TOML-backed file configuration for bookmarks defaults.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// Default bookmark database file.
    pub db_path: Option<PathBuf>,
    /// Default user whose records are read and written.
    pub user_id: Option<String>,
    /// Minimum spacing between queued remote calls in milliseconds.
    pub min_interval_ms: Option<u64>,
    /// Retry budget for rate-limited calls.
    pub max_retries: Option<u8>,
    /// Base backoff delay in milliseconds.
    pub base_delay_ms: Option<u64>,
    /// URLs enriched concurrently per batch.
    pub batch_size: Option<usize>,
    /// Pause between enrichment batches in milliseconds.
    pub batch_delay_ms: Option<u64>,
    /// OpenAI-compatible API base URL.
    pub ai_endpoint: Option<String>,
    /// Chat model used for AI search.
    pub ai_model: Option<String>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
    /// Optional HTTP client connect timeout in seconds.
    pub http_connect_timeout_secs: Option<u64>,
    /// Optional HTTP client read timeout in seconds.
    pub http_read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(min_interval_ms) = self.min_interval_ms
            && min_interval_ms > 60_000
        {
            bail!(
                "Invalid config value for `min_interval_ms`: {min_interval_ms}. Expected range: 0..=60000"
            );
        }

        if let Some(max_retries) = self.max_retries
            && max_retries > 10
        {
            bail!("Invalid config value for `max_retries`: {max_retries}. Expected range: 0..=10");
        }

        if let Some(base_delay_ms) = self.base_delay_ms
            && base_delay_ms > 60_000
        {
            bail!(
                "Invalid config value for `base_delay_ms`: {base_delay_ms}. Expected range: 0..=60000"
            );
        }

        if let Some(batch_size) = self.batch_size
            && !(1..=20).contains(&batch_size)
        {
            bail!("Invalid config value for `batch_size`: {batch_size}. Expected range: 1..=20");
        }

        if let Some(batch_delay_ms) = self.batch_delay_ms
            && batch_delay_ms > 60_000
        {
            bail!(
                "Invalid config value for `batch_delay_ms`: {batch_delay_ms}. Expected range: 0..=60000"
            );
        }

        if let Some(user_id) = &self.user_id
            && user_id.trim().is_empty()
        {
            bail!("Invalid config value for `user_id`: must not be empty");
        }

        validate_timeout_secs("http_connect_timeout_secs", self.http_connect_timeout_secs)?;
        validate_timeout_secs("http_read_timeout_secs", self.http_read_timeout_secs)?;

        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/bookmarks/config.toml`
/// 2. `$HOME/.config/bookmarks/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("bookmarks")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("bookmarks")
            .join("config.toml"),
    )
}

/// Resolves the default database path.
///
/// Priority:
/// 1. `$XDG_DATA_HOME/bookmarks/bookmarks.db`
/// 2. `$HOME/.local/share/bookmarks/bookmarks.db`
/// 3. `./bookmarks.db`
#[must_use]
pub fn resolve_default_db_path() -> PathBuf {
    if let Some(xdg_data_home) = env_var_non_empty_os("XDG_DATA_HOME") {
        return PathBuf::from(xdg_data_home)
            .join("bookmarks")
            .join("bookmarks.db");
    }
    match env_var_non_empty_os("HOME") {
        Some(home) => PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("bookmarks")
            .join("bookmarks.db"),
        None => PathBuf::from("bookmarks.db"),
    }
}

pub(crate) fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig { path, config: None });
    };

    if !path_ref.exists() {
        return Ok(LoadedConfig { path, config: None });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let line_no = line_index + 1;
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "db_path" => {
                cfg.db_path = Some(PathBuf::from(
                    parse_string_literal(value).with_context(invalid)?,
                ));
            }
            "user_id" => {
                cfg.user_id = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "min_interval_ms" => {
                cfg.min_interval_ms = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "max_retries" => {
                cfg.max_retries = Some(parse_integer_u8(value).with_context(invalid)?);
            }
            "base_delay_ms" => {
                cfg.base_delay_ms = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "batch_size" => {
                let parsed = parse_integer_u64(value).with_context(invalid)?;
                let n = usize::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("batch_size out of range for usize"))?;
                cfg.batch_size = Some(n);
            }
            "batch_delay_ms" => {
                cfg.batch_delay_ms = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "ai_endpoint" => {
                cfg.ai_endpoint = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "ai_model" => {
                cfg.ai_model = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "http_connect_timeout_secs" => {
                cfg.http_connect_timeout_secs =
                    Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "http_read_timeout_secs" => {
                cfg.http_read_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u8(raw_value: &str) -> Result<u8> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<u16>()?;
    u8::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u8"))
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}
