//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use bookmarks_core::ExportFormat;

/// Default minimum spacing between queued remote calls, in milliseconds.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 1000;

/// Default retry budget for rate-limited calls.
pub const DEFAULT_MAX_RETRIES: u8 = 3;

/// Default base backoff delay, in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 2000;

/// Save, enrich, search and move personal bookmark collections.
///
/// Bookmarks scrapes titles and descriptions for pasted links, answers
/// natural-language searches with an AI fallback, and imports or exports
/// browser-compatible bookmark files.
#[derive(Parser, Debug)]
#[command(name = "bookmarks")]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Bookmark database file (default: bookmarks.db under the data directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// User whose bookmarks are read and written
    #[arg(long, global = true, value_name = "ID")]
    pub user: Option<String>,

    /// Minimum delay between remote calls in milliseconds (0 to disable, max 60000)
    #[arg(long, global = true, value_name = "MS", default_value_t = DEFAULT_MIN_INTERVAL_MS, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub min_interval: u64,

    /// Maximum retries for rate-limited calls (0-10)
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_RETRIES, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: u8,

    /// Base backoff delay for rate-limited calls in milliseconds (max 60000)
    #[arg(long, global = true, value_name = "MS", default_value_t = DEFAULT_BASE_DELAY_MS, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub base_delay: u64,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate, enrich and save a list of URLs (arguments or stdin)
    ImportUrls(ImportUrlsArgs),

    /// Import a JSON, HTML or CSV bookmark file
    Import(ImportArgs),

    /// Export all bookmarks
    Export(ExportArgs),

    /// Search bookmarks by keyword, falling back to AI matching
    Search(SearchArgs),

    /// List bookmarks, newest first
    List(ListArgs),

    /// Save a single bookmark
    Add(AddArgs),

    /// List categories
    Categories,

    /// Create a category
    CategoryAdd(CategoryAddArgs),

    /// Show collection statistics
    Stats,
}

#[derive(Args, Debug, Clone)]
pub struct ImportUrlsArgs {
    /// URLs to import (reads stdin when omitted)
    pub urls: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// Bookmark file (.json, .html or .csv)
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Output format: json, html or csv
    #[arg(short, long, default_value = "json")]
    pub format: ExportFormat,

    /// Output path, or `-` for stdout (default: bookmarks.<ext>)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Free-text query
    pub query: String,

    /// Keyword matching only
    #[arg(long)]
    pub no_ai: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Only bookmarks in this category
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Bookmark URL
    pub url: String,

    /// Title (scraped or derived from the URL when omitted)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Category name
    #[arg(short, long)]
    pub category: Option<String>,

    /// Tag (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CategoryAddArgs {
    /// Category name
    pub name: String,

    /// Display color (default: #6b7280)
    #[arg(long)]
    pub color: Option<String>,

    /// Icon name (default: folder)
    #[arg(long)]
    pub icon: Option<String>,
}
