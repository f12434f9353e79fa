//! CLI command handlers.

mod bookmarks;
mod categories;
mod export;
mod import;
mod search;

pub(crate) use bookmarks::{run_add_command, run_list_command};
pub(crate) use categories::{run_categories_command, run_category_add_command};
pub(crate) use export::{run_export_command, run_stats_command};
pub(crate) use import::{run_import_command, run_import_urls_command};
pub(crate) use search::run_search_command;
