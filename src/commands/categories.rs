//! Category command handlers.

use anyhow::{Result, bail};
use bookmarks_core::RecordStore;
use bookmarks_core::store::NewCategory;

use crate::app::context::AppContext;
use crate::cli::CategoryAddArgs;
use crate::output::render_category_row;

pub(crate) async fn run_categories_command(ctx: &AppContext) -> Result<()> {
    let user_id = ctx.user_id()?;
    let categories = ctx.store.list_categories(&user_id).await?;
    if categories.is_empty() {
        println!("No categories yet.");
        return Ok(());
    }
    for category in &categories {
        println!("{}", render_category_row(category));
    }
    Ok(())
}

pub(crate) async fn run_category_add_command(
    ctx: &AppContext,
    args: &CategoryAddArgs,
) -> Result<()> {
    let name = args.name.trim();
    if name.is_empty() {
        bail!("Category name must not be empty");
    }

    let mut category = NewCategory::named(ctx.user_id()?, name);
    if let Some(color) = &args.color {
        category.color.clone_from(color);
    }
    if let Some(icon) = &args.icon {
        category.icon.clone_from(icon);
    }

    let saved = ctx.store.create_category(&category).await?;
    println!("Created category '{}'", saved.name);
    Ok(())
}
