//! List and add command handlers.

use anyhow::{Result, bail};
use bookmarks_core::store::NewBookmark;
use bookmarks_core::{BookmarkQuery, RecordStore, favicon_url, validate_urls};
use tracing::info;

use crate::app::context::AppContext;
use crate::cli::{AddArgs, ListArgs};
use crate::output::render_bookmark_row;

pub(crate) async fn run_list_command(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    let user_id = ctx.user_id()?;
    let mut query = BookmarkQuery::for_user(user_id);
    if let Some(category) = &args.category {
        query = query.in_category(category);
    }
    let bookmarks = ctx.store.list_bookmarks(&query).await?;

    if bookmarks.is_empty() {
        match &args.category {
            Some(category) => println!("No bookmarks in category '{category}'."),
            None => println!("No bookmarks saved yet."),
        }
        return Ok(());
    }

    for bookmark in &bookmarks {
        println!("{}", render_bookmark_row(bookmark));
    }
    Ok(())
}

pub(crate) async fn run_add_command(ctx: &AppContext, args: &AddArgs) -> Result<()> {
    let Some(url) = validate_urls(&args.url).into_iter().next() else {
        bail!("Invalid URL: '{}'", args.url);
    };
    let user_id = ctx.user_id()?;

    let (title, description, favicon) = match args.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => (title.to_string(), None, favicon_url(&url)),
        _ => {
            let enricher = ctx.enricher(ctx.admission_queue())?;
            let mut processed = enricher
                .process_urls_in_batches(std::slice::from_ref(&url), None)
                .await;
            let Some(page) = processed.pop() else {
                bail!("Failed to process URL");
            };
            if let Some(error) = &page.error {
                info!(%url, %error, "enrichment call failed; using fallback title");
            }
            (page.title, Some(page.description), page.favicon_url)
        }
    };

    let bookmark = NewBookmark {
        user_id,
        title,
        url,
        description: description.filter(|d| !d.is_empty()),
        favicon_url: Some(favicon).filter(|f| !f.is_empty()),
        category: args.category.clone().filter(|c| !c.trim().is_empty()),
        tags: args.tags.clone(),
        is_favorite: false,
    };
    let saved = ctx.store.create_bookmark(&bookmark).await?;
    println!("Saved bookmark {}: {}", saved.id, saved.title);
    Ok(())
}
