//! Search command handler: keyword matches with AI fallback.

use anyhow::Result;
use bookmarks_core::{BookmarkQuery, RecordStore};
use tracing::warn;

use crate::app::context::AppContext;
use crate::cli::SearchArgs;
use crate::output::render_bookmark_row;

pub(crate) async fn run_search_command(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let user_id = ctx.user_id()?;
    let bookmarks = ctx
        .store
        .list_bookmarks(&BookmarkQuery::for_user(&user_id))
        .await?;
    if bookmarks.is_empty() {
        println!("No bookmarks saved yet.");
        return Ok(());
    }

    let service = ctx.search_service(ctx.admission_queue())?;
    let outcome = service.search(&args.query, &bookmarks, !args.no_ai).await;

    if outcome.rate_limited {
        println!("AI search is rate limited right now; showing keyword matches only.");
    } else if let Some(error) = &outcome.ai_error {
        warn!(%error, "AI search failed; showing keyword matches only");
    }

    if outcome.results.is_empty() {
        println!("No bookmarks matched '{}'.", args.query);
        return Ok(());
    }

    for bookmark in &outcome.results {
        println!("{}", render_bookmark_row(bookmark));
    }
    if outcome.used_ai {
        println!("{} results (AI assisted)", outcome.results.len());
    } else {
        println!("{} results", outcome.results.len());
    }
    Ok(())
}
