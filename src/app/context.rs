//! Shared runtime context built after CLI/config resolution.

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use bookmarks_core::{
    AdmissionQueue, Database, Enricher, HttpScraper, HttpTextGenerator, SearchService,
    SessionHub, SqliteStore, User,
};
use tracing::{debug, info};

use crate::app::config_runtime::{AI_API_KEY_ENV, RuntimeSettings};
use crate::app_config::env_var_non_empty_os;

/// Holds the open store and signed-in session so command handlers can use
/// `ctx.store`, `ctx.user_id()`, etc., instead of passing many arguments.
pub(crate) struct AppContext {
    pub(crate) settings: RuntimeSettings,
    pub(crate) store: SqliteStore,
    pub(crate) session: SessionHub,
}

impl AppContext {
    /// Opens the database and signs in the configured user.
    pub(crate) async fn open(settings: RuntimeSettings) -> Result<Self> {
        if let Some(parent) = settings.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory '{}'", parent.display())
            })?;
        }

        let db = Database::new(&settings.db_path).await.with_context(|| {
            format!("Failed to open database '{}'", settings.db_path.display())
        })?;
        info!(path = %settings.db_path.display(), "database ready");

        let session = SessionHub::new();
        session.sign_in(User {
            id: settings.user_id.clone(),
            email: None,
        });

        Ok(Self {
            settings,
            store: SqliteStore::new(db),
            session,
        })
    }

    /// Returns the signed-in user's id.
    pub(crate) fn user_id(&self) -> Result<String> {
        self.session
            .state()
            .user
            .map(|user| user.id)
            .context("No signed-in user")
    }

    /// Creates a fresh admission queue with the configured pacing.
    pub(crate) fn admission_queue(&self) -> AdmissionQueue {
        AdmissionQueue::new(self.settings.admission)
    }

    /// Builds the URL enricher over a live HTTP scraper.
    pub(crate) fn enricher(&self, queue: AdmissionQueue) -> Result<Enricher> {
        let scraper = HttpScraper::new(self.settings.http_timeouts)
            .context("Failed to build page scraper")?;
        Ok(Enricher::new(queue, Arc::new(scraper), self.settings.batch))
    }

    /// Builds the search service over the configured AI endpoint.
    pub(crate) fn search_service(&self, queue: AdmissionQueue) -> Result<SearchService> {
        let api_key =
            env_var_non_empty_os(AI_API_KEY_ENV).and_then(|key| key.into_string().ok());
        if api_key.is_none() {
            debug!(env = AI_API_KEY_ENV, "no AI API key set");
        }
        let generator = HttpTextGenerator::new(
            &self.settings.ai_endpoint,
            api_key,
            self.settings.http_timeouts,
        )
        .context("Failed to build AI client")?;
        Ok(SearchService::new(queue, Arc::new(generator)).with_model(&self.settings.ai_model))
    }

    /// Signs out and closes the database pool.
    pub(crate) async fn close(self) {
        self.session.sign_out();
        self.store.database().clone().close().await;
    }
}
