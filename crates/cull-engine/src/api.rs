//! The operational surface of the engine.
//!
//! [`Api`] is what a UI or host process drives: list and delete cookies,
//! manage the lists and expressions, read and save settings, inspect the
//! cleanup log. Sweeps themselves stay with the scheduler; the api only
//! performs direct, user-initiated actions.

use crate::error::{EngineError, Result};
use cull_core::{Cookie, CookieId, Expression, ListType, LogAction, LogEntry, Settings};
use cull_platform::{cookie_url, CookieFilter, CookieStore, PlatformError};
use cull_store::{expressions, lists, log, settings, snapshot, AddOutcome, SnapshotCache, Storage};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;

/// Counts from a batch deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchDeleteReport {
    /// Cookies successfully removed
    pub deleted: usize,
    /// Deletions the platform rejected
    pub failed: usize,
}

/// Direct operations against the engine's storage and platform.
#[derive(Clone)]
pub struct Api {
    storage: Storage,
    platform: Arc<dyn CookieStore>,
    log_retention: usize,
}

impl Api {
    /// Create the api over a storage and platform pair.
    #[must_use]
    pub fn new(storage: Storage, platform: Arc<dyn CookieStore>, log_retention: usize) -> Self {
        Self {
            storage,
            platform,
            log_retention,
        }
    }

    /// The live platform cookie set.
    pub async fn list_cookies(&self) -> Result<Vec<Cookie>> {
        Ok(self.platform.get_all(&CookieFilter::default()).await?)
    }

    /// The cached snapshot, or `None` before the first refresh.
    pub async fn cached_cookies(&self) -> Result<Option<SnapshotCache>> {
        Ok(snapshot::load(&self.storage).await?)
    }

    /// Delete one cookie and record the deletion.
    pub async fn delete_cookie(&self, cookie: &Cookie) -> Result<()> {
        self.platform.remove(&cookie_url(cookie), &cookie.name).await?;
        self.append_log(LogEntry::now(
            LogAction::Delete,
            &cookie.domain,
            format!("{}: deleted by user", cookie.name),
        ))
        .await;
        Ok(())
    }

    /// Delete a batch of cookies concurrently.
    ///
    /// Failures are contained per cookie and counted; the batch never
    /// aborts part way.
    pub async fn batch_delete(&self, cookies: &[Cookie]) -> Result<BatchDeleteReport> {
        let mut removals: FuturesUnordered<_> = cookies
            .iter()
            .map(|cookie| async move {
                let outcome = self.platform.remove(&cookie_url(cookie), &cookie.name).await;
                (cookie, outcome)
            })
            .collect();

        let mut report = BatchDeleteReport::default();
        let mut entries = Vec::new();

        while let Some((cookie, outcome)) = removals.next().await {
            match outcome {
                Ok(()) => {
                    report.deleted += 1;
                    entries.push(LogEntry::now(
                        LogAction::Delete,
                        &cookie.domain,
                        format!("{}: deleted by user", cookie.name),
                    ));
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(domain = %cookie.domain, name = %cookie.name, error = %e, "batch removal failed");
                    entries.push(LogEntry::now(
                        LogAction::DeleteFailed,
                        &cookie.domain,
                        format!("{}: {e}", cookie.name),
                    ));
                }
            }
        }

        if let Err(e) = log::append(&self.storage, entries, self.log_retention).await {
            tracing::warn!(error = %e, "cleanup log append failed");
        }
        Ok(report)
    }

    /// Add a cookie id to the whitelist or graylist.
    pub async fn add_to_list(&self, id: &CookieId, list_type: ListType) -> Result<AddOutcome> {
        Ok(lists::add(&self.storage, id, list_type).await?)
    }

    /// Remove a cookie id from a list. Returns true if an entry existed.
    pub async fn remove_from_list(&self, id: &CookieId, list_type: ListType) -> Result<bool> {
        Ok(lists::remove(&self.storage, id, list_type).await?)
    }

    /// Insert or replace a domain expression.
    pub async fn upsert_expression(&self, expression: Expression) -> Result<()> {
        Ok(expressions::upsert(&self.storage, expression).await?)
    }

    /// Delete a domain expression by id. Returns true if one existed.
    pub async fn delete_expression(&self, id: &str) -> Result<bool> {
        Ok(expressions::delete(&self.storage, id).await?)
    }

    /// All stored domain expressions.
    pub async fn expressions(&self) -> Result<Vec<Expression>> {
        Ok(expressions::load(&self.storage).await?)
    }

    /// The stored settings, or defaults when none are stored.
    pub async fn settings(&self) -> Result<Settings> {
        Ok(settings::load(&self.storage).await?)
    }

    /// Validate and persist new settings.
    pub async fn save_settings(&self, new: &Settings) -> Result<()> {
        Ok(settings::save(&self.storage, new).await?)
    }

    /// The retained cleanup log, oldest first.
    pub async fn cleanup_log(&self) -> Result<Vec<LogEntry>> {
        Ok(log::entries(&self.storage).await?)
    }

    /// Drop the retained cleanup log.
    pub async fn clear_cleanup_log(&self) -> Result<()> {
        Ok(log::clear(&self.storage).await?)
    }

    /// Verify the platform cookie store is reachable.
    ///
    /// # Errors
    /// Surfaces [`PlatformError::PermissionDenied`] when cookie access has
    /// not been granted, so the host can prompt instead of silently doing
    /// nothing.
    pub async fn startup_check(&self) -> Result<()> {
        match self.platform.get_all(&CookieFilter::default()).await {
            Ok(_) => Ok(()),
            Err(e @ PlatformError::PermissionDenied(_)) => {
                tracing::error!(error = %e, "cookie access not granted");
                Err(EngineError::Platform(e))
            }
            Err(e) => Err(EngineError::Platform(e)),
        }
    }

    async fn append_log(&self, entry: LogEntry) {
        if let Err(e) = log::append(&self.storage, vec![entry], self.log_retention).await {
            tracing::warn!(error = %e, "cleanup log append failed");
        }
    }
}
