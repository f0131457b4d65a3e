//! Sweep execution.
//!
//! A sweep reads the platform cookie set once, classifies every cookie
//! through the policy evaluator, issues the resulting deletions, refreshes
//! the snapshot cache, and records what happened in the cleanup log.
//! Removal failures are contained per cookie: one stubborn cookie never
//! aborts the rest of the sweep.

use crate::error::Result;
use crate::triggers::Trigger;
use cull_core::{LogAction, LogEntry};
use cull_platform::{cookie_url, CookieFilter, CookieStore};
use cull_policy::Verdict;
use cull_store::{expressions, lists, log, settings, snapshot, Storage};
use std::sync::Arc;

/// Counts from one completed sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Cookies read from the platform
    pub examined: usize,
    /// Cookies successfully removed
    pub deleted: usize,
    /// Deletions the platform rejected
    pub failed: usize,
}

/// Executes sweeps and cache refreshes against one storage and platform.
#[derive(Clone)]
pub struct Sweeper {
    storage: Storage,
    platform: Arc<dyn CookieStore>,
    log_retention: usize,
}

impl Sweeper {
    /// Create a sweeper.
    #[must_use]
    pub fn new(storage: Storage, platform: Arc<dyn CookieStore>, log_retention: usize) -> Self {
        Self {
            storage,
            platform,
            log_retention,
        }
    }

    /// Run one full sweep.
    ///
    /// # Errors
    /// Returns an error when the initial platform read or a storage read
    /// fails; the sweep is aborted and nothing is deleted. Individual
    /// removal failures do not fail the sweep.
    pub async fn run_sweep(&self, cause: Trigger) -> Result<SweepReport> {
        let list_snapshot = lists::load(&self.storage).await?;
        let expressions = expressions::load(&self.storage).await?;
        let settings = settings::load(&self.storage).await?;

        let cookies = self.platform.get_all(&CookieFilter::default()).await?;
        let examined = cookies.len();

        let mut entries = Vec::new();
        let mut deleted = 0;
        let mut failed = 0;

        for cookie in &cookies {
            let verdict = cull_policy::decide(cookie, &list_snapshot, &expressions, &settings);
            let Verdict::Delete(reason) = verdict else {
                continue;
            };

            let url = cookie_url(cookie);
            match self.platform.remove(&url, &cookie.name).await {
                Ok(()) => {
                    deleted += 1;
                    entries.push(LogEntry::now(
                        LogAction::Delete,
                        &cookie.domain,
                        format!("{}: {reason}", cookie.name),
                    ));
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(domain = %cookie.domain, name = %cookie.name, error = %e, "cookie removal failed");
                    entries.push(LogEntry::now(
                        LogAction::DeleteFailed,
                        &cookie.domain,
                        format!("{}: {e}", cookie.name),
                    ));
                }
            }
        }

        // Re-read the platform so the cache reflects the post-sweep set.
        // A refresh failure here leaves a stale cache, not a broken sweep.
        if let Err(e) = self.refresh_cache().await {
            tracing::warn!(error = %e, "post-sweep cache refresh failed");
        }

        entries.push(LogEntry::now(
            LogAction::Sweep,
            "*",
            format!("{cause}: examined {examined}, deleted {deleted}, failed {failed}"),
        ));
        if let Err(e) = log::append(&self.storage, entries, self.log_retention).await {
            tracing::warn!(error = %e, "cleanup log append failed");
        }

        tracing::info!(%cause, examined, deleted, failed, "sweep completed");
        Ok(SweepReport {
            examined,
            deleted,
            failed,
        })
    }

    /// Refresh the snapshot cache from the live platform cookie set.
    pub async fn refresh_cache(&self) -> Result<()> {
        let cookies = self.platform.get_all(&CookieFilter::default()).await?;
        snapshot::store(&self.storage, &cookies).await?;
        Ok(())
    }
}
