//! The trigger scheduler.
//!
//! All triggers funnel into one queue with a single consumer task, so at
//! most one sweep is ever in flight. The consumer drains every pending
//! message before acting and collapses the drained batch into one plan:
//! a burst of triggers costs one sweep, not one per trigger.

use crate::alarms;
use crate::error::{EngineError, Result};
use crate::sweeper::Sweeper;
use crate::triggers::Trigger;
use cull_core::{EngineConfig, Settings};
use cull_platform::CookieStore;
use cull_store::{settings, Storage};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

enum Msg {
    Trigger(Trigger),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// What a drained trigger batch amounts to, after settings gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    /// Seed default settings before anything else (install)
    pub seed_defaults: bool,
    /// Run a sweep, attributed to the first trigger that demanded one
    pub sweep_cause: Option<Trigger>,
    /// Refresh the snapshot cache (subsumed by a sweep, which refreshes
    /// on its own)
    pub refresh: bool,
}

/// Collapse a drained trigger batch into one plan.
///
/// Gating: the cleanup alarm, cookie changes and install sweep only
/// when auto cleaning is on; tab close, domain change and startup each
/// have their own setting. Manual triggers and action clicks are
/// user-invoked and always sweep. A cookie change refreshes the cache
/// even when gated off the sweep, and the cache alarm only refreshes.
#[must_use]
pub fn plan_batch(triggers: &[Trigger], settings: &Settings) -> BatchPlan {
    let mut plan = BatchPlan {
        seed_defaults: false,
        sweep_cause: None,
        refresh: false,
    };

    for &trigger in triggers {
        let sweeps = match trigger {
            Trigger::Manual | Trigger::ActionClicked => true,
            Trigger::CleanupAlarm => settings.enable_auto_cleaning,
            Trigger::TabClosed => settings.enable_tab_cleanup,
            Trigger::DomainChanged => settings.enable_domain_change_cleanup,
            Trigger::Startup => settings.clean_open_tabs_on_startup,
            Trigger::CookieChanged => {
                plan.refresh = true;
                settings.enable_auto_cleaning
            }
            Trigger::CacheAlarm => {
                plan.refresh = true;
                false
            }
            Trigger::Installed => {
                plan.seed_defaults = true;
                plan.refresh = true;
                settings.enable_auto_cleaning
            }
        };
        if sweeps && plan.sweep_cause.is_none() {
            plan.sweep_cause = Some(trigger);
        }
    }
    plan
}

/// Handle for firing triggers into a running engine.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<Msg>,
}

impl EngineHandle {
    /// Queue a trigger.
    ///
    /// # Errors
    /// Returns [`EngineError::Stopped`] after shutdown.
    pub fn fire(&self, trigger: Trigger) -> Result<()> {
        self.tx
            .send(Msg::Trigger(trigger))
            .map_err(|_| EngineError::Stopped)
    }

    /// Wait until every trigger queued before this call has been acted on.
    ///
    /// # Errors
    /// Returns [`EngineError::Stopped`] after shutdown.
    pub async fn flush(&self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(Msg::Flush(ack))
            .map_err(|_| EngineError::Stopped)?;
        done.await.map_err(|_| EngineError::Stopped)
    }

    /// Stop the consumer task. Triggers queued after this are dropped.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Msg::Shutdown);
    }
}

/// The running retention engine.
pub struct Engine;

impl Engine {
    /// Spawn the consumer task and the periodic alarms.
    pub fn spawn(
        storage: Storage,
        platform: Arc<dyn CookieStore>,
        config: &EngineConfig,
    ) -> EngineHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = EngineHandle { tx };

        let sweeper = Sweeper::new(storage.clone(), platform, config.log.retention_cap);
        tokio::spawn(consume(rx, storage, sweeper));
        alarms::spawn(&config.alarms, &handle);

        handle
    }
}

async fn consume(mut rx: mpsc::UnboundedReceiver<Msg>, storage: Storage, sweeper: Sweeper) {
    while let Some(first) = rx.recv().await {
        let mut triggers = Vec::new();
        let mut flushes = Vec::new();
        let mut shutdown = false;

        let mut stash = |msg: Msg| match msg {
            Msg::Trigger(t) => triggers.push(t),
            Msg::Flush(ack) => flushes.push(ack),
            Msg::Shutdown => shutdown = true,
        };
        stash(first);
        while let Ok(msg) = rx.try_recv() {
            stash(msg);
        }

        if !triggers.is_empty() {
            if let Err(e) = act(&storage, &sweeper, &triggers).await {
                tracing::error!(error = %e, "trigger batch failed");
            }
        }
        for ack in flushes {
            let _ = ack.send(());
        }
        if shutdown {
            break;
        }
    }
    tracing::debug!("scheduler consumer stopped");
}

async fn act(storage: &Storage, sweeper: &Sweeper, triggers: &[Trigger]) -> Result<()> {
    // Loading before seeding is sound: seeding only writes when no
    // settings are stored, and loading falls back to the same defaults.
    let current = settings::load(storage).await?;
    let plan = plan_batch(triggers, &current);
    tracing::debug!(batch = triggers.len(), ?plan, "trigger batch drained");

    if plan.seed_defaults {
        settings::seed_defaults(storage).await?;
    }
    if let Some(cause) = plan.sweep_cause {
        sweeper.run_sweep(cause).await?;
    } else if plan.refresh {
        sweeper.refresh_cache().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_user_invoked_always_sweeps() {
        let settings = Settings::default();
        for trigger in [Trigger::Manual, Trigger::ActionClicked] {
            let plan = plan_batch(&[trigger], &settings);
            assert_eq!(plan.sweep_cause, Some(trigger));
        }
    }

    #[test]
    fn test_plan_gated_triggers_respect_settings() {
        let mut settings = Settings::default();

        for trigger in [
            Trigger::CleanupAlarm,
            Trigger::TabClosed,
            Trigger::DomainChanged,
            Trigger::Startup,
        ] {
            let plan = plan_batch(&[trigger], &settings);
            assert_eq!(plan.sweep_cause, None, "{trigger} should be gated off");
        }

        settings.enable_auto_cleaning = true;
        settings.enable_tab_cleanup = true;
        settings.enable_domain_change_cleanup = true;
        settings.clean_open_tabs_on_startup = true;

        for trigger in [
            Trigger::CleanupAlarm,
            Trigger::TabClosed,
            Trigger::DomainChanged,
            Trigger::Startup,
        ] {
            let plan = plan_batch(&[trigger], &settings);
            assert_eq!(plan.sweep_cause, Some(trigger));
        }
    }

    #[test]
    fn test_plan_batch_coalesces_to_one_sweep() {
        let mut settings = Settings::default();
        settings.enable_tab_cleanup = true;

        let plan = plan_batch(
            &[Trigger::TabClosed, Trigger::Manual, Trigger::TabClosed],
            &settings,
        );
        // One sweep, attributed to the first sweeping trigger.
        assert_eq!(plan.sweep_cause, Some(Trigger::TabClosed));
    }

    #[test]
    fn test_plan_cookie_change_refreshes_even_when_gated_off() {
        let settings = Settings::default();
        let plan = plan_batch(&[Trigger::CookieChanged], &settings);
        assert_eq!(plan.sweep_cause, None);
        assert!(plan.refresh);
    }

    #[test]
    fn test_plan_cookie_change_sweeps_under_auto_cleaning() {
        let settings = Settings {
            enable_auto_cleaning: true,
            ..Settings::default()
        };
        let plan = plan_batch(&[Trigger::CookieChanged], &settings);
        assert_eq!(plan.sweep_cause, Some(Trigger::CookieChanged));
        assert!(plan.refresh);
    }

    #[test]
    fn test_plan_cache_alarm_never_sweeps() {
        let settings = Settings {
            enable_auto_cleaning: true,
            ..Settings::default()
        };
        let plan = plan_batch(&[Trigger::CacheAlarm], &settings);
        assert_eq!(plan.sweep_cause, None);
        assert!(plan.refresh);
    }

    #[test]
    fn test_plan_install_seeds_without_sweeping_fresh_profile() {
        // A fresh profile has auto cleaning off, so install never sweeps it.
        let plan = plan_batch(&[Trigger::Installed], &Settings::default());
        assert!(plan.seed_defaults);
        assert!(plan.refresh);
        assert_eq!(plan.sweep_cause, None);
    }

    #[test]
    fn test_plan_empty_batch() {
        let plan = plan_batch(&[], &Settings::default());
        assert!(!plan.seed_defaults);
        assert!(!plan.refresh);
        assert_eq!(plan.sweep_cause, None);
    }
}
