//! Integration tests for the trigger scheduler.
//!
//! Exercises the running engine end to end: settings gating, trigger
//! coalescing, cache-only triggers, and install seeding. `flush` makes
//! completion deterministic without sleeping.

use async_trait::async_trait;
use cull_core::{Cookie, EngineConfig, LogAction, SameSite, Settings};
use cull_engine::{Engine, Trigger};
use cull_platform::{CookieFilter, CookieStore, MemoryCookieStore};
use cull_store::{kv, log, migrations, settings, snapshot, Storage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Notify, Semaphore};

async fn create_test_storage() -> Storage {
    let storage = Storage::in_memory().await.expect("open in-memory storage");
    migrations::run_migrations(storage.pool())
        .await
        .expect("run migrations");
    storage
}

fn cookie(domain: &str, name: &str) -> Cookie {
    Cookie {
        domain: domain.to_string(),
        name: name.to_string(),
        value: "v".to_string(),
        path: "/".to_string(),
        expiration_date: None,
        secure: false,
        http_only: false,
        same_site: SameSite::Lax,
    }
}

/// A cookie store whose first read parks until released, so a test can
/// hold a sweep in flight while it queues more triggers.
struct GatedStore {
    inner: MemoryCookieStore,
    entered: Notify,
    entered_once: AtomicBool,
    gate: Semaphore,
}

impl GatedStore {
    fn new() -> Self {
        Self {
            inner: MemoryCookieStore::new(),
            entered: Notify::new(),
            entered_once: AtomicBool::new(false),
            gate: Semaphore::new(0),
        }
    }

    async fn sweep_entered(&self) {
        self.entered.notified().await;
    }

    fn release(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl CookieStore for GatedStore {
    async fn get_all(&self, filter: &CookieFilter) -> cull_platform::Result<Vec<Cookie>> {
        if !self.entered_once.swap(true, Ordering::SeqCst) {
            self.entered.notify_one();
            let _permit = self.gate.acquire().await.expect("gate open");
        }
        self.inner.get_all(filter).await
    }

    async fn remove(&self, url: &str, name: &str) -> cull_platform::Result<()> {
        self.inner.remove(url, name).await
    }
}

async fn sweep_count(storage: &Storage) -> usize {
    log::entries(storage)
        .await
        .expect("read log")
        .iter()
        .filter(|e| e.action == LogAction::Sweep)
        .count()
}

#[tokio::test]
async fn test_manual_trigger_sweeps() {
    let storage = create_test_storage().await;
    let platform = Arc::new(MemoryCookieStore::new());
    platform.insert(cookie("tracker.com", "tid")).await;

    let handle = Engine::spawn(storage.clone(), platform.clone(), &EngineConfig::default());
    handle.fire(Trigger::Manual).expect("fire");
    handle.flush().await.expect("flush");

    assert!(platform.is_empty().await);
    assert_eq!(sweep_count(&storage).await, 1);
    handle.shutdown();
}

#[tokio::test]
async fn test_gated_trigger_does_nothing_when_disabled() {
    let storage = create_test_storage().await;
    let platform = Arc::new(MemoryCookieStore::new());
    platform.insert(cookie("tracker.com", "tid")).await;

    let handle = Engine::spawn(storage.clone(), platform.clone(), &EngineConfig::default());
    // Defaults leave every automatic trigger off.
    handle.fire(Trigger::TabClosed).expect("fire");
    handle.fire(Trigger::CleanupAlarm).expect("fire");
    handle.fire(Trigger::Startup).expect("fire");
    handle.flush().await.expect("flush");

    assert_eq!(platform.len().await, 1);
    assert_eq!(sweep_count(&storage).await, 0);
    handle.shutdown();
}

#[tokio::test]
async fn test_gated_trigger_sweeps_when_enabled() {
    let storage = create_test_storage().await;
    let stored = Settings {
        enable_tab_cleanup: true,
        ..Settings::default()
    };
    settings::save(&storage, &stored).await.expect("save settings");

    let platform = Arc::new(MemoryCookieStore::new());
    platform.insert(cookie("tracker.com", "tid")).await;

    let handle = Engine::spawn(storage.clone(), platform.clone(), &EngineConfig::default());
    handle.fire(Trigger::TabClosed).expect("fire");
    handle.flush().await.expect("flush");

    assert!(platform.is_empty().await);
    assert_eq!(sweep_count(&storage).await, 1);
    handle.shutdown();
}

#[tokio::test]
async fn test_trigger_burst_coalesces_into_one_sweep() {
    let storage = create_test_storage().await;
    let platform = Arc::new(MemoryCookieStore::new());
    platform.insert(cookie("tracker.com", "tid")).await;

    let handle = Engine::spawn(storage.clone(), platform.clone(), &EngineConfig::default());
    // Queue a burst before the consumer gets a chance to drain it.
    for _ in 0..10 {
        handle.fire(Trigger::Manual).expect("fire");
    }
    handle.flush().await.expect("flush");

    assert!(platform.is_empty().await);
    assert_eq!(sweep_count(&storage).await, 1);
    handle.shutdown();
}

#[tokio::test]
async fn test_triggers_during_sweep_coalesce_into_one_followup() {
    let storage = create_test_storage().await;
    let platform = Arc::new(GatedStore::new());
    platform.inner.insert(cookie("tracker.com", "tid")).await;

    let handle = Engine::spawn(storage.clone(), platform.clone(), &EngineConfig::default());
    handle.fire(Trigger::Manual).expect("fire");
    // The first sweep is now parked inside its platform read.
    platform.sweep_entered().await;

    for _ in 0..5 {
        handle.fire(Trigger::Manual).expect("fire");
    }

    platform.release();
    handle.flush().await.expect("flush");

    // Exactly one follow-up sweep for the whole burst, never one each.
    assert_eq!(sweep_count(&storage).await, 2);
    handle.shutdown();
}

#[tokio::test]
async fn test_action_click_sweeps_with_defaults() {
    let storage = create_test_storage().await;
    let platform = Arc::new(MemoryCookieStore::new());
    platform.insert(cookie("tracker.com", "tid")).await;

    let handle = Engine::spawn(storage.clone(), platform.clone(), &EngineConfig::default());
    handle.fire(Trigger::ActionClicked).expect("fire");
    handle.flush().await.expect("flush");

    assert!(platform.is_empty().await);
    assert_eq!(sweep_count(&storage).await, 1);
    handle.shutdown();
}

#[tokio::test]
async fn test_cookie_change_refreshes_cache_without_sweeping() {
    let storage = create_test_storage().await;
    let platform = Arc::new(MemoryCookieStore::new());
    platform.insert(cookie("example.com", "session")).await;

    let handle = Engine::spawn(storage.clone(), platform.clone(), &EngineConfig::default());
    handle.fire(Trigger::CookieChanged).expect("fire");
    handle.flush().await.expect("flush");

    let cache = snapshot::load(&storage)
        .await
        .expect("load snapshot")
        .expect("snapshot present");
    assert_eq!(cache.cookies.len(), 1);
    // No deletion happened.
    assert_eq!(platform.len().await, 1);
    assert_eq!(sweep_count(&storage).await, 0);
    handle.shutdown();
}

#[tokio::test]
async fn test_install_seeds_defaults_without_clobbering() {
    let storage = create_test_storage().await;
    let platform = Arc::new(MemoryCookieStore::new());

    let handle = Engine::spawn(storage.clone(), platform.clone(), &EngineConfig::default());
    handle.fire(Trigger::Installed).expect("fire");
    handle.flush().await.expect("flush");

    // Defaults are now persisted, not just implied.
    assert!(kv::get(storage.pool(), "settings")
        .await
        .expect("read settings key")
        .is_some());
    assert_eq!(
        settings::load(&storage).await.expect("load settings"),
        Settings::default()
    );

    // A second install event must not reset user changes.
    let changed = Settings {
        enable_auto_cleaning: true,
        ..Settings::default()
    };
    settings::save(&storage, &changed).await.expect("save settings");
    handle.fire(Trigger::Installed).expect("fire");
    handle.flush().await.expect("flush");

    assert_eq!(
        settings::load(&storage).await.expect("load settings"),
        changed
    );
    handle.shutdown();
}

#[tokio::test]
async fn test_fire_after_shutdown_errors() {
    let storage = create_test_storage().await;
    let platform = Arc::new(MemoryCookieStore::new());

    let handle = Engine::spawn(storage, platform, &EngineConfig::default());
    handle.shutdown();
    handle.flush().await.ok(); // drain until the consumer exits

    // The consumer is gone; firing reports it.
    let mut stopped = false;
    for _ in 0..100 {
        if handle.fire(Trigger::Manual).is_err() {
            stopped = true;
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(stopped);
}
