//! Periodic alarms.
//!
//! Two interval tasks stand in for the browser alarm API: `cookieCleanup`
//! fires the periodic sweep trigger and `updateCache` the periodic cache
//! refresh. An alarm configured to zero minutes is disabled.

use crate::scheduler::EngineHandle;
use crate::triggers::{Trigger, CACHE_ALARM, CLEANUP_ALARM};
use cull_core::AlarmConfig;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Spawn the configured alarm tasks.
pub fn spawn(config: &AlarmConfig, handle: &EngineHandle) {
    spawn_alarm(
        handle.clone(),
        CLEANUP_ALARM,
        config.cleanup_interval_mins,
        Trigger::CleanupAlarm,
    );
    spawn_alarm(
        handle.clone(),
        CACHE_ALARM,
        config.cache_refresh_interval_mins,
        Trigger::CacheAlarm,
    );
}

fn spawn_alarm(handle: EngineHandle, name: &'static str, interval_mins: u64, trigger: Trigger) {
    if interval_mins == 0 {
        tracing::debug!(alarm = name, "alarm disabled");
        return;
    }

    tokio::spawn(async move {
        let period = Duration::from_secs(interval_mins * 60);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; alarms fire after a full period.
        interval.tick().await;

        loop {
            interval.tick().await;
            tracing::debug!(alarm = name, "alarm fired");
            if handle.fire(trigger).is_err() {
                break;
            }
        }
    });
}
