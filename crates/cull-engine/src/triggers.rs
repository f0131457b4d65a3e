//! Cleanup triggers.
//!
//! Every external event that can reach the scheduler is named here. The
//! scheduler gates each trigger against the stored [`Settings`] before it
//! acts; the trigger itself carries no payload beyond its kind.
//!
//! [`Settings`]: cull_core::Settings

use std::fmt;

/// Alarm name for the periodic cleanup sweep.
pub const CLEANUP_ALARM: &str = "cookieCleanup";

/// Alarm name for the periodic snapshot cache refresh.
pub const CACHE_ALARM: &str = "updateCache";

/// An event that may start a sweep or a cache refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The periodic cleanup alarm fired
    CleanupAlarm,
    /// The periodic cache refresh alarm fired
    CacheAlarm,
    /// A browser tab was closed
    TabClosed,
    /// A tab navigated to a different domain
    DomainChanged,
    /// The browser started up
    Startup,
    /// The user asked for a cleanup explicitly
    Manual,
    /// A cookie was created, changed or removed in the platform store
    CookieChanged,
    /// The toolbar action was clicked
    ActionClicked,
    /// The engine was installed for the first time
    Installed,
}

impl Trigger {
    /// Map a fired alarm back to its trigger, by name.
    #[must_use]
    pub fn for_alarm(name: &str) -> Option<Self> {
        match name {
            CLEANUP_ALARM => Some(Self::CleanupAlarm),
            CACHE_ALARM => Some(Self::CacheAlarm),
            _ => None,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CleanupAlarm => "cleanup alarm",
            Self::CacheAlarm => "cache alarm",
            Self::TabClosed => "tab closed",
            Self::DomainChanged => "domain change",
            Self::Startup => "startup",
            Self::Manual => "manual",
            Self::CookieChanged => "cookie change",
            Self::ActionClicked => "action clicked",
            Self::Installed => "install",
        };
        write!(f, "{name}")
    }
}
