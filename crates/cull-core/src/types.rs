//! Shared types used across the cull engine.
//!
//! These types mirror the persisted storage schema: the serde renames keep
//! the on-disk JSON identical to what the extension storage historically
//! contained (`whiteList` entries as `"<domain>:<name>"` strings, camelCase
//! cookie fields, expression records with `domain`/`type`/`options` keys).

use crate::error::CullError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// A cookie as observed in the platform cookie store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    /// Host the cookie belongs to
    pub domain: String,
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Cookie path
    pub path: String,
    /// Expiry in seconds since the Unix epoch; `None` for session cookies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
    /// Whether the cookie is restricted to secure contexts
    pub secure: bool,
    /// Whether the cookie is inaccessible to page scripts
    pub http_only: bool,
    /// SameSite policy
    pub same_site: SameSite,
}

/// SameSite policy of a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameSite {
    /// Sent in all contexts
    NoRestriction,
    /// Sent on top-level navigations
    Lax,
    /// Sent only in a first-party context
    Strict,
    /// The cookie did not declare a policy
    Unspecified,
}

/// Addressable identity of a cookie: `"<domain>:<name>"`.
///
/// Identity deliberately ignores `path`: two cookies sharing domain and name
/// but living under different paths collapse into one list entry, and a
/// whitelist hit protects both. This matches the historical list format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CookieId(String);

impl CookieId {
    /// Derive the identity of a cookie.
    #[must_use]
    pub fn of(cookie: &Cookie) -> Self {
        Self(format!("{}:{}", cookie.domain, cookie.name))
    }

    /// Parse a stored identity string.
    ///
    /// # Errors
    /// Returns a validation error unless the string is `"<domain>:<name>"`
    /// with a non-empty domain part.
    pub fn parse(id: impl Into<String>) -> Result<Self, CullError> {
        let id = id.into();
        match id.split_once(':') {
            Some((domain, _)) if !domain.is_empty() => Ok(Self(id)),
            _ => Err(CullError::Validation(format!(
                "invalid cookie id: expected '<domain>:<name>', got '{id}'"
            ))),
        }
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The domain half of the identity.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once(':').map_or("", |(domain, _)| domain)
    }
}

impl fmt::Display for CookieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which retention list an entry or expression belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    /// Exempt from deletion unconditionally
    Whitelist,
    /// Exempt unless graylist cleanup is enabled
    Graylist,
}

impl ListType {
    /// Persisted storage key holding this list's entries.
    #[must_use]
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Whitelist => "whiteList",
            Self::Graylist => "grayList",
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Whitelist => write!(f, "whitelist"),
            Self::Graylist => write!(f, "graylist"),
        }
    }
}

/// The exact-identity membership of both lists, loaded in one read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSnapshot {
    /// Cookie ids exempt from deletion
    pub whitelist: HashSet<CookieId>,
    /// Cookie ids conditionally exempt from deletion
    pub graylist: HashSet<CookieId>,
}

/// A domain wildcard pattern associated with a list type.
///
/// Independent of exact-identity list entries; both mechanisms feed the
/// policy evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    /// Unique identifier
    pub id: String,
    /// Wildcard pattern, e.g. `*.example.com`
    #[serde(rename = "domain")]
    pub domain_pattern: String,
    /// Which list the pattern contributes to
    #[serde(rename = "type")]
    pub list_type: ListType,
    /// Per-expression retention options
    #[serde(default)]
    pub options: Vec<ExpressionOption>,
}

impl Expression {
    /// Create a new expression with a generated id.
    #[must_use]
    pub fn new(domain_pattern: impl Into<String>, list_type: ListType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            domain_pattern: domain_pattern.into(),
            list_type,
            options: Vec::new(),
        }
    }
}

/// Retention options attached to an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpressionOption {
    /// Keep the site's HTTP cache
    #[serde(rename = "keepCache")]
    KeepCache,
    /// Keep the site's IndexedDB data
    #[serde(rename = "keepIndexedDB")]
    KeepIndexedDb,
    /// Keep the site's localStorage data
    #[serde(rename = "keepLocalStorage")]
    KeepLocalStorage,
}

/// Process-wide settings controlling which cleanup triggers are active.
///
/// Loaded from persisted storage at startup and mutated only through the
/// explicit save operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Settings {
    /// Whether the periodic cleanup alarm starts sweeps
    pub enable_auto_cleaning: bool,
    /// Cleanup delay in seconds (0-3600)
    pub cleaning_delay: u32,
    /// Whether closing a tab triggers a sweep
    pub enable_tab_cleanup: bool,
    /// Whether cross-domain navigation triggers a sweep
    pub enable_domain_change_cleanup: bool,
    /// Whether graylisted cookies lose their protection during sweeps
    pub enable_graylist_cleanup: bool,
    /// Whether browser startup triggers a sweep
    pub clean_open_tabs_on_startup: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_auto_cleaning: false,
            cleaning_delay: 30,
            enable_tab_cleanup: false,
            enable_domain_change_cleanup: false,
            enable_graylist_cleanup: false,
            clean_open_tabs_on_startup: false,
        }
    }
}

/// Upper bound for `cleaning_delay`, in seconds.
pub const MAX_CLEANING_DELAY_SECS: u32 = 3600;

impl Settings {
    /// Validate boundary input before it is persisted or handed to the
    /// evaluator.
    ///
    /// # Errors
    /// Returns `CullError::Validation` if `cleaning_delay` exceeds one hour.
    pub fn validate(&self) -> Result<(), CullError> {
        if self.cleaning_delay > MAX_CLEANING_DELAY_SECS {
            return Err(CullError::Validation(format!(
                "cleaning_delay must be 0-{MAX_CLEANING_DELAY_SECS} seconds, got {}",
                self.cleaning_delay
            )));
        }
        Ok(())
    }
}

/// One recorded cleanup action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Unique identifier
    pub id: Uuid,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// What happened
    pub action: LogAction,
    /// Domain the action concerned (`*` for whole-store actions)
    pub domain: String,
    /// Human-readable cause or summary
    pub details: String,
}

impl LogEntry {
    /// Create an entry stamped with the current time.
    #[must_use]
    pub fn now(action: LogAction, domain: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            action,
            domain: domain.into(),
            details: details.into(),
        }
    }
}

/// Kinds of recorded cleanup actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogAction {
    /// A cookie was deleted
    Delete,
    /// A deletion was issued but the platform reported failure
    DeleteFailed,
    /// A sweep completed; details carry the summary counts
    Sweep,
}
