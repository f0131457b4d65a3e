//! In-memory cookie store.
//!
//! A [`CookieStore`] backed by a locked vector, with the failure-injection
//! hooks the engine tests need: access denial (permission failures) and
//! targeted removal failures (partial-failure sweeps).

use crate::error::{PlatformError, Result};
use crate::{cookie_url, CookieFilter, CookieStore};
use async_trait::async_trait;
use cull_core::Cookie;
use std::collections::HashSet;
use tokio::sync::RwLock;

/// In-memory implementation of the platform cookie store.
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    cookies: RwLock<Vec<Cookie>>,
    denied: RwLock<bool>,
    // (url, name) pairs whose removal fails with an I/O error
    failing_removals: RwLock<HashSet<(String, String)>>,
}

impl MemoryCookieStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cookie, replacing any existing cookie with the same
    /// domain, name and path.
    pub async fn insert(&self, cookie: Cookie) {
        let mut cookies = self.cookies.write().await;
        cookies.retain(|c| {
            c.domain != cookie.domain || c.name != cookie.name || c.path != cookie.path
        });
        cookies.push(cookie);
    }

    /// Number of cookies currently in the store.
    pub async fn len(&self) -> usize {
        self.cookies.read().await.len()
    }

    /// True when the store holds no cookies.
    pub async fn is_empty(&self) -> bool {
        self.cookies.read().await.is_empty()
    }

    /// Make every subsequent call fail with `PermissionDenied`.
    pub async fn deny_access(&self) {
        *self.denied.write().await = true;
    }

    /// Restore access after [`deny_access`](Self::deny_access).
    pub async fn allow_access(&self) {
        *self.denied.write().await = false;
    }

    /// Make removal of this specific cookie fail with an I/O error while
    /// leaving it in the store.
    pub async fn fail_removal_of(&self, cookie: &Cookie) {
        self.failing_removals
            .write()
            .await
            .insert((cookie_url(cookie), cookie.name.clone()));
    }

    async fn check_access(&self) -> Result<()> {
        if *self.denied.read().await {
            return Err(PlatformError::PermissionDenied(
                "cookie access revoked".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CookieStore for MemoryCookieStore {
    async fn get_all(&self, filter: &CookieFilter) -> Result<Vec<Cookie>> {
        self.check_access().await?;
        let cookies = self.cookies.read().await;
        Ok(cookies
            .iter()
            .filter(|c| filter.domain.as_ref().map_or(true, |d| &c.domain == d))
            .cloned()
            .collect())
    }

    async fn remove(&self, url: &str, name: &str) -> Result<()> {
        self.check_access().await?;

        if self
            .failing_removals
            .read()
            .await
            .contains(&(url.to_string(), name.to_string()))
        {
            return Err(PlatformError::Io(format!(
                "removal of '{name}' at {url} failed"
            )));
        }

        let mut cookies = self.cookies.write().await;
        let before = cookies.len();
        cookies.retain(|c| !(c.name == name && cookie_url(c) == url));

        if cookies.len() == before {
            tracing::debug!(url, name, "remove: cookie not present");
            return Err(PlatformError::NotFound {
                url: url.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }
}
