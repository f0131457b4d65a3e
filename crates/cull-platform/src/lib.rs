//! Browser platform boundary for the cull engine.
//!
//! The live browser cookie store is an external collaborator; the engine
//! talks to it only through the [`CookieStore`] trait. [`MemoryCookieStore`]
//! is the in-process implementation used by tests and by anything driving
//! the engine outside a real browser host.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod memory;

pub use error::{PlatformError, Result};
pub use memory::MemoryCookieStore;

use async_trait::async_trait;
use cull_core::Cookie;

/// Read filter for [`CookieStore::get_all`]. The default filter selects
/// every cookie in the store.
#[derive(Debug, Clone, Default)]
pub struct CookieFilter {
    /// Restrict to cookies with exactly this domain
    pub domain: Option<String>,
}

/// The platform cookie store.
///
/// `remove` addresses cookies by synthesized URL plus name, the way the
/// browser removal API does; use [`cookie_url`] to build the URL.
#[async_trait]
pub trait CookieStore: Send + Sync {
    /// Fetch the current cookie set.
    async fn get_all(&self, filter: &CookieFilter) -> Result<Vec<Cookie>>;

    /// Remove one cookie addressed by URL and name.
    async fn remove(&self, url: &str, name: &str) -> Result<()>;
}

/// Synthesize the removal URL for a cookie: `http[s]://<domain><path>`,
/// scheme chosen by the cookie's `secure` flag.
#[must_use]
pub fn cookie_url(cookie: &Cookie) -> String {
    format!(
        "http{}://{}{}",
        if cookie.secure { "s" } else { "" },
        cookie.domain,
        cookie.path
    )
}
