//! Cull Core - Foundation crate for the cull cookie cleanup engine.
//!
//! This crate provides the shared types, error handling and configuration
//! that all other cull crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based engine configuration with XDG paths
//! - [`types`] - Shared domain types (`Cookie`, `CookieId`, `Settings`, ...)
//!
//! # Example
//!
//! ```rust
//! use cull_core::{Cookie, CookieId, SameSite};
//!
//! let cookie = Cookie {
//!     domain: "example.com".to_string(),
//!     name: "session".to_string(),
//!     value: "abc".to_string(),
//!     path: "/".to_string(),
//!     expiration_date: None,
//!     secure: true,
//!     http_only: false,
//!     same_site: SameSite::Lax,
//! };
//! assert_eq!(CookieId::of(&cookie).as_str(), "example.com:session");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AlarmConfig, EngineConfig, LogConfig};
pub use error::{ConfigError, ConfigResult, CullError, Result};
pub use types::{
    Cookie, CookieId, Expression, ExpressionOption, ListSnapshot, ListType, LogAction, LogEntry,
    SameSite, Settings, MAX_CLEANING_DELAY_SECS,
};
