//! Cull Retention Engine
//!
//! Coordinates cookie cleanup: triggers funnel into a single-consumer
//! scheduler, sweeps classify every cookie through the pure policy
//! evaluator, deletions go out through the platform boundary, and
//! everything that happened lands in persisted storage.
//!
//! # Architecture
//!
//! - **Single flight**: one consumer task owns the trigger queue, so at
//!   most one sweep runs at a time; bursts of triggers coalesce into one
//!   sweep
//! - **Gating**: each trigger kind is checked against the stored settings
//!   before it may start a sweep; a manual trigger always sweeps
//! - **Containment**: a removal failure is logged per cookie and never
//!   aborts the rest of the sweep
//!
//! # Example
//!
//! ```ignore
//! use cull_engine::{Api, Engine, Trigger};
//! use cull_core::EngineConfig;
//! use cull_platform::MemoryCookieStore;
//! use cull_store::{migrations, Storage};
//! use std::sync::Arc;
//!
//! let storage = Storage::open("cull.db").await?;
//! migrations::run_migrations(storage.pool()).await?;
//! let platform = Arc::new(MemoryCookieStore::new());
//!
//! let config = EngineConfig::load_with_env()?;
//! let handle = Engine::spawn(storage.clone(), platform.clone(), &config);
//! handle.fire(Trigger::Startup)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod alarms;
pub mod api;
pub mod error;
pub mod scheduler;
pub mod sweeper;
pub mod triggers;

pub use api::{Api, BatchDeleteReport};
pub use error::{EngineError, Result};
pub use scheduler::{plan_batch, BatchPlan, Engine, EngineHandle};
pub use sweeper::{SweepReport, Sweeper};
pub use triggers::{Trigger, CACHE_ALARM, CLEANUP_ALARM};
