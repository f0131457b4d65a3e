//! Pure retention policy for the cull engine.
//!
//! No I/O lives here: the matcher and the evaluator are deterministic
//! functions over values, which is what makes the cleanup decisions
//! testable in isolation from the scheduler and the platform.

pub mod evaluator;
pub mod matcher;

pub use evaluator::{decide, DeleteReason, KeepReason, Verdict};
pub use matcher::matches;
