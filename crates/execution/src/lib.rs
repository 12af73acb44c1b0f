//! Execution layer - task universe, rotation, freshness and the budgeted
//! refresh loop.

#![warn(missing_docs)]

pub mod universe;
pub mod cursor;
pub mod freshness;
pub mod executor;
pub mod summary;
pub mod engine;

#[cfg(test)]
mod testing;

pub use universe::build_universe;
pub use cursor::{rotate, CursorStore};
pub use freshness::is_fresh;
pub use executor::{GenerationError, GenerationExecutor};
pub use summary::{next_cursor, RunSummaryRecorder};
pub use engine::{EngineConfig, RefreshScheduler, RunRequest};
