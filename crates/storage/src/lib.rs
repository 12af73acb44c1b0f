//! Key-value storage abstraction and implementations for the refresher.
//!
//! The scheduler keeps all of its state (content records, the rotation
//! cursor, run summaries and cached news) in a string-keyed store with
//! optional per-entry TTL. No listing or transactions are assumed.

#![warn(missing_docs)]

pub mod trait_;
pub mod keys;
pub mod json_storage;
pub mod memory_storage;

pub use trait_::{get_json, put_json, KvStore, Result, StorageError};
pub use json_storage::JsonKvStore;
pub use memory_storage::MemoryKvStore;
