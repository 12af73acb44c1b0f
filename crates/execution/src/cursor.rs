//! Rotation cursor persistence.

use std::sync::Arc;
use refresher_storage::keys::CURSOR_KEY;
use refresher_storage::KvStore;
use tracing::{debug, warn};

/// Persists the rotation offset into the task universe.
///
/// Both operations are best-effort: a lost read or write only means some
/// tasks get rescanned sooner than necessary.
#[derive(Clone)]
pub struct CursorStore {
    store: Arc<dyn KvStore>,
}

impl CursorStore {
    /// Create a cursor store over `store`.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Last persisted cursor, or 0 when absent or unreadable.
    pub async fn read(&self) -> u64 {
        match self.store.get(CURSOR_KEY).await {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("Ignoring corrupt cursor value {:?}", raw);
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                warn!("Failed to read cursor: {}", e);
                0
            }
        }
    }

    /// Persist `cursor`. Failures are logged and swallowed.
    pub async fn write(&self, cursor: u64) {
        match self.store.put(CURSOR_KEY, &cursor.to_string(), None).await {
            Ok(()) => debug!("Cursor advanced to {}", cursor),
            Err(e) => warn!("Failed to write cursor {}: {}", cursor, e),
        }
    }
}

/// Scan order for a run starting at `cursor`: `tasks[c..] ++ tasks[..c]`.
pub fn rotate<T>(mut tasks: Vec<T>, cursor: u64) -> Vec<T> {
    if tasks.is_empty() {
        return tasks;
    }
    let offset = (cursor % tasks.len() as u64) as usize;
    tasks.rotate_left(offset);
    tasks
}
