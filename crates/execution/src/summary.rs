//! Run summary persistence and cursor advancement.

use std::sync::Arc;
use std::time::Duration;
use refresher_core::RunSummary;
use refresher_storage::keys::{run_key, LAST_RUN_KEY};
use refresher_storage::{get_json, put_json, KvStore};
use tracing::warn;

use crate::cursor::CursorStore;

/// Writes the summary of a finished run and moves the cursor on.
#[derive(Clone)]
pub struct RunSummaryRecorder {
    store: Arc<dyn KvStore>,
    cursor: CursorStore,
    ttl: Duration,
}

impl RunSummaryRecorder {
    /// Create a recorder keeping summaries for `ttl`.
    pub fn new(store: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self {
            cursor: CursorStore::new(store.clone()),
            store,
            ttl,
        }
    }

    /// Advance the cursor by the scanned count and persist the summary.
    ///
    /// Sets `summary.cursor_end`. Storage failures are logged only.
    pub async fn record(&self, summary: &mut RunSummary) {
        summary.cursor_end = next_cursor(summary.cursor_start, summary.scanned_tasks, summary.total_tasks);
        self.cursor.write(summary.cursor_end).await;

        let run_id = summary.run_id.to_string();
        for key in [LAST_RUN_KEY.to_string(), run_key(&run_id)] {
            if let Err(e) = put_json(self.store.as_ref(), &key, &*summary, Some(self.ttl)).await {
                warn!("Failed to persist run summary {}: {}", key, e);
            }
        }
    }

    /// Most recent persisted summary, if still retained.
    pub async fn last_run(&self) -> Option<RunSummary> {
        self.load(LAST_RUN_KEY).await
    }

    /// Summary of a specific run, if still retained.
    pub async fn run(&self, run_id: &str) -> Option<RunSummary> {
        self.load(&run_key(run_id)).await
    }

    async fn load(&self, key: &str) -> Option<RunSummary> {
        get_json(self.store.as_ref(), key).await.unwrap_or_else(|e| {
            warn!("Failed to read run summary {}: {}", key, e);
            None
        })
    }
}

/// `(start + scanned) mod total`, or 0 for an empty universe.
pub fn next_cursor(start: u64, scanned: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (start % total + scanned % total) % total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FlakyStore;
    use refresher_core::{Budget, RunId, RunTrigger, StopReason};
    use refresher_storage::keys::CURSOR_KEY;
    use refresher_storage::MemoryKvStore;

    fn summary(cursor_start: u64, scanned: u64, total: u64) -> RunSummary {
        let now = chrono::Utc::now();
        let mut s = RunSummary::begin(RunId::new(), RunTrigger::Manual, Budget::default(), now, cursor_start, total);
        s.scanned_tasks = scanned;
        s.finish(StopReason::Completed, now);
        s
    }

    #[test]
    fn test_next_cursor() {
        assert_eq!(next_cursor(0, 5, 9), 5);
        assert_eq!(next_cursor(5, 9, 9), 5);
        assert_eq!(next_cursor(7, 4, 9), 2);
        assert_eq!(next_cursor(3, 0, 0), 0);
        assert_eq!(next_cursor(u64::MAX, u64::MAX, 7), ((u64::MAX % 7) * 2) % 7);
    }

    #[tokio::test]
    async fn test_record_persists_summary_and_cursor() {
        let store = Arc::new(MemoryKvStore::new());
        let recorder = RunSummaryRecorder::new(store.clone(), Duration::from_secs(60));
        let mut s = summary(6, 5, 9);

        recorder.record(&mut s).await;

        assert_eq!(s.cursor_end, 2);
        assert_eq!(store.get(CURSOR_KEY).await.unwrap().as_deref(), Some("2"));
        assert_eq!(recorder.last_run().await, Some(s.clone()));
        assert_eq!(recorder.run(&s.run_id.to_string()).await, Some(s));
    }

    #[tokio::test]
    async fn test_summary_failure_still_advances_cursor() {
        let store = Arc::new(FlakyStore::new());
        store.fail_writes_matching("refresh:last_run");
        store.fail_writes_matching("refresh:run:");
        let recorder = RunSummaryRecorder::new(store.clone(), Duration::from_secs(60));
        let mut s = summary(0, 5, 9);

        recorder.record(&mut s).await;

        assert_eq!(store.get(CURSOR_KEY).await.unwrap().as_deref(), Some("5"));
        assert!(recorder.last_run().await.is_none());
    }
}
