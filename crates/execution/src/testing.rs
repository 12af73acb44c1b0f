//! In-crate fakes for the generator, news source and store.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use refresher_core::{ContentPayload, NewsArticle, Task};
use refresher_knowledge::{ContentGenerator, NewsSource};
use refresher_storage::{KvStore, MemoryKvStore, Result as StorageResult, StorageError};

/// A payload that passes validation.
pub fn payload(title: &str) -> ContentPayload {
    ContentPayload {
        title: title.to_string(),
        description: format!("About {}", title),
        ..Default::default()
    }
}

#[derive(Default)]
struct GeneratorState {
    script: VecDeque<Result<ContentPayload, String>>,
    calls: Vec<String>,
    last_news_len: usize,
}

/// Generator replaying scripted replies, then succeeding with the cache key
/// as title.
pub struct ScriptedGenerator {
    state: Mutex<GeneratorState>,
    latency: Duration,
}

impl ScriptedGenerator {
    pub fn always_ok() -> Arc<Self> {
        Self::with_script(Vec::new())
    }

    pub fn with_script(script: Vec<Result<ContentPayload, String>>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(GeneratorState {
                script: script.into(),
                ..Default::default()
            }),
            latency: Duration::ZERO,
        })
    }

    /// Every call sleeps for `latency` on the tokio clock.
    pub fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::default(),
            latency,
        })
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn called_keys(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn last_news_len(&self) -> usize {
        self.state.lock().unwrap().last_news_len
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, task: &Task, news: &[NewsArticle]) -> anyhow::Result<ContentPayload> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(task.cache_key());
            state.last_news_len = news.len();
            state.script.pop_front()
        };
        match next {
            Some(Ok(payload)) => Ok(payload),
            Some(Err(reason)) => Err(anyhow::anyhow!(reason)),
            None => Ok(payload(&task.cache_key())),
        }
    }
}

/// News source returning a fixed number of articles per query.
pub struct StaticNews {
    count: usize,
    calls: AtomicUsize,
}

impl StaticNews {
    pub fn new(count: usize) -> Arc<Self> {
        Arc::new(Self {
            count,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NewsSource for StaticNews {
    async fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<NewsArticle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..self.count.min(limit))
            .map(|i| NewsArticle {
                title: format!("{} headline {}", query, i),
                ..Default::default()
            })
            .collect())
    }
}

/// Memory store whose reads or selected writes can be made to fail.
pub struct FlakyStore {
    inner: MemoryKvStore,
    fail_reads: AtomicBool,
    failing_prefixes: Mutex<Vec<String>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryKvStore::new(),
            fail_reads: AtomicBool::new(false),
            failing_prefixes: Mutex::default(),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Writes to keys starting with `prefix` fail from now on.
    pub fn fail_writes_matching(&self, prefix: &str) {
        self.failing_prefixes.lock().unwrap().push(prefix.to_string());
    }
}

#[async_trait]
impl KvStore for FlakyStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Other(format!("read of {} refused", key)));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> StorageResult<()> {
        let refused = self
            .failing_prefixes
            .lock()
            .unwrap()
            .iter()
            .any(|prefix| key.starts_with(prefix.as_str()));
        if refused {
            return Err(StorageError::Other(format!("write of {} refused", key)));
        }
        self.inner.put(key, value, ttl).await
    }
}
