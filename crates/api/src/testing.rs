//! Fakes shared by the api tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use async_trait::async_trait;
use refresher_core::{Budget, Catalog, ContentPayload, NewsArticle, Task};
use refresher_execution::{EngineConfig, RefreshScheduler};
use refresher_knowledge::ContentGenerator;
use refresher_storage::MemoryKvStore;
use std::time::Duration;

use crate::service::RefreshService;

pub const SECRET: &str = "test-admin-secret-0123456789";

pub struct FakeGenerator {
    calls: AtomicUsize,
    failure: Option<String>,
}

impl FakeGenerator {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failure: None,
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failure: Some(reason.to_string()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for FakeGenerator {
    async fn generate(&self, task: &Task, _news: &[NewsArticle]) -> anyhow::Result<ContentPayload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.failure {
            anyhow::bail!("{}", reason);
        }
        Ok(ContentPayload {
            title: task.label(),
            description: format!("Hire {}", task.label()),
            ..Default::default()
        })
    }
}

/// Service over a memory store with no inter-task delay.
pub fn service(secret: &str, generator: Arc<FakeGenerator>) -> (RefreshService, Arc<FakeGenerator>) {
    let scheduler = RefreshScheduler::new(
        Arc::new(MemoryKvStore::new()),
        generator.clone(),
        Catalog::builtin(),
        secret,
    )
    .with_config(EngineConfig {
        inter_task_delay: Duration::ZERO,
        ..Default::default()
    });
    (RefreshService::new(scheduler, Budget::default(), 25_000), generator)
}
