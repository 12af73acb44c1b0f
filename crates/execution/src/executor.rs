//! Skip / generate / validate / store for a single task.

use std::sync::Arc;
use refresher_core::{Clock, ContentRecord, PayloadError, Task, TaskOutcome};
use refresher_knowledge::{ContentGenerator, NewsContextCache};
use refresher_storage::keys::content_key;
use refresher_storage::{get_json, put_json, KvStore, StorageError};
use tracing::{debug, error, info, warn};

use crate::freshness::is_fresh;

/// Failures that turn a task into [`TaskOutcome::Error`].
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The generation service call failed
    #[error("generation failed: {0:#}")]
    Service(anyhow::Error),

    /// The reply lacked required fields
    #[error(transparent)]
    InvalidPayload(#[from] PayloadError),

    /// The record could not be stored
    #[error("failed to store content: {0}")]
    Store(#[from] StorageError),
}

/// Runs one task against the content store and the generator.
#[derive(Clone)]
pub struct GenerationExecutor {
    store: Arc<dyn KvStore>,
    generator: Arc<dyn ContentGenerator>,
    clock: Arc<dyn Clock>,
}

impl GenerationExecutor {
    /// Create an executor.
    pub fn new(
        store: Arc<dyn KvStore>,
        generator: Arc<dyn ContentGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            generator,
            clock,
        }
    }

    /// Replace the clock used for freshness and `generated_at`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Process `task`. Never fails; every error becomes an outcome.
    pub async fn execute(
        &self,
        task: &Task,
        max_age: chrono::Duration,
        news: &mut NewsContextCache,
    ) -> TaskOutcome {
        let cache_key = task.cache_key();
        let key = content_key(&cache_key);

        let existing = match get_json::<ContentRecord>(self.store.as_ref(), &key).await {
            Ok(record) => record,
            Err(e) => {
                warn!("Treating unreadable content for {} as absent: {}", cache_key, e);
                None
            }
        };

        if is_fresh(existing.as_ref(), max_age, self.clock.now()) {
            debug!("Skipping {}: content is fresh", cache_key);
            return TaskOutcome::Skipped;
        }

        match self.generate(task, &key, news).await {
            Ok(()) => {
                info!("Generated {}", cache_key);
                TaskOutcome::Success
            }
            Err(e) => {
                error!(cache_key = %cache_key, "Generation failed: {}", e);
                TaskOutcome::Error(e.to_string())
            }
        }
    }

    async fn generate(
        &self,
        task: &Task,
        key: &str,
        news: &mut NewsContextCache,
    ) -> Result<(), GenerationError> {
        let articles = match task.industry_ref() {
            Some(industry) => news.get(&industry.name).await,
            None => Vec::new(),
        };

        let payload = self
            .generator
            .generate(task, &articles)
            .await
            .map_err(GenerationError::Service)?;
        payload.validate()?;

        let record = ContentRecord::new(payload, self.clock.now());
        put_json(self.store.as_ref(), key, &record, None).await?;
        Ok(())
    }
}
