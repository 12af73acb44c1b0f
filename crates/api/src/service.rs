//! Refresh service - the entry points behind the CLI, the admin API and the
//! periodic trigger.

use std::sync::Arc;
use std::time::Duration;
use refresher_core::{
    AppConfig, Budget, BudgetOverrides, Industry, Location, RunId, RunSummary, RunTrigger, StorageBackend,
    StorageConfig, Task, TaskKind, TaskOutcome,
};
use refresher_execution::{EngineConfig, RefreshScheduler, RunRequest};
use refresher_knowledge::{HttpContentGenerator, NewsSource, SerperNewsSource};
use refresher_storage::{JsonKvStore, KvStore, MemoryKvStore};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{ApiError, Result};

/// One explicit task to regenerate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// `industry`, `location` or `industry-location`
    pub kind: String,
    /// Industry slug for industry and combination tasks
    #[serde(default)]
    pub industry_slug: Option<String>,
    /// City slug for location and combination tasks
    #[serde(default)]
    pub city_slug: Option<String>,
    /// Ignore freshness; defaults to true
    #[serde(default = "default_force")]
    pub force: bool,
}

fn default_force() -> bool {
    true
}

/// Result of a single-task generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// True when new content was stored
    pub success: bool,
    /// Cache key of the task
    pub cache_key: String,
    /// `success`, `skipped` or `error`
    pub outcome: String,
    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Cursor position and the most recent run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Persisted cursor
    pub cursor: u64,
    /// Current task universe size
    pub total_tasks: u64,
    /// Last persisted run summary
    pub last_run: Option<RunSummary>,
}

/// Acknowledgement of a detached run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAccepted {
    /// Always true
    pub accepted: bool,
    /// Id under which the summary will be persisted
    pub run_id: RunId,
}

/// Open the configured key-value store.
pub async fn open_store(config: &StorageConfig) -> refresher_storage::Result<Arc<dyn KvStore>> {
    Ok(match config.backend {
        StorageBackend::Json => Arc::new(JsonKvStore::new(&config.data_dir).await?),
        StorageBackend::Memory => Arc::new(MemoryKvStore::new()),
    })
}

/// Runs and single-task generation over one scheduler.
#[derive(Clone)]
pub struct RefreshService {
    scheduler: RefreshScheduler,
    default_budget: Budget,
    sync_walltime_cap_ms: u64,
}

impl RefreshService {
    /// Create a service.
    pub fn new(scheduler: RefreshScheduler, default_budget: Budget, sync_walltime_cap_ms: u64) -> Self {
        Self {
            scheduler,
            default_budget,
            sync_walltime_cap_ms,
        }
    }

    /// Wire the store, HTTP clients and scheduler from configuration.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store = open_store(&config.storage).await?;

        if config.generator.api_key.trim().is_empty() {
            warn!("No generator API key configured; generation calls will fail");
        }
        let generator = Arc::new(HttpContentGenerator::new(&config.generator)?);

        let news: Option<Arc<dyn NewsSource>> = if config.news.is_active() {
            Some(Arc::new(SerperNewsSource::new(&config.news)?))
        } else {
            info!("News context disabled");
            None
        };

        let scheduler = RefreshScheduler::new(
            store,
            generator,
            config.catalog(),
            config.shared_secret.clone(),
        )
        .with_config(EngineConfig::from(&config.scheduler))
        .with_news(news, Duration::from_secs(config.news.ttl_secs), config.news.max_articles);

        Ok(Self::new(
            scheduler,
            config.default_budget(),
            config.scheduler.sync_walltime_cap_ms,
        ))
    }

    /// The underlying scheduler.
    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    /// Default budgets with `overrides` applied.
    pub fn budget(&self, overrides: &BudgetOverrides) -> Budget {
        overrides.apply(self.default_budget)
    }

    /// Full run with default budgets, as the periodic trigger does it.
    pub async fn run_scheduled(&self) -> RunSummary {
        self.scheduler
            .run(RunRequest::new(RunTrigger::Scheduled, self.default_budget))
            .await
    }

    /// Run with overrides and no deadline cap.
    pub async fn run(&self, trigger: RunTrigger, overrides: &BudgetOverrides) -> RunSummary {
        self.scheduler
            .run(RunRequest::new(trigger, self.budget(overrides)))
            .await
    }

    /// Run a caller waits on; the wall-time budget is capped.
    pub async fn run_sync(&self, overrides: &BudgetOverrides) -> RunSummary {
        let budget = self.budget(overrides).capped_walltime(self.sync_walltime_cap_ms);
        self.scheduler
            .run(RunRequest::new(RunTrigger::Manual, budget))
            .await
    }

    /// Detach a run into the background and return its id immediately.
    ///
    /// Results are only visible through the persisted run summary.
    pub fn run_background(&self, overrides: &BudgetOverrides) -> RunId {
        let request = RunRequest::new(RunTrigger::Background, self.budget(overrides));
        let run_id = request.run_id;
        let scheduler = self.scheduler.clone();

        tokio::spawn(async move {
            let summary = scheduler.run(request).await;
            if summary.error_count > 0 {
                error!(
                    "Background run {} finished with {} failed generations",
                    summary.run_id, summary.error_count
                );
            }
        });

        info!("Background run {} submitted", run_id);
        run_id
    }

    /// Resolve a task descriptor against the active catalog.
    pub fn resolve_task(&self, request: &GenerateRequest) -> Result<Task> {
        let kind: TaskKind = request
            .kind
            .parse()
            .map_err(|e: refresher_core::TaskKindParseError| ApiError::BadRequest(e.to_string()))?;
        let catalog = self.scheduler.catalog();

        let industry = || -> Result<Industry> {
            let slug = request
                .industry_slug
                .as_deref()
                .ok_or_else(|| ApiError::BadRequest(format!("industrySlug is required for {}", kind)))?;
            catalog
                .industry(slug)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(format!("unknown industry: {}", slug)))
        };
        let location = || -> Result<Location> {
            let slug = request
                .city_slug
                .as_deref()
                .ok_or_else(|| ApiError::BadRequest(format!("citySlug is required for {}", kind)))?;
            catalog
                .location(slug)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(format!("unknown city: {}", slug)))
        };

        Ok(match kind {
            TaskKind::Industry => Task::industry(industry()?),
            TaskKind::Location => Task::location(location()?),
            TaskKind::IndustryLocation => Task::combo(industry()?, location()?),
        })
    }

    /// Generate one task now, outside any run.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let task = self.resolve_task(request)?;
        let max_age_days = if request.force {
            0
        } else {
            self.default_budget.max_age_days
        };

        let outcome = self.scheduler.generate_one(&task, max_age_days).await;
        Ok(GenerateResponse {
            success: outcome.is_success(),
            cache_key: task.cache_key(),
            outcome: outcome.as_str().to_string(),
            error: match outcome {
                TaskOutcome::Error(reason) => Some(reason),
                _ => None,
            },
        })
    }

    /// Current cursor and the last persisted run.
    pub async fn status(&self) -> StatusResponse {
        StatusResponse {
            cursor: self.scheduler.cursor().await,
            total_tasks: self.scheduler.tasks().len() as u64,
            last_run: self.scheduler.last_run().await,
        }
    }
}
