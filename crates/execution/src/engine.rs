//! The refresh run loop.
//!
//! ```text
//! check secret → build universe → rotate by cursor
//!   → for each task: budgets? → execute → tally → delay
//!   → record summary + advance cursor
//! ```

use std::sync::Arc;
use std::time::Duration;
use refresher_core::{
    check_shared_secret, Budget, Catalog, Clock, ComboAllocation, NewsConfig, RunId, RunSummary, RunTrigger,
    SchedulerConfig, StopReason, SystemClock, Task, TaskOutcome,
};
use refresher_knowledge::{ContentGenerator, NewsContextCache, NewsSource};
use refresher_storage::KvStore;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cursor::{rotate, CursorStore};
use crate::executor::GenerationExecutor;
use crate::summary::RunSummaryRecorder;
use crate::universe::build_universe;

/// Configuration for the refresh scheduler.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Pause after every non-skipped task
    pub inter_task_delay: Duration,
    /// Max combination tasks in the universe
    pub combo_limit: usize,
    /// Combination selection strategy
    pub combo_allocation: ComboAllocation,
    /// Retention of persisted run summaries
    pub summary_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&SchedulerConfig::default())
    }
}

impl From<&SchedulerConfig> for EngineConfig {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            inter_task_delay: Duration::from_millis(config.inter_task_delay_ms),
            combo_limit: config.combo_limit,
            combo_allocation: config.combo_allocation,
            summary_ttl: Duration::from_secs(config.run_summary_ttl_secs),
        }
    }
}

/// News settings for the per-run cache.
#[derive(Clone)]
struct NewsSettings {
    source: Option<Arc<dyn NewsSource>>,
    ttl: Duration,
    limit: usize,
}

/// Parameters of one run.
#[derive(Debug, Clone, Copy)]
pub struct RunRequest {
    /// Identifier reported in the summary
    pub run_id: RunId,
    /// What started the run
    pub trigger: RunTrigger,
    /// Budgets in effect
    pub budget: Budget,
}

impl RunRequest {
    /// New request with a fresh run id.
    pub fn new(trigger: RunTrigger, budget: Budget) -> Self {
        Self {
            run_id: RunId::new(),
            trigger,
            budget,
        }
    }
}

/// Budget-governed refresh scheduler.
///
/// Holds no per-run state, so one instance can serve overlapping runs.
#[derive(Clone)]
pub struct RefreshScheduler {
    store: Arc<dyn KvStore>,
    executor: GenerationExecutor,
    cursor: CursorStore,
    recorder: RunSummaryRecorder,
    catalog: Arc<Catalog>,
    shared_secret: String,
    news: NewsSettings,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl RefreshScheduler {
    /// Create a scheduler with default configuration and no news source.
    pub fn new(
        store: Arc<dyn KvStore>,
        generator: Arc<dyn ContentGenerator>,
        catalog: Catalog,
        shared_secret: impl Into<String>,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let config = EngineConfig::default();
        let news = NewsConfig::default();
        Self {
            executor: GenerationExecutor::new(store.clone(), generator, clock.clone()),
            cursor: CursorStore::new(store.clone()),
            recorder: RunSummaryRecorder::new(store.clone(), config.summary_ttl),
            store,
            catalog: Arc::new(catalog),
            shared_secret: shared_secret.into(),
            news: NewsSettings {
                source: None,
                ttl: Duration::from_secs(news.ttl_secs),
                limit: news.max_articles,
            },
            clock,
            config,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.recorder = RunSummaryRecorder::new(self.store.clone(), config.summary_ttl);
        self.config = config;
        self
    }

    /// Set the news source and its persistent cache settings.
    pub fn with_news(mut self, source: Option<Arc<dyn NewsSource>>, ttl: Duration, limit: usize) -> Self {
        self.news = NewsSettings { source, ttl, limit };
        self
    }

    /// Set the clock used for freshness and timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.executor = self.executor.with_clock(clock.clone());
        self.clock = clock;
        self
    }

    /// The catalog tasks are built from.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The current task universe, unrotated.
    pub fn tasks(&self) -> Vec<Task> {
        build_universe(&self.catalog, self.config.combo_limit, self.config.combo_allocation)
    }

    /// Persisted cursor.
    pub async fn cursor(&self) -> u64 {
        self.cursor.read().await
    }

    /// Most recent persisted run summary.
    pub async fn last_run(&self) -> Option<RunSummary> {
        self.recorder.last_run().await
    }

    /// Persisted summary of a specific run.
    pub async fn run_summary(&self, run_id: &RunId) -> Option<RunSummary> {
        self.recorder.run(&run_id.to_string()).await
    }

    fn news_cache(&self) -> NewsContextCache {
        NewsContextCache::new(
            self.store.clone(),
            self.news.source.clone(),
            self.news.ttl,
            self.news.limit,
        )
    }

    /// Run one refresh pass. Never fails; problems end up in the summary.
    pub async fn run(&self, request: RunRequest) -> RunSummary {
        let started = Instant::now();
        let budget = request.budget;
        let tasks = self.tasks();
        let total = tasks.len() as u64;
        let cursor_start = match total {
            0 => 0,
            n => self.cursor.read().await % n,
        };

        let mut summary = RunSummary::begin(
            request.run_id,
            request.trigger,
            budget,
            self.clock.now(),
            cursor_start,
            total,
        );

        info!(
            "Starting {} run {}: {} tasks from cursor {}, budget {} generations / {} ms / {} days",
            request.trigger,
            request.run_id,
            total,
            cursor_start,
            budget.max_generations,
            budget.max_walltime_ms,
            budget.max_age_days
        );

        if let Err(e) = check_shared_secret(&self.shared_secret) {
            warn!("Run {} aborted: {}", request.run_id, e);
            return self.finish(summary, StopReason::Misconfigured).await;
        }

        let walltime = budget.walltime();
        let max_age = budget.max_age();
        let max_generations = u64::from(budget.max_generations);
        let mut news = self.news_cache();
        let mut stop_reason = StopReason::Completed;

        for task in rotate(tasks, cursor_start) {
            // Reaching the budget counts as exhausting it.
            if started.elapsed() >= walltime {
                stop_reason = StopReason::MaxWalltime;
                break;
            }
            if summary.attempted_generations >= max_generations {
                stop_reason = StopReason::MaxGenerations;
                break;
            }

            let cache_key = task.cache_key();
            let outcome = self.executor.execute(&task, max_age, &mut news).await;
            debug!("{} -> {}", cache_key, outcome.as_str());
            summary.tally(&cache_key, &outcome);

            if !outcome.is_skipped() && !self.config.inter_task_delay.is_zero() {
                tokio::time::sleep(self.config.inter_task_delay).await;
            }
        }

        self.finish(summary, stop_reason).await
    }

    async fn finish(&self, mut summary: RunSummary, stop_reason: StopReason) -> RunSummary {
        summary.finish(stop_reason, self.clock.now());
        self.recorder.record(&mut summary).await;

        info!(
            "Run {} stopped ({}): scanned {}/{}, {} generated, {} skipped, {} failed, cursor {} -> {}",
            summary.run_id,
            summary.stop_reason,
            summary.scanned_tasks,
            summary.total_tasks,
            summary.success_count,
            summary.skipped_count,
            summary.error_count,
            summary.cursor_start,
            summary.cursor_end
        );
        summary
    }

    /// Generate one task now, outside any run.
    ///
    /// Content younger than `max_age_days` is kept; pass 0 to force.
    pub async fn generate_one(&self, task: &Task, max_age_days: u32) -> TaskOutcome {
        let mut news = self.news_cache();
        let max_age = chrono::Duration::days(i64::from(max_age_days));
        self.executor.execute(task, max_age, &mut news).await
    }
}
