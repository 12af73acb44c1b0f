//! Application configuration.
//!
//! Loaded from an optional TOML file where every field has a default, then
//! overridden from `REFRESHER_*` environment variables. The shared secret is
//! not validated on load; runs check it and finish as `misconfigured`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::budget::Budget;
use crate::catalog::{Catalog, Industry, Location};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "refresher.toml";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Shared secret gating runs and admin endpoints
    pub shared_secret: String,
    /// Default run budgets
    pub budgets: BudgetConfig,
    /// Scheduler tuning
    pub scheduler: SchedulerConfig,
    /// Key-value store backend
    pub storage: StorageConfig,
    /// Generation service client
    pub generator: GeneratorConfig,
    /// News source client
    pub news: NewsConfig,
    /// Admin HTTP server
    pub server: ServerConfig,
    /// Catalog overrides; the builtin catalog is used when absent
    pub catalog: Option<CatalogConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            shared_secret: String::new(),
            budgets: BudgetConfig::default(),
            scheduler: SchedulerConfig::default(),
            storage: StorageConfig::default(),
            generator: GeneratorConfig::default(),
            news: NewsConfig::default(),
            server: ServerConfig::default(),
            catalog: None,
        }
    }
}

/// Default budgets for runs that do not override them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Max non-skipped generations per run
    pub max_generations: u32,
    /// Wall-clock budget in milliseconds
    pub max_walltime_ms: u64,
    /// Freshness threshold in days
    pub max_age_days: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        let budget = Budget::default();
        Self {
            max_generations: budget.max_generations,
            max_walltime_ms: budget.max_walltime_ms,
            max_age_days: budget.max_age_days,
        }
    }
}

impl BudgetConfig {
    /// Budget used when a run has no overrides.
    pub fn to_budget(&self) -> Budget {
        Budget {
            max_generations: self.max_generations,
            max_walltime_ms: self.max_walltime_ms,
            max_age_days: self.max_age_days,
        }
    }
}

/// How combination tasks are chosen once the combo limit applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComboAllocation {
    /// Nested industry × location loop cut off at the limit; matches the
    /// page inventory of existing deployments
    #[default]
    Sequential,
    /// Location-major order so every industry gets combos before any gets many
    RoundRobin,
}

/// Scheduler tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Pause after every success or error outcome
    pub inter_task_delay_ms: u64,
    /// Max industry × location tasks in the universe
    pub combo_limit: usize,
    /// Combo selection strategy
    pub combo_allocation: ComboAllocation,
    /// Period of the autonomous trigger
    pub interval_secs: u64,
    /// Wall-time cap for runs a caller waits on
    pub sync_walltime_cap_ms: u64,
    /// Retention of persisted run summaries
    pub run_summary_ttl_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            inter_task_delay_ms: 500,
            combo_limit: 50,
            combo_allocation: ComboAllocation::Sequential,
            interval_secs: 3600,
            sync_walltime_cap_ms: 25_000,
            run_summary_ttl_secs: 7 * 24 * 3600,
        }
    }
}

/// Storage backend choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One JSON file per key under `data_dir`
    #[default]
    Json,
    /// Process-local map, lost on exit
    Memory,
}

/// Key-value store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend
    pub backend: StorageBackend,
    /// Root directory for the JSON backend
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            data_dir: PathBuf::from(".refresher"),
        }
    }
}

/// Generation service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Bearer token
    pub api_key: String,
    /// HTTP timeout
    pub timeout_secs: u64,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: String::new(),
            timeout_secs: 120,
            temperature: 0.7,
        }
    }
}

/// News source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Disable to generate without news context
    pub enabled: bool,
    /// Base URL of the search API
    pub base_url: String,
    /// API key; news is skipped when empty
    pub api_key: String,
    /// Articles kept per industry
    pub max_articles: usize,
    /// Persistent cache TTL
    pub ttl_secs: u64,
    /// HTTP timeout
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://google.serper.dev".to_string(),
            api_key: String::new(),
            max_articles: 5,
            ttl_secs: 6 * 3600,
            timeout_secs: 15,
        }
    }
}

impl NewsConfig {
    /// True when news context can actually be fetched.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.api_key.trim().is_empty()
    }
}

/// Admin HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
        }
    }
}

/// Catalog overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Replaces the builtin industries when non-empty
    pub industries: Vec<Industry>,
    /// Replaces the builtin locations when non-empty
    pub locations: Vec<Location>,
}

impl AppConfig {
    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] when it
    /// exists, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `REFRESHER_*` overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("REFRESHER_SHARED_SECRET") {
            self.shared_secret = v;
        }
        if let Some(v) = lookup("REFRESHER_GENERATOR_API_KEY") {
            self.generator.api_key = v;
        }
        if let Some(v) = lookup("REFRESHER_GENERATOR_URL") {
            self.generator.base_url = v;
        }
        if let Some(v) = lookup("REFRESHER_GENERATOR_MODEL") {
            self.generator.model = v;
        }
        if let Some(v) = lookup("REFRESHER_NEWS_API_KEY") {
            self.news.api_key = v;
        }
        if let Some(v) = lookup("REFRESHER_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("REFRESHER_BIND") {
            self.server.bind = v;
        }
    }

    /// Reject values the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.news.max_articles == 0 {
            return Err(ConfigError::Invalid(
                "news.max_articles must be greater than zero".to_string(),
            ));
        }
        if let Some(catalog) = &self.catalog {
            let mut slugs: Vec<&str> = catalog.industries.iter().map(|i| i.slug.as_str()).collect();
            slugs.sort_unstable();
            if slugs.windows(2).any(|w| w[0] == w[1]) {
                return Err(ConfigError::Invalid("duplicate industry slug in catalog".to_string()));
            }
            let mut cities: Vec<&str> = catalog.locations.iter().map(|l| l.city_slug.as_str()).collect();
            cities.sort_unstable();
            if cities.windows(2).any(|w| w[0] == w[1]) {
                return Err(ConfigError::Invalid("duplicate city slug in catalog".to_string()));
            }
        }
        Ok(())
    }

    /// Catalog in effect: builtin lists, replaced per list by overrides.
    pub fn catalog(&self) -> Catalog {
        let builtin = Catalog::builtin();
        match &self.catalog {
            None => builtin,
            Some(overrides) => Catalog::new(
                if overrides.industries.is_empty() {
                    builtin.industries
                } else {
                    overrides.industries.clone()
                },
                if overrides.locations.is_empty() {
                    builtin.locations
                } else {
                    overrides.locations.clone()
                },
            ),
        }
    }

    /// Default budget for runs.
    pub fn default_budget(&self) -> Budget {
        self.budgets.to_budget()
    }
}
