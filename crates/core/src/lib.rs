//! Refresher core data models.
//!
//! This crate defines the value types shared by the content refresh
//! scheduler: the task universe, stored content, news context, run
//! summaries, budgets and configuration.

#![warn(missing_docs)]

// Core identities
mod id;

// Catalogs and the task universe
mod catalog;
mod task;

// Stored content and generation context
mod content;
mod news;

// Runs
mod budget;
mod run;

// Ambient
mod clock;
mod config;
mod secret;

// Re-exports
pub use id::RunId;

pub use catalog::{Catalog, Industry, Location};
pub use task::{Task, TaskKind, TaskKindParseError};

pub use content::{Benefit, ContentPayload, ContentRecord, Faq, PayloadError};
pub use news::NewsArticle;

pub use budget::{Budget, BudgetOverrides};
pub use run::{RunSummary, RunTrigger, StopReason, TaskOutcome};

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    AppConfig, BudgetConfig, CatalogConfig, ComboAllocation, ConfigError, GeneratorConfig,
    NewsConfig, SchedulerConfig, ServerConfig, StorageBackend, StorageConfig,
    DEFAULT_CONFIG_FILE,
};
pub use secret::{check_shared_secret, SecretError, MIN_SECRET_LEN};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
