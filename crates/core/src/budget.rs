//! Run budgets and per-invocation overrides.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Budgets bounding one refresh run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// Max non-skipped generations per run
    pub max_generations: u32,
    /// Wall-clock budget in milliseconds, checked between tasks
    #[serde(rename = "maxWallTimeMs")]
    pub max_walltime_ms: u64,
    /// Content younger than this many days is skipped
    pub max_age_days: u32,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_generations: 5,
            max_walltime_ms: 25_000,
            max_age_days: 30,
        }
    }
}

impl Budget {
    /// Create a budget with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the generation-count budget.
    pub fn with_max_generations(mut self, max: u32) -> Self {
        self.max_generations = max;
        self
    }

    /// Set the wall-clock budget.
    pub fn with_walltime(mut self, walltime: Duration) -> Self {
        self.max_walltime_ms = u64::try_from(walltime.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the freshness threshold.
    pub fn with_max_age_days(mut self, days: u32) -> Self {
        self.max_age_days = days;
        self
    }

    /// Wall-clock budget as a `Duration`.
    pub fn walltime(&self) -> Duration {
        Duration::from_millis(self.max_walltime_ms)
    }

    /// Freshness threshold as a signed duration.
    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.max_age_days))
    }

    /// Cap the wall-clock budget, used for runs a caller waits on.
    pub fn capped_walltime(mut self, cap_ms: u64) -> Self {
        self.max_walltime_ms = self.max_walltime_ms.min(cap_ms);
        self
    }
}

/// Optional per-invocation replacements for each budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetOverrides {
    /// Replaces `max_generations`
    pub max_generations: Option<u32>,
    /// Replaces `max_walltime_ms`
    #[serde(rename = "maxWallTimeMs")]
    pub max_walltime_ms: Option<u64>,
    /// Replaces `max_age_days`
    pub max_age_days: Option<u32>,
}

impl BudgetOverrides {
    /// Apply the overrides on top of `base`; each budget is independent.
    pub fn apply(&self, base: Budget) -> Budget {
        Budget {
            max_generations: self.max_generations.unwrap_or(base.max_generations),
            max_walltime_ms: self.max_walltime_ms.unwrap_or(base.max_walltime_ms),
            max_age_days: self.max_age_days.unwrap_or(base.max_age_days),
        }
    }

    /// True when nothing is overridden.
    pub fn is_empty(&self) -> bool {
        self.max_generations.is_none()
            && self.max_walltime_ms.is_none()
            && self.max_age_days.is_none()
    }
}
