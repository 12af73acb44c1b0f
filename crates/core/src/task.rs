//! Task model - one refreshable content unit.

use serde::{Deserialize, Serialize};
use crate::catalog::{Industry, Location};

/// Kind of content page a task regenerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// Single-industry page
    Industry,
    /// Single-location page
    Location,
    /// Industry × location combination page
    IndustryLocation,
}

impl TaskKind {
    /// Wire name, also the cache key prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Industry => "industry",
            TaskKind::Location => "location",
            TaskKind::IndustryLocation => "industry-location",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a task kind name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task kind: {0} (expected industry, location or industry-location)")]
pub struct TaskKindParseError(pub String);

impl std::str::FromStr for TaskKind {
    type Err = TaskKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "industry" => Ok(TaskKind::Industry),
            "location" => Ok(TaskKind::Location),
            "industry-location" | "industry_location" | "combo" => Ok(TaskKind::IndustryLocation),
            other => Err(TaskKindParseError(other.to_string())),
        }
    }
}

/// A refreshable content unit.
///
/// Tasks are value objects rebuilt from the catalogs on every run; their
/// identity is the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Task {
    /// Single-industry page
    Industry {
        /// The industry
        industry: Industry,
    },
    /// Single-location page
    Location {
        /// The location
        location: Location,
    },
    /// Industry × location combination page
    IndustryLocation {
        /// The industry
        industry: Industry,
        /// The location
        location: Location,
    },
}

impl Task {
    /// Industry page task.
    pub fn industry(industry: Industry) -> Self {
        Task::Industry { industry }
    }

    /// Location page task.
    pub fn location(location: Location) -> Self {
        Task::Location { location }
    }

    /// Combination page task.
    pub fn combo(industry: Industry, location: Location) -> Self {
        Task::IndustryLocation { industry, location }
    }

    /// Associated industry, if any. Only these tasks get news context.
    pub fn industry_ref(&self) -> Option<&Industry> {
        match self {
            Task::Industry { industry } | Task::IndustryLocation { industry, .. } => Some(industry),
            Task::Location { .. } => None,
        }
    }

    /// Deterministic key addressing this task's content in the store.
    pub fn cache_key(&self) -> String {
        match self {
            Task::Industry { industry } => format!("industry:{}", industry.slug),
            Task::Location { location } => format!("location:{}", location.city_slug),
            Task::IndustryLocation { industry, location } => {
                format!("industry-location:{}:{}", industry.slug, location.city_slug)
            }
        }
    }

    /// Short human-readable description, used in prompts and logs.
    pub fn label(&self) -> String {
        match self {
            Task::Industry { industry } => format!("{} services", industry.name),
            Task::Location { location } => format!("{}, {}", location.city, location.country),
            Task::IndustryLocation { industry, location } => format!(
                "{} services in {}, {}",
                industry.name, location.city, location.country
            ),
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.cache_key())
    }
}
