//! Run model - outcomes, stop reasons and the per-run summary.

use serde::{Deserialize, Serialize};
use crate::budget::Budget;
use crate::id::RunId;
use crate::Time;

/// What started a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunTrigger {
    /// Autonomous periodic trigger
    Scheduled,
    /// Administrative run the caller waits on
    Manual,
    /// Administrative run detached into the background
    Background,
}

impl std::fmt::Display for RunTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunTrigger::Scheduled => write!(f, "scheduled"),
            RunTrigger::Manual => write!(f, "manual"),
            RunTrigger::Background => write!(f, "background"),
        }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every task in the rotated list was scanned
    Completed,
    /// The generation-count budget was reached
    MaxGenerations,
    /// The wall-clock budget was used up
    ///
    /// Checked before each task; elapsed time equal to the budget already
    /// stops the run, so a zero budget scans nothing. The last task may
    /// overrun the budget by its own duration.
    MaxWalltime,
    /// The shared secret precondition failed; nothing was scanned
    Misconfigured,
}

impl StopReason {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Completed => "completed",
            StopReason::MaxGenerations => "max_generations",
            StopReason::MaxWalltime => "max_walltime",
            StopReason::Misconfigured => "misconfigured",
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of processing one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Stored content was fresh; nothing was called
    Skipped,
    /// New content was generated and stored
    Success,
    /// Generation failed; the reason is logged with the cache key
    Error(String),
}

impl TaskOutcome {
    /// True for `Skipped`.
    pub fn is_skipped(&self) -> bool {
        matches!(self, TaskOutcome::Skipped)
    }

    /// True for `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }

    /// Error reason, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            TaskOutcome::Error(reason) => Some(reason),
            _ => None,
        }
    }

    /// Short name for logs and API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskOutcome::Skipped => "skipped",
            TaskOutcome::Success => "success",
            TaskOutcome::Error(_) => "error",
        }
    }
}

/// Statistics for one run, persisted for observability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Run identifier
    pub run_id: RunId,
    /// What started the run
    pub trigger: RunTrigger,
    /// When the run started
    pub started_at: Time,
    /// When the run stopped
    pub ended_at: Time,
    /// Elapsed wall-clock time
    pub duration_ms: u64,
    /// Cursor read at run start
    pub cursor_start: u64,
    /// Cursor written at run end
    pub cursor_end: u64,
    /// Tasks handed to the executor, skipped or not
    pub scanned_tasks: u64,
    /// Size of the task universe this run
    pub total_tasks: u64,
    /// Budgets in effect
    pub budget: Budget,
    /// Generations that were stored
    pub success_count: u64,
    /// Tasks skipped as fresh
    pub skipped_count: u64,
    /// Generations that failed
    pub error_count: u64,
    /// Non-skipped tasks (success + error)
    pub attempted_generations: u64,
    /// Why the run stopped
    pub stop_reason: StopReason,
    /// Cache keys whose generation failed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_keys: Vec<String>,
}

impl RunSummary {
    /// Start a summary with zeroed counters.
    pub fn begin(
        run_id: RunId,
        trigger: RunTrigger,
        budget: Budget,
        started_at: Time,
        cursor_start: u64,
        total_tasks: u64,
    ) -> Self {
        Self {
            run_id,
            trigger,
            started_at,
            ended_at: started_at,
            duration_ms: 0,
            cursor_start,
            cursor_end: cursor_start,
            scanned_tasks: 0,
            total_tasks,
            budget,
            success_count: 0,
            skipped_count: 0,
            error_count: 0,
            attempted_generations: 0,
            stop_reason: StopReason::Completed,
            failed_keys: Vec::new(),
        }
    }

    /// Count one scanned task.
    pub fn tally(&mut self, cache_key: &str, outcome: &TaskOutcome) {
        self.scanned_tasks += 1;
        match outcome {
            TaskOutcome::Skipped => self.skipped_count += 1,
            TaskOutcome::Success => {
                self.attempted_generations += 1;
                self.success_count += 1;
            }
            TaskOutcome::Error(_) => {
                self.attempted_generations += 1;
                self.error_count += 1;
                self.failed_keys.push(cache_key.to_string());
            }
        }
    }

    /// Stamp the stop reason and end time.
    pub fn finish(&mut self, stop_reason: StopReason, ended_at: Time) {
        self.stop_reason = stop_reason;
        self.ended_at = ended_at;
        self.duration_ms = u64::try_from((ended_at - self.started_at).num_milliseconds()).unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        RunSummary::begin(
            RunId::new(),
            RunTrigger::Scheduled,
            Budget::default(),
            chrono::Utc::now(),
            3,
            9,
        )
    }

    #[test]
    fn test_tally_counts_only_non_skipped_as_attempts() {
        let mut s = summary();
        s.tally("industry:a", &TaskOutcome::Skipped);
        s.tally("industry:b", &TaskOutcome::Success);
        s.tally("industry:c", &TaskOutcome::Error("boom".to_string()));

        assert_eq!(s.scanned_tasks, 3);
        assert_eq!(s.skipped_count, 1);
        assert_eq!(s.success_count, 1);
        assert_eq!(s.error_count, 1);
        assert_eq!(s.attempted_generations, 2);
        assert_eq!(s.failed_keys, vec!["industry:c".to_string()]);
    }

    #[test]
    fn test_finish_sets_duration() {
        let mut s = summary();
        let end = s.started_at + chrono::Duration::milliseconds(1500);
        s.finish(StopReason::MaxWalltime, end);
        assert_eq!(s.duration_ms, 1500);
        assert_eq!(s.stop_reason, StopReason::MaxWalltime);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(summary()).unwrap();
        assert_eq!(json["stopReason"], "completed");
        assert_eq!(json["trigger"], "scheduled");
        assert_eq!(json["budget"]["maxWallTimeMs"], 25_000);
        assert!(json.get("failedKeys").is_none());
    }

    #[test]
    fn test_outcome_wire_format() {
        let json = serde_json::to_value(TaskOutcome::Error("bad".to_string())).unwrap();
        assert_eq!(json["outcome"], "error");
        assert_eq!(json["reason"], "bad");
        assert_eq!(StopReason::MaxGenerations.as_str(), "max_generations");
    }
}
