//! Key layout shared by every component that touches the store.

/// Rotation cursor into the task universe.
pub const CURSOR_KEY: &str = "refresh:cursor";

/// Most recent run summary.
pub const LAST_RUN_KEY: &str = "refresh:last_run";

/// Content record for a task cache key.
pub fn content_key(cache_key: &str) -> String {
    format!("content:{}", cache_key)
}

/// Summary of one specific run.
pub fn run_key(run_id: &str) -> String {
    format!("refresh:run:{}", run_id)
}

/// Cached news articles for an industry name.
pub fn news_key(industry_name: &str) -> String {
    format!("news:{}", industry_name.trim().to_lowercase())
}
