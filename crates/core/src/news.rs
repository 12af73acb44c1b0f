//! News article model used as optional generation context.

use serde::{Deserialize, Serialize};

/// A recent article about an industry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsArticle {
    /// Headline
    pub title: String,

    /// Article URL
    pub link: String,

    /// Short excerpt
    pub snippet: String,

    /// Publisher name
    pub source: String,

    /// Publication date as reported by the source (free-form)
    pub pub_date: String,
}
