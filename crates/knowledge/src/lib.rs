//! Generation context and external content services.
//!
//! Clients for the text-generation service and the news source, prompt
//! construction, and the per-run news context cache.

#![warn(missing_docs)]

pub mod prompt;
pub mod generator;
pub mod news;
pub mod news_cache;

pub use generator::{parse_payload, strip_code_fence, ContentGenerator, HttpContentGenerator};
pub use news::{NewsSource, SerperNewsSource};
pub use news_cache::NewsContextCache;
