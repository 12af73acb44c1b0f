//! Run-scoped news context cache.
//!
//! Lookups go through three tiers: a map owned by the current run, the
//! persistent store (TTL-bounded), and finally the live news source. A live
//! fetch fills both upper tiers. Failures anywhere degrade to an empty list;
//! news is optional context and never blocks generation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use refresher_core::NewsArticle;
use refresher_storage::keys::news_key;
use refresher_storage::{get_json, put_json, KvStore};
use tracing::{debug, warn};

use crate::news::NewsSource;

/// News lookups for one run.
///
/// Build a new cache at the start of every run and drop it at the end.
pub struct NewsContextCache {
    run_cache: HashMap<String, Vec<NewsArticle>>,
    store: Arc<dyn KvStore>,
    source: Option<Arc<dyn NewsSource>>,
    ttl: Duration,
    limit: usize,
}

impl NewsContextCache {
    /// Create an empty run cache.
    ///
    /// With no `source`, only previously persisted articles are returned.
    pub fn new(
        store: Arc<dyn KvStore>,
        source: Option<Arc<dyn NewsSource>>,
        ttl: Duration,
        limit: usize,
    ) -> Self {
        Self {
            run_cache: HashMap::new(),
            store,
            source,
            ttl,
            limit,
        }
    }

    /// Industries already resolved during this run.
    pub fn len(&self) -> usize {
        self.run_cache.len()
    }

    /// True before the first successful lookup.
    pub fn is_empty(&self) -> bool {
        self.run_cache.is_empty()
    }

    /// Recent articles for an industry. Never fails.
    pub async fn get(&mut self, industry_name: &str) -> Vec<NewsArticle> {
        let key = news_key(industry_name);

        if let Some(articles) = self.run_cache.get(&key) {
            return articles.clone();
        }

        match get_json::<Vec<NewsArticle>>(self.store.as_ref(), &key).await {
            Ok(Some(articles)) => {
                debug!("News for {} served from store", industry_name);
                self.run_cache.insert(key, articles.clone());
                return articles;
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable news cache entry {}: {}", key, e),
        }

        let Some(source) = &self.source else {
            return Vec::new();
        };

        match source.search(industry_name, self.limit).await {
            Ok(mut articles) => {
                articles.truncate(self.limit);
                debug!("Fetched {} news articles for {}", articles.len(), industry_name);
                if let Err(e) = put_json(self.store.as_ref(), &key, &articles, Some(self.ttl)).await {
                    warn!("Failed to persist news cache {}: {}", key, e);
                }
                self.run_cache.insert(key, articles.clone());
                articles
            }
            Err(e) => {
                warn!("News fetch for {} failed: {:#}", industry_name, e);
                Vec::new()
            }
        }
    }
}
