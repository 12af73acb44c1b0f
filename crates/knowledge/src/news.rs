//! News source client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use refresher_core::{NewsArticle, NewsConfig};
use reqwest::{Client, ClientBuilder};
use serde_json::json;

/// Searches recent news by free-text query.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Return at most `limit` articles, best match first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<NewsArticle>>;
}

/// Serper news search client.
#[derive(Clone)]
pub struct SerperNewsSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SerperNewsSource {
    /// Create a client from configuration.
    pub fn new(config: &NewsConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build news HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl NewsSource for SerperNewsSource {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<NewsArticle>> {
        let response = self
            .client
            .post(format!("{}/news", self.base_url))
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query, "num": limit }))
            .send()
            .await
            .context("Failed to call news API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("News API error (status {}): {}", status, error_text);
        }

        #[derive(serde::Deserialize)]
        struct Response {
            #[serde(default)]
            news: Vec<Item>,
        }

        #[derive(Default, serde::Deserialize)]
        #[serde(default)]
        struct Item {
            title: String,
            link: String,
            snippet: String,
            source: String,
            date: String,
        }

        let response_data: Response = response
            .json()
            .await
            .context("Failed to parse news API response")?;

        Ok(response_data
            .news
            .into_iter()
            .take(limit)
            .map(|item| NewsArticle {
                title: item.title,
                link: item.link,
                snippet: item.snippet,
                source: item.source,
                pub_date: item.date,
            })
            .collect())
    }
}
