//! Text-generation service client.
//!
//! Talks to an OpenAI-compatible chat completions endpoint and turns the
//! reply into a [`ContentPayload`]. Models often wrap JSON in a markdown
//! code fence; the fence is stripped before parsing.

use std::sync::OnceLock;
use anyhow::{Context, Result};
use async_trait::async_trait;
use refresher_core::{ContentPayload, GeneratorConfig, NewsArticle, Task};
use regex::Regex;
use reqwest::{Client, ClientBuilder};
use serde_json::json;
use tracing::debug;

use crate::prompt::{user_prompt, SYSTEM_PROMPT};

/// Produces page content for a task.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate content for `task`, optionally informed by `news`.
    ///
    /// The returned payload is parsed but not validated.
    async fn generate(&self, task: &Task, news: &[NewsArticle]) -> Result<ContentPayload>;
}

/// OpenAI-compatible chat completions client.
#[derive(Clone)]
pub struct HttpContentGenerator {
    /// HTTP client
    client: Client,

    /// API base URL, without trailing slash
    base_url: String,

    /// Model name
    model: String,

    /// Bearer token
    api_key: String,

    /// Sampling temperature
    temperature: f32,
}

impl HttpContentGenerator {
    /// Create a client from configuration.
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build generation HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
        })
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let payload = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to call generation API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Generation API error (status {}): {}",
                status,
                error_text
            );
        }

        #[derive(serde::Deserialize)]
        struct Response {
            choices: Vec<Choice>,
        }

        #[derive(serde::Deserialize)]
        struct Choice {
            message: Message,
        }

        #[derive(serde::Deserialize)]
        struct Message {
            #[serde(default)]
            content: Option<String>,
        }

        let response_data: Response = response
            .json()
            .await
            .context("Failed to parse generation API response")?;

        response_data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .context("Generation API returned no content")
    }
}

#[async_trait]
impl ContentGenerator for HttpContentGenerator {
    async fn generate(&self, task: &Task, news: &[NewsArticle]) -> Result<ContentPayload> {
        let user = user_prompt(task, news);
        debug!("Generating {} with {} news articles", task.cache_key(), news.len());

        let raw = self.complete(SYSTEM_PROMPT, &user).await?;
        parse_payload(&raw)
    }
}

fn whole_fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)\A```[A-Za-z0-9_-]*[ \t]*\r?\n(.*)\r?\n[ \t]*```\z")
            .unwrap_or_else(|_| unreachable!())
    })
}

fn block_fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?sm)^```[A-Za-z0-9_-]*[ \t]*\r?$\n(.*?)^[ \t]*```[ \t]*\r?$")
            .unwrap_or_else(|_| unreachable!())
    })
}

/// Remove a surrounding markdown code fence, if any.
///
/// Fences only count at line starts, so backticks inside JSON string values
/// are left alone. A reply that is entirely fenced keeps everything between
/// the outer fences. When prose surrounds a fenced block, the first block
/// wins. Text without a fence is returned trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let inner = whole_fence_regex()
        .captures(trimmed)
        .or_else(|| block_fence_regex().captures(trimmed))
        .and_then(|c| c.get(1));
    match inner {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Parse a generation reply into a payload.
///
/// Bare JSON is parsed as-is; otherwise a code fence is stripped first.
pub fn parse_payload(raw: &str) -> Result<ContentPayload> {
    let value: serde_json::Value = match serde_json::from_str(raw.trim()) {
        Ok(value) => value,
        Err(_) => serde_json::from_str(strip_code_fence(raw))
            .context("Generated content is not valid JSON")?,
    };
    if !value.is_object() {
        anyhow::bail!("Generated content is not a JSON object");
    }
    serde_json::from_value(value).context("Generated content has an unexpected shape")
}

#[cfg(test)]
mod tests {
    use super::*;
    use refresher_core::Industry;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: String) -> GeneratorConfig {
        GeneratorConfig {
            base_url,
            api_key: "test-key".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_strip_json_fence() {
        let raw = "```json\n{\"title\": \"a\"}\n```";
        assert_eq!(strip_code_fence(raw), "{\"title\": \"a\"}");
    }

    #[test]
    fn test_strip_bare_fence_and_prose() {
        let raw = "Here you go:\n```\n{\"title\": \"a\"}\n```\nEnjoy!";
        assert_eq!(strip_code_fence(raw), "{\"title\": \"a\"}");
    }

    #[test]
    fn test_unfenced_is_trimmed() {
        assert_eq!(strip_code_fence("  {\"a\":1}\n"), "{\"a\":1}");
    }

    #[test]
    fn test_parse_payload_rejects_non_objects() {
        assert!(parse_payload("[1, 2]").is_err());
        assert!(parse_payload("not json at all").is_err());
    }

    #[test]
    fn test_backticks_inside_values_are_not_fences() {
        let raw = r#"{"title": "Dev tools", "description": "Wrap code in ```rust``` blocks"}"#;
        assert_eq!(strip_code_fence(raw), raw);

        let payload = parse_payload(raw).unwrap();
        assert_eq!(payload.title, "Dev tools");
        assert_eq!(payload.description, "Wrap code in ```rust``` blocks");
    }

    #[test]
    fn test_fenced_payload_keeps_inner_backticks() {
        let raw = "```json\n{\"title\": \"T\", \"description\": \"Use ```sh``` here\"}\n```";
        let payload = parse_payload(raw).unwrap();
        assert_eq!(payload.description, "Use ```sh``` here");
    }

    #[test]
    fn test_prose_with_inner_backticks_uses_line_fences() {
        let raw = "Sure:\n```json\n{\"title\": \"T\", \"description\": \"a ``` b\"}\n```\nDone.";
        let payload = parse_payload(raw).unwrap();
        assert_eq!(payload.description, "a ``` b");
    }

    #[test]
    fn test_parse_payload_fenced() {
        let payload =
            parse_payload("```json\n{\"title\": \"T\", \"metaDescription\": \"D\"}\n```").unwrap();
        assert_eq!(payload.title, "T");
        assert_eq!(payload.description, "D");
    }

    #[tokio::test]
    async fn test_generate_calls_chat_completions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "```json\n{\"title\": \"HVAC\", \"description\": \"Heating\"}\n```"
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generator = HttpContentGenerator::new(&config(server.uri())).unwrap();
        let task = Task::industry(Industry::new("hvac", "HVAC"));
        let payload = generator.generate(&task, &[]).await.unwrap();

        assert_eq!(payload.title, "HVAC");
        assert_eq!(payload.description, "Heating");
    }

    #[tokio::test]
    async fn test_generate_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let generator = HttpContentGenerator::new(&config(server.uri())).unwrap();
        let task = Task::industry(Industry::new("hvac", "HVAC"));
        let err = generator.generate(&task, &[]).await.unwrap_err();

        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_client_honours_configured_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": []}))
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let generator = HttpContentGenerator::new(&GeneratorConfig {
            timeout_secs: 1,
            ..config(server.uri())
        })
        .unwrap();
        let task = Task::industry(Industry::new("hvac", "HVAC"));
        let err = generator.generate(&task, &[]).await.unwrap_err();

        assert!(err.to_string().contains("Failed to call generation API"));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let generator = HttpContentGenerator::new(&config(server.uri())).unwrap();
        let task = Task::industry(Industry::new("hvac", "HVAC"));
        assert!(generator.generate(&task, &[]).await.is_err());
    }
}
