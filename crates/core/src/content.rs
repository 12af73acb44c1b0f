//! Generated content and its stored record.

use serde::{Deserialize, Serialize};
use crate::Time;

/// Structured content returned by the generation service.
///
/// Only `title` and `description` are required; every other section is
/// optional and unknown fields are carried through untouched so the page
/// renderer sees exactly what the generator produced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentPayload {
    /// Page title
    pub title: String,

    /// Meta description
    #[serde(alias = "metaDescription", alias = "meta_description")]
    pub description: String,

    /// Hero section headline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_headline: Option<String>,

    /// Hero section subheadline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_subheadline: Option<String>,

    /// Introductory paragraph
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,

    /// Benefit cards
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub benefits: Vec<Benefit>,

    /// Frequently asked questions
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faqs: Vec<Faq>,

    /// Closing call to action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<String>,

    /// Fields the generator returned that this type does not model
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A benefit card.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Benefit {
    /// Card title
    pub title: String,
    /// Card body
    pub description: String,
}

/// A question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Faq {
    /// Question
    pub question: String,
    /// Answer
    pub answer: String,
}

/// Reasons a generated payload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// Title missing or blank
    #[error("generated content is missing a title")]
    MissingTitle,

    /// Description missing or blank
    #[error("generated content is missing a description")]
    MissingDescription,
}

impl ContentPayload {
    /// Check the minimum fields a page cannot be rendered without.
    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.title.trim().is_empty() {
            return Err(PayloadError::MissingTitle);
        }
        if self.description.trim().is_empty() {
            return Err(PayloadError::MissingDescription);
        }
        Ok(())
    }
}

/// What the content store holds for one cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    /// The generated content
    pub payload: ContentPayload,

    /// When it was generated
    pub generated_at: Time,
}

impl ContentRecord {
    /// Create a record stamped at `generated_at`.
    pub fn new(payload: ContentPayload, generated_at: Time) -> Self {
        Self {
            payload,
            generated_at,
        }
    }
}
