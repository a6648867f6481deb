//! Prompt and version models.
//!
//! A [`Prompt`] is created with exactly one [`Version`] and owns an
//! append-only version history. [`PromptSummary`] is the list projection,
//! which drops per-version content.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Unique identifier for a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptId(String);

impl PromptId {
    /// Creates a prompt ID from an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PromptId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PromptId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Generation parameters attached to a prompt.
///
/// Fields absent from the create request stay `None` and are omitted from
/// the JSON representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus-sampling probability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Maximum output length in tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// An immutable snapshot of a prompt's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// Version number, starting at 1.
    pub version: u32,
    /// When the version was recorded.
    pub created_at: DateTime<Utc>,
    /// Prompt content as of this version.
    pub content: String,
}

/// A stored prompt with metadata and version history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    /// Unique identifier.
    pub id: PromptId,
    /// Display title.
    pub title: String,
    /// Current content.
    pub content: String,
    /// Tags, order irrelevant.
    pub tags: Vec<String>,
    /// Identifier of the chosen model profile.
    pub model: String,
    /// Generation parameters.
    pub config: GenerationConfig,
    /// Example inputs or outputs, in order.
    pub examples: Vec<String>,
    /// Version history, oldest first.
    pub versions: Vec<Version>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Prompt {
    /// Builds a new prompt with a fresh identity and its first version.
    ///
    /// Timestamps are truncated to microseconds so every store backend
    /// round-trips them exactly.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>, model: impl Into<String>) -> Self {
        let now = Utc::now().trunc_subsecs(6);
        let content = content.into();
        Self {
            id: PromptId::generate(),
            title: title.into(),
            versions: vec![Version {
                version: 1,
                created_at: now,
                content: content.clone(),
            }],
            content,
            tags: Vec::new(),
            model: model.into(),
            config: GenerationConfig::default(),
            examples: Vec::new(),
            created_at: now,
        }
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Sets the examples.
    #[must_use]
    pub fn with_examples(mut self, examples: Vec<String>) -> Self {
        self.examples = examples;
        self
    }

    /// Sets the generation parameters.
    #[must_use]
    pub const fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the most recent version, if any.
    #[must_use]
    pub fn latest_version(&self) -> Option<&Version> {
        self.versions.last()
    }

    /// Returns the list projection of this prompt.
    #[must_use]
    pub fn summary(&self) -> PromptSummary {
        PromptSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            tags: self.tags.clone(),
            model: self.model.clone(),
            created_at: self.created_at,
            versions: self.versions.iter().map(VersionSummary::from).collect(),
        }
    }
}

/// Version entry of the list projection (content omitted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    /// Version number.
    pub version: u32,
    /// When the version was recorded.
    pub created_at: DateTime<Utc>,
}

impl From<&Version> for VersionSummary {
    fn from(version: &Version) -> Self {
        Self {
            version: version.version,
            created_at: version.created_at,
        }
    }
}

/// List projection of a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSummary {
    /// Unique identifier.
    pub id: PromptId,
    /// Display title.
    pub title: String,
    /// Current content.
    pub content: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Chosen model identifier.
    pub model: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Version numbers and timestamps, oldest first.
    pub versions: Vec<VersionSummary>,
}

/// Request to create a prompt.
///
/// Mirrors the `POST /api/prompts` body. Required string fields default to
/// empty so that validation, not deserialization, reports them as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePromptRequest {
    /// Display title (required, non-empty).
    #[serde(default)]
    pub title: String,
    /// Prompt content (required, non-empty).
    #[serde(default)]
    pub content: String,
    /// Tags; `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    /// Model identifier.
    #[serde(default)]
    pub model: String,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Nucleus-sampling probability.
    #[serde(default)]
    pub top_p: Option<f64>,
    /// Maximum output length. Negative or fractional values never parse.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Examples; `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub examples: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl CreatePromptRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Sets the examples.
    #[must_use]
    pub fn with_examples(mut self, examples: Vec<String>) -> Self {
        self.examples = examples;
        self
    }

    /// Sets the generation parameters.
    #[must_use]
    pub const fn with_config(mut self, config: GenerationConfig) -> Self {
        self.temperature = config.temperature;
        self.top_p = config.top_p;
        self.max_tokens = config.max_tokens;
        self
    }

    /// Returns the generation parameters carried by the request.
    #[must_use]
    pub const fn config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_prompt_has_single_version() {
        let prompt = Prompt::new("Greeting", "Say hello", "gpt-4o");
        assert_eq!(prompt.versions.len(), 1);
        let version = prompt.latest_version().unwrap();
        assert_eq!(version.version, 1);
        assert_eq!(version.content, prompt.content);
        assert_eq!(version.created_at, prompt.created_at);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = PromptId::generate();
        let b = PromptId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_prompt_serializes_camel_case_with_empty_sequences() {
        let prompt = Prompt::new("t", "c", "gpt-4o");
        let json = serde_json::to_value(&prompt).unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["tags"], serde_json::json!([]));
        assert_eq!(json["examples"], serde_json::json!([]));
        assert_eq!(json["versions"][0]["version"], 1);
        assert_eq!(json["versions"][0]["content"], "c");
        assert_eq!(json["config"], serde_json::json!({}));
    }

    #[test]
    fn test_summary_drops_version_content() {
        let prompt = Prompt::new("t", "c", "gpt-4o").with_tags(vec!["a".to_string()]);
        let json = serde_json::to_value(prompt.summary()).unwrap();
        assert_eq!(json["tags"], serde_json::json!(["a"]));
        assert!(json["versions"][0].get("content").is_none());
        assert!(json["versions"][0].get("createdAt").is_some());
    }

    #[test]
    fn test_create_request_defaults() {
        let request: CreatePromptRequest =
            serde_json::from_str(r#"{"title":"t","content":"c","model":"gpt-4o"}"#).unwrap();
        assert!(request.tags.is_empty());
        assert!(request.examples.is_empty());
        assert_eq!(request.config(), GenerationConfig::default());
    }

    #[test]
    fn test_create_request_null_sequences_read_as_empty() {
        let request: CreatePromptRequest = serde_json::from_str(
            r#"{"title":"t","content":"c","model":"gpt-4o","tags":null,"examples":null}"#,
        )
        .unwrap();
        assert!(request.tags.is_empty());
        assert!(request.examples.is_empty());
    }

    #[test]
    fn test_create_request_rejects_non_integral_max_tokens() {
        for body in [
            r#"{"title":"t","content":"c","model":"gpt-4o","max_tokens":-1}"#,
            r#"{"title":"t","content":"c","model":"gpt-4o","max_tokens":1.5}"#,
        ] {
            assert!(serde_json::from_str::<CreatePromptRequest>(body).is_err());
        }
    }

    #[test]
    fn test_create_request_reads_generation_fields() {
        let request: CreatePromptRequest = serde_json::from_str(
            r#"{"title":"t","content":"c","model":"gpt-4o","temperature":0.7,"top_p":1,"max_tokens":800}"#,
        )
        .unwrap();
        let config = request.config();
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.top_p, Some(1.0));
        assert_eq!(config.max_tokens, Some(800));
    }
}
