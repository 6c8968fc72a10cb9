//! Model and prompt configuration.

use std::fmt;
use std::time::Duration;

use derive_builder::Builder;

use crate::error::GenerateError;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "openai/gpt-4-turbo";

/// OpenAI-compatible gateway used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://ai-gateway.vercel.sh/v1";

/// Connection settings for the hosted language model.
#[derive(Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ModelConfig {
    /// Bearer token for the model endpoint.
    pub api_key: String,

    /// Model identifier sent with every request.
    #[builder(default = "DEFAULT_MODEL.to_string()")]
    pub model: String,

    /// Base URL of an OpenAI-compatible API.
    #[builder(default = "DEFAULT_BASE_URL.to_string()")]
    pub base_url: String,

    /// Request timeout.
    #[builder(default = "Duration::from_secs(120)")]
    pub timeout: Duration,
}

impl ModelConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.api_key.as_ref().is_some_and(|key| key.trim().is_empty()) {
            return Err("API key cannot be empty".to_string());
        }
        if self.base_url.as_ref().is_some_and(|url| url.trim().is_empty()) {
            return Err("Base URL cannot be empty".to_string());
        }
        Ok(())
    }
}

impl ModelConfig {
    /// Create a new model config builder.
    pub fn builder() -> ModelConfigBuilder {
        ModelConfigBuilder::default()
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl From<ModelConfigBuilderError> for GenerateError {
    fn from(err: ModelConfigBuilderError) -> Self {
        match err {
            ModelConfigBuilderError::UninitializedField("api_key") => GenerateError::MissingApiKey,
            other => GenerateError::InvalidConfig {
                message: other.to_string(),
            },
        }
    }
}

/// Limits on how much of the tree goes into the prompt.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct PromptConfig {
    /// Maximum tree lines in the prompt (None = unlimited).
    #[builder(default = "Some(400)")]
    pub max_tree_entries: Option<usize>,

    /// Maximum tree levels in the prompt (None = unlimited).
    #[builder(default)]
    pub max_tree_depth: Option<usize>,
}

impl PromptConfig {
    /// Create a new prompt config builder.
    pub fn builder() -> PromptConfigBuilder {
        PromptConfigBuilder::default()
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_tree_entries: Some(400),
            max_tree_depth: None,
        }
    }
}
