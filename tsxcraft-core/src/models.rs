//! # Model Registry
//!
//! Friendly model names resolve to `provider:model` strings, which in turn
//! become a [`ProviderConfig`] and a connected [`ChatModel`].
//!
//! ```text
//! "reliable" -> "anthropic:claude-haiku-4-5-20251001" -> ModelSpec -> ChatModel
//! ```

use crate::error::{self, Result};
use crate::provider::{
    AnthropicProvider, CompletionRequest, CompletionResponse, LlmProvider, OpenAIProvider,
    ProviderConfig, ProviderError, ProviderType,
};
use std::collections::BTreeMap;
use std::fmt;

/// Sampling temperature used for every agent call
pub const TEMPERATURE: f32 = 0.0;

const DEFAULT_MODELS: &[(&str, &str)] = &[
    ("gpt-4o-mini", "openai:gpt-4o-mini"),
    ("gpt-4o", "openai:gpt-4o"),
    ("gpt-4", "openai:gpt-4"),
    ("gpt-3.5", "openai:gpt-3.5-turbo"),
    ("claude-sonnet", "anthropic:claude-sonnet-4-5-20250929"),
    ("claude-opus", "anthropic:claude-3-opus-20240229"),
    ("claude-haiku", "anthropic:claude-haiku-4-5-20251001"),
    ("default", "openai:gpt-4o-mini"),
    ("fast", "openai:gpt-4o-mini"),
    ("smart", "anthropic:claude-sonnet-4-5-20250929"),
    ("reliable", "anthropic:claude-haiku-4-5-20251001"),
];

/// A resolved `provider:model` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: ProviderType,
    pub model: String,
}

impl ModelSpec {
    /// Parse a `provider:model` string
    pub fn parse(value: &str) -> Result<Self> {
        let (provider, model) = value.split_once(':').ok_or_else(|| {
            error::config_invalid(format!(
                "'{}' is not in provider:model format (e.g., 'openai:gpt-4')",
                value
            ))
        })?;

        let provider = ProviderType::parse(provider.trim()).ok_or_else(|| {
            error::config_invalid(format!(
                "unsupported provider '{}' (expected 'openai' or 'anthropic')",
                provider
            ))
        })?;

        let model = model.trim();
        if model.is_empty() {
            return Err(error::config_invalid(format!("'{}' names no model", value)));
        }

        Ok(Self {
            provider,
            model: model.to_string(),
        })
    }

    /// Provider configuration with the API key taken from the environment
    pub fn provider_config(&self) -> Result<ProviderConfig> {
        let var = self.provider.api_key_var();
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(self.provider_config_with_key(key)),
            _ => Err(error::provider_unavailable(format!(
                "{} is not set; required for model '{}'",
                var, self
            ))
            .with_operation("models::provider_config")),
        }
    }

    pub fn provider_config_with_key(&self, api_key: impl Into<String>) -> ProviderConfig {
        let config = match self.provider {
            ProviderType::OpenAI => ProviderConfig::openai(api_key),
            ProviderType::Anthropic => ProviderConfig::anthropic(api_key),
        };
        config.with_model(self.model.clone())
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider.as_str(), self.model)
    }
}

/// Friendly-name lookup table
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: BTreeMap<String, String>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self {
            models: DEFAULT_MODELS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a friendly name, or pass a `provider:model` string through.
    pub fn resolve(&self, name: &str) -> Result<ModelSpec> {
        if let Some(value) = self.models.get(name) {
            return ModelSpec::parse(value);
        }

        if name.contains(':') {
            return ModelSpec::parse(name);
        }

        let available: Vec<&str> = self.models.keys().map(|k| k.as_str()).collect();
        Err(error::model_unknown(
            name,
            format!(
                "Unknown model name: '{}'. Available models: {}. Or use provider:model format (e.g., 'openai:gpt-4')",
                name,
                available.join(", ")
            ),
        ))
    }

    /// All entries as (name, provider:model), sorted by name
    pub fn list(&self) -> impl Iterator<Item = (&str, &str)> {
        self.models.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Register or replace a friendly name
    pub fn add(&mut self, name: impl Into<String>, provider_model: impl Into<String>) -> Result<()> {
        let provider_model = provider_model.into();
        if !provider_model.contains(':') {
            return Err(error::config_invalid(format!(
                "Model string must be in 'provider:model' format, got: '{}'",
                provider_model
            )));
        }
        self.models.insert(name.into(), provider_model);
        Ok(())
    }

    /// Resolve and connect in one step, reading the API key from the environment
    pub fn connect(&self, name: &str) -> Result<ChatModel> {
        let spec = self.resolve(name)?;
        tracing::debug!(name, model = %spec, "connecting model");
        ChatModel::from_config(spec.provider_config()?)
    }
}

/// A concrete provider chosen at runtime
pub enum ChatModel {
    OpenAI(OpenAIProvider),
    Anthropic(AnthropicProvider),
}

impl ChatModel {
    pub fn from_config(config: ProviderConfig) -> Result<Self> {
        let model = match config.provider_type {
            ProviderType::OpenAI => OpenAIProvider::new(config).map(ChatModel::OpenAI),
            ProviderType::Anthropic => AnthropicProvider::new(config).map(ChatModel::Anthropic),
        };
        model.map_err(|e| e.into_error("models::connect"))
    }
}

impl LlmProvider for ChatModel {
    fn name(&self) -> &str {
        match self {
            ChatModel::OpenAI(p) => p.name(),
            ChatModel::Anthropic(p) => p.name(),
        }
    }

    fn models(&self) -> Vec<String> {
        match self {
            ChatModel::OpenAI(p) => p.models(),
            ChatModel::Anthropic(p) => p.models(),
        }
    }

    fn default_model(&self) -> &str {
        match self {
            ChatModel::OpenAI(p) => p.default_model(),
            ChatModel::Anthropic(p) => p.default_model(),
        }
    }

    async fn complete(&self, request: CompletionRequest) -> std::result::Result<CompletionResponse, ProviderError> {
        match self {
            ChatModel::OpenAI(p) => p.complete(request).await,
            ChatModel::Anthropic(p) => p.complete(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_resolve_aliases() {
        let registry = ModelRegistry::new();

        let spec = registry.resolve("reliable").unwrap();
        assert_eq!(spec.provider, ProviderType::Anthropic);
        assert_eq!(spec.model, "claude-haiku-4-5-20251001");

        let spec = registry.resolve("gpt-3.5").unwrap();
        assert_eq!(spec.to_string(), "openai:gpt-3.5-turbo");
    }

    #[test]
    fn test_resolve_passthrough() {
        let spec = ModelRegistry::new().resolve("openai:gpt-4.1").unwrap();
        assert_eq!(spec.provider, ProviderType::OpenAI);
        assert_eq!(spec.model, "gpt-4.1");
    }

    #[test]
    fn test_unknown_name_lists_sorted() {
        let err = ModelRegistry::new().resolve("gpt-5").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelUnknown);
        assert!(err.message().starts_with("Unknown model name: 'gpt-5'. Available models: claude-haiku, claude-opus, claude-sonnet, default, fast,"));
        assert!(err.message().ends_with("Or use provider:model format (e.g., 'openai:gpt-4')"));
    }

    #[test]
    fn test_unsupported_provider() {
        let err = ModelRegistry::new().resolve("mistral:large").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_add_validates_format() {
        let mut registry = ModelRegistry::new();
        let err = registry.add("mine", "gpt-4").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        registry.add("mine", "openai:gpt-4o").unwrap();
        assert_eq!(registry.resolve("mine").unwrap().model, "gpt-4o");
        assert!(registry.list().any(|(name, _)| name == "mine"));
    }

    #[test]
    fn test_provider_config_with_key() {
        let spec = ModelSpec::parse("anthropic:claude-3-opus-20240229").unwrap();
        let config = spec.provider_config_with_key("sk-ant");
        assert_eq!(config.provider_type, ProviderType::Anthropic);
        assert_eq!(config.default_model.as_deref(), Some("claude-3-opus-20240229"));
        assert_eq!(config.api_key.as_deref(), Some("sk-ant"));

        let model = ChatModel::from_config(config).unwrap();
        assert_eq!(model.name(), "anthropic");
        assert_eq!(model.default_model(), "claude-3-opus-20240229");
    }
}
