//! Model-identifier based provider selection
//!
//! A model identifier is resolved once into a [`ProviderSelector`]; the
//! selector is then used to build an [`AnyProvider`] which forwards every
//! request to the matching backend.

use super::*;
use crate::config::ClientConfig;

/// Which backend serves a model identifier, and under which model name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSelector {
    OpenAI { model: String },
    Anthropic { model: String },
    Gemini { model: String },
    Ollama { model: String },
}

fn has_prefix(model_id: &str, prefix: &str) -> bool {
    model_id
        .get(..prefix.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(prefix))
}

impl ProviderSelector {
    /// Resolve a model identifier.
    ///
    /// Prefixes are matched case-insensitively; the model name keeps its case.
    ///
    /// - `ollama:<name>` selects Ollama with model `<name>`
    /// - identifiers starting with `claude` select Anthropic
    /// - identifiers starting with `gemini` select Gemini
    /// - everything else goes to the OpenAI-compatible endpoint
    pub fn resolve(model_id: &str) -> Self {
        const OLLAMA_PREFIX: &str = "ollama:";

        if has_prefix(model_id, OLLAMA_PREFIX) {
            return Self::Ollama {
                model: model_id[OLLAMA_PREFIX.len()..].to_string(),
            };
        }

        let model = model_id.to_string();
        if has_prefix(model_id, "claude") {
            Self::Anthropic { model }
        } else if has_prefix(model_id, "gemini") {
            Self::Gemini { model }
        } else {
            Self::OpenAI { model }
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI { model }
            | Self::Anthropic { model }
            | Self::Gemini { model }
            | Self::Ollama { model } => model,
        }
    }

    pub fn provider_type(&self) -> ProviderType {
        match self {
            Self::OpenAI { .. } => ProviderType::OpenAI,
            Self::Anthropic { .. } => ProviderType::Anthropic,
            Self::Gemini { .. } => ProviderType::Gemini,
            Self::Ollama { .. } => ProviderType::Ollama,
        }
    }

    /// Provider configuration for this selection, filled from the client config
    pub fn provider_config(&self, client: &ClientConfig) -> ProviderConfig {
        let config = match self {
            Self::OpenAI { .. } => {
                let config = ProviderConfig::openai(client.openai_api_key.clone());
                match &client.openai_api_base {
                    Some(base) => config.with_base_url(base.clone()),
                    None => config,
                }
            }
            Self::Anthropic { .. } => {
                let config = ProviderConfig::anthropic(client.anthropic_api_key.clone());
                match &client.anthropic_api_base {
                    Some(base) => config.with_base_url(base.clone()),
                    None => config,
                }
            }
            Self::Gemini { .. } => {
                let config = ProviderConfig::gemini(client.gemini_api_key.clone());
                match &client.gemini_api_base {
                    Some(base) => config.with_base_url(base.clone()),
                    None => config,
                }
            }
            Self::Ollama { .. } => ProviderConfig::ollama(client.ollama_api_base.clone()),
        };

        config
            .with_model(self.model())
            .with_timeout(client.http_timeout_secs)
    }
}

/// A provider chosen at run time from a [`ProviderSelector`]
pub enum AnyProvider {
    OpenAI(OpenAIProvider),
    Anthropic(AnthropicProvider),
    Gemini(GeminiProvider),
    Ollama(OllamaProvider),
}

impl AnyProvider {
    pub fn connect(client: &ClientConfig, selector: &ProviderSelector) -> Result<Self> {
        let config = selector.provider_config(client);
        let provider = match selector {
            ProviderSelector::OpenAI { .. } => Self::OpenAI(OpenAIProvider::new(config)?),
            ProviderSelector::Anthropic { .. } => Self::Anthropic(AnthropicProvider::new(config)?),
            ProviderSelector::Gemini { .. } => Self::Gemini(GeminiProvider::new(config)?),
            ProviderSelector::Ollama { .. } => Self::Ollama(OllamaProvider::new(config)?),
        };
        Ok(provider)
    }

    /// Resolve a model identifier and connect in one step
    pub fn for_model(client: &ClientConfig, model_id: &str) -> Result<Self> {
        Self::connect(client, &ProviderSelector::resolve(model_id))
    }
}

impl LlmProvider for AnyProvider {
    fn name(&self) -> &str {
        match self {
            Self::OpenAI(p) => p.name(),
            Self::Anthropic(p) => p.name(),
            Self::Gemini(p) => p.name(),
            Self::Ollama(p) => p.name(),
        }
    }

    fn default_model(&self) -> &str {
        match self {
            Self::OpenAI(p) => p.default_model(),
            Self::Anthropic(p) => p.default_model(),
            Self::Gemini(p) => p.default_model(),
            Self::Ollama(p) => p.default_model(),
        }
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        match self {
            Self::OpenAI(p) => p.complete(request).await,
            Self::Anthropic(p) => p.complete(request).await,
            Self::Gemini(p) => p.complete(request).await,
            Self::Ollama(p) => p.complete(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_resolve_by_identifier() {
        assert_eq!(
            ProviderSelector::resolve("ollama:llama3"),
            ProviderSelector::Ollama {
                model: "llama3".into()
            }
        );
        assert_eq!(
            ProviderSelector::resolve("OLLAMA:qwen2:7b"),
            ProviderSelector::Ollama {
                model: "qwen2:7b".into()
            }
        );
        assert_eq!(
            ProviderSelector::resolve("claude-3-5-sonnet").provider_type(),
            ProviderType::Anthropic
        );
        assert_eq!(
            ProviderSelector::resolve("gemini-1.5-pro").provider_type(),
            ProviderType::Gemini
        );
        assert_eq!(
            ProviderSelector::resolve("Claude-3-5-Sonnet"),
            ProviderSelector::Anthropic {
                model: "Claude-3-5-Sonnet".into()
            }
        );
        assert_eq!(
            ProviderSelector::resolve("Gemini-1.5-Pro"),
            ProviderSelector::Gemini {
                model: "Gemini-1.5-Pro".into()
            }
        );
        assert_eq!(
            ProviderSelector::resolve("gpt-4o").provider_type(),
            ProviderType::OpenAI
        );
        assert_eq!(
            ProviderSelector::resolve("deepseek-chat").provider_type(),
            ProviderType::OpenAI
        );
        assert_eq!(ProviderSelector::resolve("gpt-4o").model(), "gpt-4o");
    }

    #[test]
    fn test_short_identifiers_do_not_panic() {
        assert_eq!(
            ProviderSelector::resolve("oll").provider_type(),
            ProviderType::OpenAI
        );
        assert_eq!(ProviderSelector::resolve("").provider_type(), ProviderType::OpenAI);
    }

    #[test]
    fn test_provider_config_uses_client_settings() {
        let client = ClientConfig {
            openai_api_key: Some("sk-1".into()),
            openai_api_base: Some("http://proxy/v1".into()),
            http_timeout_secs: 30,
            ..ClientConfig::default()
        };

        let config = ProviderSelector::resolve("gpt-4o").provider_config(&client);
        assert_eq!(config.api_key.as_deref(), Some("sk-1"));
        assert_eq!(config.base_url.as_deref(), Some("http://proxy/v1"));
        assert_eq!(config.default_model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.timeout_secs, Some(30));

        let config = ProviderSelector::resolve("ollama:llama3").provider_config(&client);
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:11434"));
        assert_eq!(config.default_model.as_deref(), Some("llama3"));
    }

    #[tokio::test]
    async fn test_any_provider_dispatches_to_selected_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({"model": "llama3"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": {"role": "assistant", "content": "ok"},
                "done": true
            })))
            .mount(&server)
            .await;

        let client = ClientConfig {
            ollama_api_base: server.uri(),
            ..ClientConfig::default()
        };
        let provider = tokio_test::assert_ok!(AnyProvider::for_model(&client, "ollama:llama3"));
        assert_eq!(provider.name(), "ollama");

        let (text, _) = query(&provider, &[ChatMessage::user("hi")], DEFAULT_TEMPERATURE)
            .await
            .unwrap();
        assert_eq!(text, "ok");
    }
}
