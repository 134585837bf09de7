//! Gemini-backed implementation of the shared `chat_provider` contract.
//!
//! This adapter translates `gemini_api` transport results into the
//! provider-neutral failure taxonomy expected by the session coordinator:
//! a blank key is a missing credential, the provider's `API_KEY_INVALID`
//! classification becomes an invalid credential, and every other failure
//! surfaces its raw provider message.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chat_provider::{
    AskRequest, ChatError, ChatProvider, FixRequest, ProviderInitError, ProviderProfile, Turn,
};
use gemini_api::{Content, GeminiApiClient, GeminiApiConfig, GeminiApiError, Part};

/// Stable provider identifier used by host startup selection.
pub const GEMINI_PROVIDER_ID: &str = "gemini";

/// Advertised model inventory when no configuration overrides it.
pub const DEFAULT_MODEL_IDS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-2.0-flash",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
];

/// Runtime configuration for the Gemini provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeminiProviderConfig {
    pub model_ids: Vec<String>,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl GeminiProviderConfig {
    #[must_use]
    pub fn new(model_ids: Vec<String>) -> Self {
        Self {
            model_ids,
            base_url: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn into_api_config(self) -> GeminiApiConfig {
        let mut config = GeminiApiConfig::new();

        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        config
    }
}

#[async_trait]
trait GenerateClient: Send + Sync {
    async fn ask(
        &self,
        api_key: &str,
        model: &str,
        history: Vec<Content>,
        user_message: &str,
    ) -> Result<String, GeminiApiError>;

    async fn fix(
        &self,
        api_key: &str,
        model: &str,
        language_id: &str,
        code: &str,
    ) -> Result<String, GeminiApiError>;
}

#[derive(Debug)]
struct DefaultGenerateClient {
    client: GeminiApiClient,
}

#[async_trait]
impl GenerateClient for DefaultGenerateClient {
    async fn ask(
        &self,
        api_key: &str,
        model: &str,
        history: Vec<Content>,
        user_message: &str,
    ) -> Result<String, GeminiApiError> {
        self.client.ask(api_key, model, history, user_message).await
    }

    async fn fix(
        &self,
        api_key: &str,
        model: &str,
        language_id: &str,
        code: &str,
    ) -> Result<String, GeminiApiError> {
        self.client.fix(api_key, model, language_id, code).await
    }
}

/// `ChatProvider` adapter backed by `gemini_api` transport primitives.
pub struct GeminiProvider {
    model_ids: Vec<String>,
    client: Arc<dyn GenerateClient>,
}

impl GeminiProvider {
    /// Creates a provider using real Gemini API transport.
    pub fn new(config: GeminiProviderConfig) -> Result<Self, ProviderInitError> {
        let model_ids = sanitize_model_ids(config.model_ids.clone());
        let client = GeminiApiClient::new(config.into_api_config()).map_err(map_init_error)?;

        Ok(Self {
            model_ids,
            client: Arc::new(DefaultGenerateClient { client }),
        })
    }

    fn model_for(&self, requested: &str) -> String {
        let requested = requested.trim();
        if requested.is_empty() {
            self.model_ids[0].clone()
        } else {
            requested.to_string()
        }
    }

    #[cfg(test)]
    fn with_generate_client_for_tests(
        model_ids: Vec<String>,
        client: Arc<dyn GenerateClient>,
    ) -> Self {
        Self {
            model_ids: sanitize_model_ids(model_ids),
            client,
        }
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: GEMINI_PROVIDER_ID.to_string(),
            model_id: self.model_ids[0].clone(),
        }
    }

    fn model_ids(&self) -> Vec<String> {
        self.model_ids.clone()
    }

    async fn ask(&self, req: AskRequest) -> Result<String, ChatError> {
        let model = self.model_for(&req.model_id);
        self.client
            .ask(
                &req.api_key,
                &model,
                history_contents(&req.history),
                &req.user_message,
            )
            .await
            .map_err(map_chat_error)
    }

    async fn fix(&self, req: FixRequest) -> Result<String, ChatError> {
        let model = self.model_for(&req.model_id);
        self.client
            .fix(&req.api_key, &model, &req.language_id, &req.code)
            .await
            .map_err(map_chat_error)
    }
}

fn history_contents(history: &[Turn]) -> Vec<Content> {
    history
        .iter()
        .map(|turn| Content {
            role: turn.role.as_str().to_string(),
            parts: turn
                .parts
                .iter()
                .map(|part| Part {
                    text: part.text.clone(),
                })
                .collect(),
        })
        .collect()
}

fn map_chat_error(error: GeminiApiError) -> ChatError {
    match error {
        GeminiApiError::MissingApiKey => ChatError::MissingCredential,
        GeminiApiError::InvalidApiKey => ChatError::InvalidCredential,
        GeminiApiError::Status(_, message) => ChatError::Remote(message),
        other => ChatError::Remote(other.to_string()),
    }
}

fn sanitize_model_ids(model_ids: Vec<String>) -> Vec<String> {
    let mut sanitized: Vec<String> = model_ids
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();

    if sanitized.is_empty() {
        sanitized.extend(DEFAULT_MODEL_IDS.iter().map(|id| id.to_string()));
    }

    sanitized
}

fn map_init_error(error: GeminiApiError) -> ProviderInitError {
    ProviderInitError::new(format!("Failed to initialize gemini provider: {error}"))
}
