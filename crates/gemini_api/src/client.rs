use log::{debug, warn};
use reqwest::Client;

use crate::config::GeminiApiConfig;
use crate::error::{is_invalid_api_key, parse_error_message, GeminiApiError};
use crate::payload::{Content, GenerateRequest, GenerateResponse};
use crate::prompt::{fix_prompt, persona_turns};
use crate::url::generate_content_url;

#[derive(Debug)]
pub struct GeminiApiClient {
    http: Client,
    config: GeminiApiConfig,
}

impl GeminiApiClient {
    pub fn new(config: GeminiApiConfig) -> Result<Self, GeminiApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(GeminiApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GeminiApiConfig {
        &self.config
    }

    pub fn endpoint(&self, model: &str) -> String {
        generate_content_url(&self.config.base_url, model)
    }

    /// Builds the HTTP request without sending it.
    ///
    /// Fails with [`GeminiApiError::MissingApiKey`] before any transport
    /// work when the supplied key is blank.
    pub fn build_request(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<reqwest::RequestBuilder, GeminiApiError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(GeminiApiError::MissingApiKey);
        }

        Ok(self
            .http
            .post(self.endpoint(model))
            .query(&[("key", api_key)])
            .json(request))
    }

    /// Executes one `generateContent` call and extracts the first
    /// candidate's text. A single attempt: no retries, no cancellation.
    pub async fn generate(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<String, GeminiApiError> {
        let response = self
            .build_request(api_key, model, request)?
            .send()
            .await
            .map_err(GeminiApiError::from)?;

        let status = response.status();
        let body = response.text().await.map_err(GeminiApiError::from)?;

        if !status.is_success() {
            if is_invalid_api_key(&body) {
                warn!("gemini endpoint rejected the supplied API key");
                return Err(GeminiApiError::InvalidApiKey);
            }

            return Err(GeminiApiError::Status(
                status,
                parse_error_message(status, &body),
            ));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(GeminiApiError::from)?;
        parsed
            .first_candidate_text()
            .ok_or(GeminiApiError::EmptyCandidates)
    }

    /// Runs one chat completion: the scripted persona turns, the caller's
    /// history snapshot, then the new user message.
    pub async fn ask(
        &self,
        api_key: &str,
        model: &str,
        history: Vec<Content>,
        user_message: &str,
    ) -> Result<String, GeminiApiError> {
        let mut contents = Vec::with_capacity(history.len() + 3);
        contents.extend(persona_turns());
        contents.extend(history);
        contents.push(Content::user(user_message));

        debug!("chat completion: {} contents, model {model}", contents.len());
        self.generate(api_key, model, &GenerateRequest::new(contents))
            .await
    }

    /// Runs one one-shot code-fix request; no history, no persona turns.
    pub async fn fix(
        &self,
        api_key: &str,
        model: &str,
        language_id: &str,
        code: &str,
    ) -> Result<String, GeminiApiError> {
        let contents = vec![Content::user(fix_prompt(language_id, code))];

        debug!("fix request: language {language_id}, model {model}");
        self.generate(api_key, model, &GenerateRequest::new(contents))
            .await
    }
}
