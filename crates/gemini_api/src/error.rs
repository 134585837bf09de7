use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

/// Marker the Gemini endpoint embeds in invalid-key error bodies.
pub const API_KEY_INVALID_MARKER: &str = "API_KEY_INVALID";

#[derive(Debug)]
pub enum GeminiApiError {
    MissingApiKey,
    InvalidApiKey,
    Status(StatusCode, String),
    Request(reqwest::Error),
    Serde(JsonError),
    EmptyCandidates,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(rename = "error")]
    pub value: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayloadFields {
    pub message: Option<String>,
    pub status: Option<String>,
}

impl fmt::Display for GeminiApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "API key is required"),
            Self::InvalidApiKey => {
                write!(f, "the Gemini endpoint rejected the API key as invalid")
            }
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Serde(error) => write!(f, "malformed response body: {error}"),
            Self::EmptyCandidates => write!(f, "response contained no candidate text"),
        }
    }
}

impl std::error::Error for GeminiApiError {}

impl From<reqwest::Error> for GeminiApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for GeminiApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

/// Extracts the most useful human-readable message from a Gemini error body.
///
/// Gemini failures arrive as `{"error": {"code", "message", "status"}}`;
/// non-JSON bodies fall back to the raw body, and empty bodies to the HTTP
/// canonical reason.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let parsed = match serde_json::from_str::<ErrorPayload>(body) {
        Ok(payload) => payload,
        Err(_) => return fallback_message(status, body),
    };

    if let Some(error) = parsed.value {
        if let Some(message) = error.message.as_deref().and_then(non_empty_string) {
            return message.to_owned();
        }
        if let Some(error_status) = error.status.as_deref().and_then(non_empty_string) {
            return error_status.to_owned();
        }
    }

    fallback_message(status, body)
}

/// Returns true when a provider error body reports an invalid API key.
pub fn is_invalid_api_key(body: &str) -> bool {
    body.contains(API_KEY_INVALID_MARKER)
}

fn fallback_message(status: StatusCode, body: &str) -> String {
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

fn non_empty_string(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
