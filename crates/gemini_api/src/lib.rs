//! Transport-only Gemini API client primitives.
//!
//! This crate owns request/response building and parsing behavior for the
//! `generateContent` endpoint only. It intentionally contains no credential
//! storage, no conversation persistence, and no UI coupling.
//!
//! Every call is a single attempt: no retries, no token streaming, no
//! cancellation. Failures are normalized into [`GeminiApiError`] at this
//! boundary, including invalid-key classification via the provider's
//! `API_KEY_INVALID` error marker.

pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod prompt;
pub mod url;

pub use client::GeminiApiClient;
pub use config::GeminiApiConfig;
pub use error::{is_invalid_api_key, parse_error_message, GeminiApiError};
pub use payload::{Content, GenerateRequest, GenerateResponse, Part, MAX_OUTPUT_TOKENS};
pub use prompt::{fix_prompt, persona_turns};
pub use url::{generate_content_url, DEFAULT_GEMINI_BASE_URL};
