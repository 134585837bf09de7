//! Minimal provider-agnostic contract for one chat or code-fix exchange.
//!
//! This crate intentionally defines only the shared message types, per-call
//! request value objects, and the failure taxonomy every provider normalizes
//! into. It excludes provider transport details, prompt construction, and
//! persistence concerns.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Author of one conversation turn.
///
/// Serialized lowercase to match both the persisted conversation format and
/// the Gemini wire roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Returns the wire-level role string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One text fragment inside a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnPart {
    pub text: String,
}

/// One conversation turn: an author role and a non-empty part sequence.
///
/// The constructors build single-part turns; the role is fixed at
/// construction and turns are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<TurnPart>,
}

impl Turn {
    /// Creates a user turn with a single text part.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::single(Role::User, text)
    }

    /// Creates a model turn with a single text part.
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self::single(Role::Model, text)
    }

    fn single(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![TurnPart { text: text.into() }],
        }
    }

    /// Returns the concatenated text of every part.
    #[must_use]
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|part| part.text.as_str())
            .collect::<String>()
    }
}

/// Input for one chat completion call, constructed fresh per call and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    pub api_key: String,
    pub model_id: String,
    pub history: Vec<Turn>,
    pub user_message: String,
}

/// Input for one code-fix call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixRequest {
    pub api_key: String,
    pub model_id: String,
    pub code: String,
    pub language_id: String,
}

/// Failure taxonomy every provider call is normalized into.
///
/// Credential failures carry fixed operator-facing wording; remote failures
/// surface the provider message unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    MissingCredential,
    InvalidCredential,
    Remote(String),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential => {
                write!(f, "API Key is missing. Please configure it in the settings.")
            }
            Self::InvalidCredential => {
                write!(f, "The provided API Key is invalid. Please check your settings.")
            }
            Self::Remote(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for ChatError {}

/// Error returned while constructing/configuring a provider before any call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInitError {
    message: String,
}

impl ProviderInitError {
    /// Creates a new provider initialization error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the underlying error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderInitError {}

impl From<String> for ProviderInitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ProviderInitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Immutable metadata describing a chat provider and its default model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub model_id: String,
}

/// Provider interface for executing one chat or code-fix call.
///
/// Implementations run a single attempt per call and must map every failure
/// into [`ChatError`]; an empty `api_key` fails with
/// [`ChatError::MissingCredential`] before any transport work.
#[async_trait]
pub trait ChatProvider: Send + Sync + 'static {
    /// Returns provider/default-model identity metadata.
    fn profile(&self) -> ProviderProfile;

    /// Returns the model identifiers this provider can serve.
    fn model_ids(&self) -> Vec<String>;

    /// Executes one chat completion over the supplied history snapshot.
    async fn ask(&self, req: AskRequest) -> Result<String, ChatError>;

    /// Executes one constrained code-fix request; the response text is
    /// returned unparsed.
    async fn fix(&self, req: FixRequest) -> Result<String, ChatError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        AskRequest, ChatError, ChatProvider, FixRequest, ProviderInitError, ProviderProfile, Role,
        Turn, TurnPart,
    };

    struct EchoProvider;

    #[async_trait::async_trait]
    impl ChatProvider for EchoProvider {
        fn profile(&self) -> ProviderProfile {
            ProviderProfile {
                provider_id: "echo".to_string(),
                model_id: "echo-model".to_string(),
            }
        }

        fn model_ids(&self) -> Vec<String> {
            vec!["echo-model".to_string()]
        }

        async fn ask(&self, req: AskRequest) -> Result<String, ChatError> {
            if req.api_key.is_empty() {
                return Err(ChatError::MissingCredential);
            }
            Ok(req.user_message)
        }

        async fn fix(&self, req: FixRequest) -> Result<String, ChatError> {
            if req.api_key.is_empty() {
                return Err(ChatError::MissingCredential);
            }
            Ok(req.code)
        }
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::User).expect("serialize"), json!("user"));
        assert_eq!(serde_json::to_value(Role::Model).expect("serialize"), json!("model"));
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Model.as_str(), "model");
    }

    #[test]
    fn turn_constructors_build_single_part_turns() {
        let turn = Turn::user("hello");
        assert_eq!(turn.role, Role::User);
        assert_eq!(
            turn.parts,
            vec![TurnPart {
                text: "hello".to_string(),
            }]
        );

        let reply = Turn::model("world");
        assert_eq!(reply.role, Role::Model);
        assert_eq!(reply.text(), "world");
    }

    #[test]
    fn turn_text_concatenates_parts_in_order() {
        let turn = Turn {
            role: Role::Model,
            parts: vec![
                TurnPart {
                    text: "first ".to_string(),
                },
                TurnPart {
                    text: "second".to_string(),
                },
            ],
        };

        assert_eq!(turn.text(), "first second");
    }

    #[test]
    fn turn_wire_shape_matches_role_and_parts_contract() {
        let value = serde_json::to_value(Turn::user("2+2=5, fix?")).expect("serialize turn");
        assert_eq!(
            value,
            json!({ "role": "user", "parts": [{ "text": "2+2=5, fix?" }] })
        );

        let parsed: Turn = serde_json::from_value(value).expect("deserialize turn");
        assert_eq!(parsed, Turn::user("2+2=5, fix?"));
    }

    #[test]
    fn chat_error_display_rewrites_credential_failures_only() {
        assert_eq!(
            ChatError::MissingCredential.to_string(),
            "API Key is missing. Please configure it in the settings."
        );
        assert_eq!(
            ChatError::InvalidCredential.to_string(),
            "The provided API Key is invalid. Please check your settings."
        );
        assert_eq!(
            ChatError::Remote("503 model overloaded".to_string()).to_string(),
            "503 model overloaded"
        );
    }

    #[test]
    fn provider_init_error_preserves_message() {
        let error = ProviderInitError::new("missing config");
        assert_eq!(error.message(), "missing config");
        assert_eq!(error.to_string(), "missing config");
    }

    #[tokio::test]
    async fn empty_api_key_short_circuits_before_any_work() {
        let provider = EchoProvider;

        let ask = provider
            .ask(AskRequest {
                api_key: String::new(),
                model_id: "echo-model".to_string(),
                history: Vec::new(),
                user_message: "hello".to_string(),
            })
            .await;
        assert_eq!(ask, Err(ChatError::MissingCredential));

        let fix = provider
            .fix(FixRequest {
                api_key: String::new(),
                model_id: "echo-model".to_string(),
                code: "x=1".to_string(),
                language_id: "rust".to_string(),
            })
            .await;
        assert_eq!(fix, Err(ChatError::MissingCredential));
    }

    #[tokio::test]
    async fn request_objects_carry_history_and_message_through_trait_objects() {
        let provider: &dyn ChatProvider = &EchoProvider;
        let response = provider
            .ask(AskRequest {
                api_key: "key".to_string(),
                model_id: "echo-model".to_string(),
                history: vec![Turn::user("earlier"), Turn::model("noted")],
                user_message: "latest".to_string(),
            })
            .await
            .expect("echo ask should succeed");

        assert_eq!(response, "latest");
        assert_eq!(provider.profile().provider_id, "echo");
    }
}
