use serde::{Deserialize, Serialize};

/// Completion cap applied to every request.
pub const MAX_OUTPUT_TOKENS: u32 = 4096;

/// Canonical request payload shape for the `generateContent` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateRequest {
    /// Builds a request over `contents` with the standard output cap.
    #[must_use]
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            generation_config: Some(GenerationConfig {
                max_output_tokens: Some(MAX_OUTPUT_TOKENS),
            }),
        }
    }
}

/// One role-attributed content block in a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::single("user", text)
    }

    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self::single("model", text)
    }

    fn single(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// One text part inside a content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// Response payload for `generateContent`.
///
/// Parsed leniently: candidate content is model output and treated as an
/// untrusted external format, so every nested field tolerates absence.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Returns the concatenated text of the first candidate's parts, or
    /// `None` when the response carries no usable text.
    #[must_use]
    pub fn first_candidate_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;

        let mut text = String::new();
        for part in &content.parts {
            if let Some(fragment) = &part.text {
                text.push_str(fragment);
            }
        }

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
