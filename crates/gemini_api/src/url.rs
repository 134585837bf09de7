/// Default base URL for Gemini transport requests.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Normalize a base URL and model id into a `generateContent` endpoint.
///
/// Normalization rules:
/// 1) blank input falls back to the default base
/// 2) trailing slashes are trimmed
/// 3) `/models/{model}:generateContent` is appended
#[must_use]
pub fn generate_content_url(base_url: &str, model: &str) -> String {
    let base = if base_url.trim().is_empty() {
        DEFAULT_GEMINI_BASE_URL
    } else {
        base_url.trim()
    };

    let trimmed = base.trim_end_matches('/');
    format!("{trimmed}/models/{model}:generateContent")
}
