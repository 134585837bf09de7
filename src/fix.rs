//! Code-fix protocol: payload classification and selection reconciliation.
//!
//! The model is asked for a JSON object `{"fixedCode", "explanation"}` but
//! its reply is untrusted: classification validates the shape explicitly
//! and degrades to surfacing raw text instead of failing. A fix is only
//! ever applied to the document after explicit operator confirmation.

use serde::Deserialize;

/// JSON contract the fix prompt demands from the model.
///
/// Both fields tolerate absence so that shape violations downgrade to the
/// unusable case instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixPayload {
    #[serde(default)]
    pub fixed_code: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Byte range of the editor selection being fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
}

/// Editor selection handed to the fix flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub text: String,
    pub language_id: String,
    pub range: SelectionRange,
}

/// What the model's fix response amounts to after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixDisposition {
    /// A concrete replacement plus its explanation.
    Patch {
        fixed_code: String,
        explanation: String,
    },
    /// No fix; the model explained why.
    ExplanationOnly { explanation: String },
    /// JSON parsed but carried nothing usable.
    Unusable,
    /// Not JSON at all; surfaced raw.
    Unstructured { raw: String },
}

/// Classifies untrusted model output against the fix contract.
///
/// The response must parse as JSON as a whole (whitespace-trimmed); any
/// other text takes the unstructured degradation path.
#[must_use]
pub fn classify_fix_response(raw: &str) -> FixDisposition {
    let Ok(payload) = serde_json::from_str::<FixPayload>(raw.trim()) else {
        return FixDisposition::Unstructured {
            raw: raw.to_string(),
        };
    };

    match (payload.fixed_code, payload.explanation) {
        (Some(fixed_code), explanation) => FixDisposition::Patch {
            fixed_code,
            explanation: explanation.unwrap_or_default(),
        },
        (None, Some(explanation)) if !explanation.trim().is_empty() => {
            FixDisposition::ExplanationOnly { explanation }
        }
        _ => FixDisposition::Unusable,
    }
}

/// Operator decision over a proposed fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixConfirmation {
    Accept,
    Discard,
}

/// Before/after confirmation seam; the front-end renders the comparison.
pub trait FixReview: Send + Sync {
    fn review(&self, original: &str, fixed: &str, explanation: &str) -> FixConfirmation;
}

/// Terminal outcome of one fix flow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    /// The operator accepted; `document` is the rewritten content.
    Applied { document: String },
    /// The operator discarded the proposal; the document is untouched.
    Discarded,
    /// The model found nothing to fix and said why.
    ExplanationOnly { explanation: String },
    /// The model's reply was not JSON; shown raw.
    Unstructured { raw: String },
    /// JSON reply with neither a fix nor an explanation.
    NoUsableOutput,
    /// The remote call itself failed.
    Failed { message: String },
    /// No credential was available and the operator declined to supply one.
    Aborted,
}

/// Replaces exactly `range` in `document` with `replacement`.
///
/// Returns `None` when the range does not map onto the document (out of
/// bounds or splitting a UTF-8 character).
#[must_use]
pub fn apply_fix(document: &str, range: SelectionRange, replacement: &str) -> Option<String> {
    if range.start > range.end || range.end > document.len() {
        return None;
    }
    if !document.is_char_boundary(range.start) || !document.is_char_boundary(range.end) {
        return None;
    }

    let mut rewritten =
        String::with_capacity(document.len() - (range.end - range.start) + replacement.len());
    rewritten.push_str(&document[..range.start]);
    rewritten.push_str(replacement);
    rewritten.push_str(&document[range.end..]);
    Some(rewritten)
}
