mod support;

use std::sync::Mutex;

use chat_provider::ChatError;
use coda::fix::{FixConfirmation, FixOutcome, FixReview, Selection, SelectionRange};
use support::{harness, lock_unpoisoned, ScriptedCredentials, ScriptedPrompt};

struct ScriptedReview {
    confirmation: FixConfirmation,
    seen: Mutex<Option<(String, String, String)>>,
}

impl ScriptedReview {
    fn accepting() -> Self {
        Self {
            confirmation: FixConfirmation::Accept,
            seen: Mutex::new(None),
        }
    }

    fn discarding() -> Self {
        Self {
            confirmation: FixConfirmation::Discard,
            seen: Mutex::new(None),
        }
    }

    fn seen(&self) -> Option<(String, String, String)> {
        lock_unpoisoned(&self.seen).clone()
    }
}

impl FixReview for ScriptedReview {
    fn review(&self, original: &str, fixed: &str, explanation: &str) -> FixConfirmation {
        *lock_unpoisoned(&self.seen) = Some((
            original.to_string(),
            fixed.to_string(),
            explanation.to_string(),
        ));
        self.confirmation
    }
}

const DOCUMENT: &str = "let a = 0;\nx=1\nlet b = 2;\n";

fn selection() -> Selection {
    Selection {
        text: "x=1".to_string(),
        language_id: "javascript".to_string(),
        range: SelectionRange { start: 11, end: 14 },
    }
}

#[tokio::test]
async fn accepted_fix_replaces_exactly_the_selection_range() {
    let h = harness(
        vec![Ok(
            r#"{"fixedCode":"x=1;","explanation":"added semicolon"}"#.to_string()
        )],
        ScriptedCredentials::with_key("stored-key"),
        ScriptedPrompt::declining(),
    );

    let review = ScriptedReview::accepting();
    let outcome = h
        .coordinator
        .fix_selection(DOCUMENT, selection(), &review)
        .await;

    assert_eq!(
        outcome,
        FixOutcome::Applied {
            document: "let a = 0;\nx=1;\nlet b = 2;\n".to_string(),
        }
    );

    // the operator saw the before/after comparison with the explanation
    assert_eq!(
        review.seen(),
        Some((
            "x=1".to_string(),
            "x=1;".to_string(),
            "added semicolon".to_string(),
        ))
    );

    let fixes = h.provider.captured_fixes();
    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0].code, "x=1");
    assert_eq!(fixes[0].language_id, "javascript");
}

#[tokio::test]
async fn discarded_fix_leaves_the_document_untouched() {
    let h = harness(
        vec![Ok(
            r#"{"fixedCode":"x=1;","explanation":"added semicolon"}"#.to_string()
        )],
        ScriptedCredentials::with_key("stored-key"),
        ScriptedPrompt::declining(),
    );

    let review = ScriptedReview::discarding();
    let outcome = h
        .coordinator
        .fix_selection(DOCUMENT, selection(), &review)
        .await;

    assert_eq!(outcome, FixOutcome::Discarded);
    assert!(review.seen().is_some());
}

#[tokio::test]
async fn null_fixed_code_yields_the_explanation_only_notice() {
    let h = harness(
        vec![Ok(
            r#"{"fixedCode":null,"explanation":"the code is already correct"}"#.to_string(),
        )],
        ScriptedCredentials::with_key("stored-key"),
        ScriptedPrompt::declining(),
    );

    let review = ScriptedReview::accepting();
    let outcome = h
        .coordinator
        .fix_selection(DOCUMENT, selection(), &review)
        .await;

    assert_eq!(
        outcome,
        FixOutcome::ExplanationOnly {
            explanation: "the code is already correct".to_string(),
        }
    );
    // no comparison is shown when there is nothing to apply
    assert!(review.seen().is_none());
}

#[tokio::test]
async fn non_json_reply_degrades_to_raw_text_without_document_mutation() {
    let raw = "Sure! Here's the fix:\n```js\nx = 1;\n```";
    let h = harness(
        vec![Ok(raw.to_string())],
        ScriptedCredentials::with_key("stored-key"),
        ScriptedPrompt::declining(),
    );

    let review = ScriptedReview::accepting();
    let outcome = h
        .coordinator
        .fix_selection(DOCUMENT, selection(), &review)
        .await;

    assert_eq!(
        outcome,
        FixOutcome::Unstructured {
            raw: raw.to_string(),
        }
    );
    assert!(review.seen().is_none());
}

#[tokio::test]
async fn empty_payload_yields_the_no_usable_output_warning() {
    let h = harness(
        vec![Ok("{}".to_string())],
        ScriptedCredentials::with_key("stored-key"),
        ScriptedPrompt::declining(),
    );

    let outcome = h
        .coordinator
        .fix_selection(DOCUMENT, selection(), &ScriptedReview::accepting())
        .await;

    assert_eq!(outcome, FixOutcome::NoUsableOutput);
}

#[tokio::test]
async fn remote_failure_surfaces_without_touching_the_document() {
    let h = harness(
        vec![Err(ChatError::Remote("model overloaded".to_string()))],
        ScriptedCredentials::with_key("stored-key"),
        ScriptedPrompt::declining(),
    );

    let outcome = h
        .coordinator
        .fix_selection(DOCUMENT, selection(), &ScriptedReview::accepting())
        .await;

    assert_eq!(
        outcome,
        FixOutcome::Failed {
            message: "model overloaded".to_string(),
        }
    );
}

#[tokio::test]
async fn declined_credential_prompt_aborts_before_any_call() {
    let h = harness(
        Vec::new(),
        ScriptedCredentials::empty(),
        ScriptedPrompt::declining(),
    );

    let outcome = h
        .coordinator
        .fix_selection(DOCUMENT, selection(), &ScriptedReview::accepting())
        .await;

    assert_eq!(outcome, FixOutcome::Aborted);
    assert!(h.provider.captured_fixes().is_empty());
}

#[tokio::test]
async fn stale_selection_range_fails_instead_of_corrupting_the_document() {
    let h = harness(
        vec![Ok(
            r#"{"fixedCode":"x=1;","explanation":"added semicolon"}"#.to_string()
        )],
        ScriptedCredentials::with_key("stored-key"),
        ScriptedPrompt::declining(),
    );

    let stale = Selection {
        text: "x=1".to_string(),
        language_id: "javascript".to_string(),
        range: SelectionRange {
            start: 11,
            end: DOCUMENT.len() + 10,
        },
    };
    let outcome = h
        .coordinator
        .fix_selection(DOCUMENT, stale, &ScriptedReview::accepting())
        .await;

    assert!(matches!(outcome, FixOutcome::Failed { .. }));
}
