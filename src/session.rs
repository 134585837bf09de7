//! Session coordination between the UI surface, the conversation store,
//! and the remote model.
//!
//! Each user turn walks Idle -> AwaitingCredential -> AwaitingResponse ->
//! Reconciled. The coordinator owns all conversation-store mutations; a
//! remote failure is reconciled purely through UI events and leaves no
//! trace in persisted history. Turns are independent tasks and are not
//! serialized against each other: concurrent submissions may interleave
//! their placeholder/replace events.

use std::sync::{Arc, Mutex, MutexGuard};

use chat_provider::{AskRequest, ChatProvider, FixRequest, Turn};
use conversation_store::ConversationStore;
use log::{debug, error, warn};

use crate::credentials::{CredentialPrompt, CredentialStore};
use crate::fix::{
    apply_fix, classify_fix_response, FixConfirmation, FixDisposition, FixOutcome, FixReview,
    Selection,
};
use crate::sidebar::{TranscriptTurn, UiEvent, UiSink, WebviewMessage};

/// Placeholder bubble posted while a remote call is in flight.
pub const PENDING_PLACEHOLDER: &str = "Thinking...";

pub struct SessionCoordinator {
    provider: Arc<dyn ChatProvider>,
    store: Mutex<ConversationStore>,
    credentials: Arc<dyn CredentialStore>,
    prompt: Arc<dyn CredentialPrompt>,
    ui: Arc<dyn UiSink>,
    current_model: Mutex<String>,
}

impl SessionCoordinator {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        store: ConversationStore,
        credentials: Arc<dyn CredentialStore>,
        prompt: Arc<dyn CredentialPrompt>,
        ui: Arc<dyn UiSink>,
    ) -> Self {
        let current_model = provider.profile().model_id;

        Self {
            provider,
            store: Mutex::new(store),
            credentials,
            prompt,
            ui,
            current_model: Mutex::new(current_model),
        }
    }

    /// Returns the active model selection.
    #[must_use]
    pub fn current_model(&self) -> String {
        lock_unpoisoned(&self.current_model).clone()
    }

    /// Returns the advertised model inventory.
    #[must_use]
    pub fn model_ids(&self) -> Vec<String> {
        self.provider.model_ids()
    }

    /// Dispatches one inbound UI message. Unknown messages are a no-op.
    pub async fn handle(&self, message: WebviewMessage) {
        match message {
            WebviewMessage::AskQuestion { value, history } => {
                self.ask_question(value, history).await;
            }
            WebviewMessage::SetModel { value } => self.set_model(&value),
            WebviewMessage::ClearHistory => self.clear_history(),
            WebviewMessage::WebviewReady => self.webview_ready(),
            WebviewMessage::Unknown => {}
        }
    }

    /// Entry point for the manual prompt fallback: echoes the user's turn
    /// to the UI before running the shared ask flow.
    pub async fn ask_from_prompt(&self, value: String) {
        let trimmed = value.trim().to_string();
        if trimmed.is_empty() {
            return;
        }

        self.ui
            .post(UiEvent::AddUserMessage(TranscriptTurn::user(trimmed.as_str())));
        self.ask_question(trimmed, None).await;
    }

    /// Runs one user turn.
    ///
    /// A caller-supplied history snapshot wins for the remote call; the
    /// persisted store is what receives the post-call append. Empty
    /// submissions and declined credential prompts abort silently.
    pub async fn ask_question(&self, value: String, history: Option<Vec<TranscriptTurn>>) {
        let value = value.trim().to_string();
        if value.is_empty() {
            return;
        }

        debug!("turn: awaiting credential");
        let Some(api_key) = self.resolve_api_key() else {
            debug!("turn: no credential supplied, returning to idle");
            return;
        };

        debug!("turn: awaiting response");
        self.ui
            .post(UiEvent::AddMessage(TranscriptTurn::model(PENDING_PLACEHOLDER)));

        let history_turns: Vec<Turn> = match history {
            Some(snapshot) => snapshot.into_iter().map(TranscriptTurn::into_turn).collect(),
            None => lock_unpoisoned(&self.store).turns().to_vec(),
        };

        let request = AskRequest {
            api_key,
            model_id: self.current_model(),
            history: history_turns,
            user_message: value.clone(),
        };

        match self.provider.ask(request).await {
            Ok(response) => {
                debug!("turn: reconciled");
                let appended = lock_unpoisoned(&self.store)
                    .append(vec![Turn::user(value.as_str()), Turn::model(response.as_str())])
                    .map(|_| ());
                if let Err(store_error) = appended {
                    error!("failed to persist reconciled turn: {store_error}");
                }

                self.ui
                    .post(UiEvent::ReplaceLastMessage(TranscriptTurn::model(response)));
            }
            Err(chat_error) => {
                warn!("remote call failed: {chat_error}");
                self.ui.post(UiEvent::ReplaceLastMessage(TranscriptTurn::model(
                    format!("Error: {chat_error}"),
                )));
            }
        }
    }

    /// Changes the active model selection; blank values are ignored.
    pub fn set_model(&self, value: &str) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return;
        }

        debug!("model selection changed to {trimmed}");
        *lock_unpoisoned(&self.current_model) = trimmed.to_string();
    }

    /// Clears the persisted conversation. Operator confirmation happens in
    /// the front-end before this is invoked.
    pub fn clear_history(&self) {
        if let Err(store_error) = lock_unpoisoned(&self.store).clear() {
            error!("failed to clear conversation: {store_error}");
            return;
        }

        self.ui.post(UiEvent::LoadHistory(Vec::new()));
    }

    /// Replays persisted state to a freshly attached UI surface.
    pub fn webview_ready(&self) {
        let transcript: Vec<TranscriptTurn> = lock_unpoisoned(&self.store)
            .turns()
            .iter()
            .map(TranscriptTurn::from_turn)
            .collect();

        self.ui.post(UiEvent::LoadHistory(transcript));
        self.ui.post(UiEvent::UpdateModels {
            models: self.provider.model_ids(),
            current_model: self.current_model(),
        });
    }

    /// Runs the code-fix flow over an editor selection.
    ///
    /// The document is rewritten only when the operator accepts the
    /// proposed patch; every other path leaves it untouched.
    pub async fn fix_selection(
        &self,
        document: &str,
        selection: Selection,
        review: &dyn FixReview,
    ) -> FixOutcome {
        let Some(api_key) = self.resolve_api_key() else {
            return FixOutcome::Aborted;
        };

        let request = FixRequest {
            api_key,
            model_id: self.current_model(),
            code: selection.text.clone(),
            language_id: selection.language_id.clone(),
        };

        let raw = match self.provider.fix(request).await {
            Ok(raw) => raw,
            Err(chat_error) => {
                warn!("fix call failed: {chat_error}");
                return FixOutcome::Failed {
                    message: chat_error.to_string(),
                };
            }
        };

        match classify_fix_response(&raw) {
            FixDisposition::Patch {
                fixed_code,
                explanation,
            } => match review.review(&selection.text, &fixed_code, &explanation) {
                FixConfirmation::Accept => match apply_fix(document, selection.range, &fixed_code) {
                    Some(rewritten) => FixOutcome::Applied {
                        document: rewritten,
                    },
                    None => {
                        warn!("fix selection range no longer maps onto the document");
                        FixOutcome::Failed {
                            message: "selection range is out of bounds".to_string(),
                        }
                    }
                },
                FixConfirmation::Discard => FixOutcome::Discarded,
            },
            FixDisposition::ExplanationOnly { explanation } => {
                FixOutcome::ExplanationOnly { explanation }
            }
            FixDisposition::Unusable => FixOutcome::NoUsableOutput,
            FixDisposition::Unstructured { raw } => {
                warn!("fix response was not valid JSON; surfacing raw text");
                FixOutcome::Unstructured { raw }
            }
        }
    }

    /// Resolves the API key: stored credential first, interactive prompt
    /// as the fallback. A prompt-supplied key is used for this call only.
    fn resolve_api_key(&self) -> Option<String> {
        match self.credentials.get() {
            Ok(Some(api_key)) => return Some(api_key),
            Ok(None) => {}
            Err(error) => warn!("credential store read failed: {error}"),
        }

        self.prompt
            .request_api_key()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
