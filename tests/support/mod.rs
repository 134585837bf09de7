use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use chat_provider::{ChatError, ChatProvider};
use chat_provider_mock::MockChatProvider;
use coda::credentials::{CredentialPrompt, CredentialStore};
use coda::session::SessionCoordinator;
use coda::sidebar::{UiEvent, UiSink};
use conversation_store::ConversationStore;
use tempfile::TempDir;

pub struct RecordingSink {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> Vec<UiEvent> {
        lock_unpoisoned(&self.events).clone()
    }
}

impl UiSink for RecordingSink {
    fn post(&self, event: UiEvent) {
        lock_unpoisoned(&self.events).push(event);
    }
}

/// Scripted credential store: a fixed stored key plus a record of writes.
pub struct ScriptedCredentials {
    stored: Option<String>,
    pub sets: Mutex<Vec<String>>,
}

impl ScriptedCredentials {
    pub fn with_key(api_key: &str) -> Arc<Self> {
        Arc::new(Self {
            stored: Some(api_key.to_string()),
            sets: Mutex::new(Vec::new()),
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            stored: None,
            sets: Mutex::new(Vec::new()),
        })
    }

    pub fn recorded_sets(&self) -> Vec<String> {
        lock_unpoisoned(&self.sets).clone()
    }
}

impl CredentialStore for ScriptedCredentials {
    fn get(&self) -> io::Result<Option<String>> {
        Ok(self.stored.clone())
    }

    fn set(&self, api_key: &str) -> io::Result<()> {
        lock_unpoisoned(&self.sets).push(api_key.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Scripted interactive prompt; counts how often the operator was asked.
pub struct ScriptedPrompt {
    response: Option<String>,
    requests: Mutex<usize>,
}

impl ScriptedPrompt {
    pub fn declining() -> Arc<Self> {
        Arc::new(Self {
            response: None,
            requests: Mutex::new(0),
        })
    }

    pub fn supplying(api_key: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Some(api_key.to_string()),
            requests: Mutex::new(0),
        })
    }

    pub fn request_count(&self) -> usize {
        *lock_unpoisoned(&self.requests)
    }
}

impl CredentialPrompt for ScriptedPrompt {
    fn request_api_key(&self) -> Option<String> {
        *lock_unpoisoned(&self.requests) += 1;
        self.response.clone()
    }
}

pub struct Harness {
    pub coordinator: SessionCoordinator,
    pub provider: Arc<MockChatProvider>,
    pub sink: Arc<RecordingSink>,
    pub credentials: Arc<ScriptedCredentials>,
    pub prompt: Arc<ScriptedPrompt>,
    pub workspace: TempDir,
}

/// Builds a coordinator over a fresh workspace, scripted provider
/// outcomes, and scripted credential collaborators.
pub fn harness(
    outcomes: Vec<Result<String, ChatError>>,
    credentials: Arc<ScriptedCredentials>,
    prompt: Arc<ScriptedPrompt>,
) -> Harness {
    let workspace = tempfile::tempdir().expect("tempdir should be created");
    let store = ConversationStore::open(workspace.path()).expect("store should open");
    harness_with_store(outcomes, credentials, prompt, workspace, store)
}

pub fn harness_with_store(
    outcomes: Vec<Result<String, ChatError>>,
    credentials: Arc<ScriptedCredentials>,
    prompt: Arc<ScriptedPrompt>,
    workspace: TempDir,
    store: ConversationStore,
) -> Harness {
    let provider = Arc::new(MockChatProvider::new(outcomes));
    let sink = RecordingSink::new();

    let coordinator = SessionCoordinator::new(
        Arc::clone(&provider) as Arc<dyn ChatProvider>,
        store,
        Arc::clone(&credentials) as Arc<dyn CredentialStore>,
        Arc::clone(&prompt) as Arc<dyn CredentialPrompt>,
        Arc::clone(&sink) as Arc<dyn UiSink>,
    );

    Harness {
        coordinator,
        provider,
        sink,
        credentials,
        prompt,
        workspace,
    }
}

/// Reopens the workspace conversation and returns its persisted turns.
pub fn persisted_turns(workspace: &TempDir) -> Vec<chat_provider::Turn> {
    ConversationStore::open(workspace.path())
        .expect("reopen should succeed")
        .turns()
        .to_vec()
}

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
